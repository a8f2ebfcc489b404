use kickoff_api::Coordinates;
use kickoff_api::client::DEFAULT_API_BASE;
use log::LevelFilter;
use std::str::FromStr;

/// Runtime configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: LevelFilter,
    pub api_base: String,
    /// Identity of the viewer; `None` browses anonymously.
    pub viewer_email: Option<String>,
    /// Fixed map pin. Takes precedence over IP lookup.
    pub location: Option<Coordinates>,
    pub geoip: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: LevelFilter::Info,
            api_base: DEFAULT_API_BASE.to_string(),
            viewer_email: None,
            location: None,
            geoip: false,
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            full_screen: false,
            log_level: get("KICKOFF_LOG")
                .and_then(|v| LevelFilter::from_str(&v).ok())
                .unwrap_or(defaults.log_level),
            api_base: get("KICKOFF_API_BASE").unwrap_or(defaults.api_base),
            viewer_email: get("KICKOFF_EMAIL"),
            location: get("KICKOFF_LOCATION").and_then(|v| Coordinates::parse(&v)),
            geoip: get("KICKOFF_GEOIP").is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes")),
        }
    }
}
