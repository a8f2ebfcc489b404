use crate::state::app_settings::AppSettings;
use anyhow::{Context, bail};
use kickoff_api::client::KickoffApi;
use kickoff_api::draft::{MatchDraft, ProfileDraft};
use kickoff_api::{Clock, SystemClock};
use log::info;
use std::path::{Path, PathBuf};

#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Start the terminal UI.
    Run,
    /// Print the text and exit.
    Exit(String),
    /// Publish the match described by a JSON draft file.
    Create(PathBuf),
    /// Save the viewer's profile from a JSON draft file.
    Profile(PathBuf),
}

pub fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliAction, String> {
    let Some(arg) = args.next() else {
        return Ok(CliAction::Run);
    };

    match arg.as_str() {
        "-h" | "--help" => Ok(CliAction::Exit(usage_text().to_string())),
        "-V" | "--version" => Ok(CliAction::Exit(format!(
            "kickoff {}",
            env!("CARGO_PKG_VERSION")
        ))),
        "create" => draft_path(&arg, args).map(CliAction::Create),
        "profile" => draft_path(&arg, args).map(CliAction::Profile),
        _ => Err(format!("Unknown argument: {arg}\n\n{}", usage_text())),
    }
}

fn draft_path(command: &str, mut args: impl Iterator<Item = String>) -> Result<PathBuf, String> {
    match (args.next(), args.next()) {
        (Some(path), None) => Ok(PathBuf::from(path)),
        (None, _) => Err(format!("{command} needs a draft file\n\n{}", usage_text())),
        (Some(_), Some(extra)) => Err(format!("Unexpected argument: {extra}\n\n{}", usage_text())),
    }
}

pub fn usage_text() -> &'static str {
    "kickoff - pickup football matches near you

Usage:
  kickoff
  kickoff create <draft.json>
  kickoff profile <profile.json>
  kickoff --help
  kickoff --version

Environment:
  KICKOFF_API_BASE   Match service base URL (default https://theao.vercel.app)
  KICKOFF_EMAIL      Your account email; needed to join, leave, create, delete and save a profile
  KICKOFF_LOCATION   Fixed position as \"lat,lon\" for distances
  KICKOFF_GEOIP      Set to 1 to estimate your position from your IP address
  KICKOFF_LOG        Log level shown in the log pane (default info)

Draft file fields:
  name, description, communication_link, location, coordinates {latitude, longitude},
  capacity (8, 10 or 12), price, date (DD/MM/YYYY), start_time and end_time (HH:MM)

Profile file fields:
  first_name, last_name, phone (10 digits), birth_date (DD/MM/YYYY), gender (male or female)"
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

pub fn read_draft(path: &Path) -> anyhow::Result<MatchDraft> {
    let content = read_file(path)?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

pub fn read_profile(path: &Path) -> anyhow::Result<ProfileDraft> {
    let content = read_file(path)?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

pub async fn create_match(path: &Path, settings: &AppSettings) -> anyhow::Result<()> {
    let Some(email) = settings.viewer_email.as_deref() else {
        bail!("Set KICKOFF_EMAIL to create a match.");
    };
    let draft = read_draft(path)?;
    let new_match = draft
        .validate(SystemClock.now())
        .with_context(|| format!("{} is not a valid match", path.display()))?;

    let api = KickoffApi::new(settings.api_base.clone());
    api.create_match(email, &new_match).await?;
    info!("created match {}", new_match.nom);
    println!("Created \"{}\" on {}.", new_match.nom, new_match.date_match);
    Ok(())
}

pub async fn save_profile(path: &Path, settings: &AppSettings) -> anyhow::Result<()> {
    let Some(email) = settings.viewer_email.as_deref() else {
        bail!("Set KICKOFF_EMAIL to save your profile.");
    };
    let draft = read_profile(path)?;
    let new_profile = draft
        .validate(SystemClock.now().date())
        .with_context(|| format!("{} is not a valid profile", path.display()))?;

    let api = KickoffApi::new(settings.api_base.clone());
    api.save_profile(email, &new_profile).await?;
    info!("saved profile for {email}");
    println!("Saved profile for {} {}.", new_profile.first_name, new_profile.last_name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliAction, String> {
        parse_args(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn no_arguments_runs_the_ui() {
        assert_eq!(parse(&[]), Ok(CliAction::Run));
    }

    #[test]
    fn help_and_version_exit() {
        assert!(matches!(parse(&["--help"]), Ok(CliAction::Exit(text)) if text.contains("Usage:")));
        assert!(matches!(parse(&["-V"]), Ok(CliAction::Exit(text)) if text.starts_with("kickoff ")));
    }

    #[test]
    fn create_takes_exactly_one_path() {
        assert_eq!(
            parse(&["create", "draft.json"]),
            Ok(CliAction::Create(PathBuf::from("draft.json")))
        );
        assert!(parse(&["create"]).is_err());
        assert!(parse(&["create", "a.json", "b.json"]).is_err());
        assert!(parse(&["--bogus"]).unwrap_err().starts_with("Unknown argument"));
    }

    #[test]
    fn profile_takes_exactly_one_path() {
        assert_eq!(
            parse(&["profile", "me.json"]),
            Ok(CliAction::Profile(PathBuf::from("me.json")))
        );
        assert!(parse(&["profile"]).unwrap_err().starts_with("profile needs a draft file"));
    }

    #[test]
    fn reads_profile_file() {
        let path =
            std::env::temp_dir().join(format!("kickoff-profile-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"first_name":"Sara","last_name":"B","phone":"0612345678","birth_date":"01/02/1999"}"#,
        )
        .unwrap();
        let draft = read_profile(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(draft.phone, "0612345678");
        assert!(draft.gender.is_empty());
    }

    #[test]
    fn reads_draft_file() {
        let path = std::env::temp_dir().join(format!("kickoff-draft-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"name":"Sunday five","location":"Rue 1, Maarif, Casablanca","capacity":10,
               "price":"30","date":"15/03/2026","start_time":"18:00","end_time":"19:00"}"#,
        )
        .unwrap();
        let draft = read_draft(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(draft.name, "Sunday five");
        assert_eq!(draft.capacity, Some(10));
        assert!(draft.description.is_empty());
    }

    #[test]
    fn missing_draft_file_is_an_error() {
        let err = read_draft(Path::new("/nonexistent/kickoff/draft.json")).unwrap_err();
        assert!(err.to_string().contains("reading"));
    }

    #[tokio::test]
    async fn create_requires_identity() {
        let settings = AppSettings::default();
        let err = create_match(Path::new("draft.json"), &settings).await.unwrap_err();
        assert!(err.to_string().contains("KICKOFF_EMAIL"));
    }

    #[tokio::test]
    async fn invalid_profile_is_not_sent() {
        let path =
            std::env::temp_dir().join(format!("kickoff-bad-profile-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"first_name":"Sara","last_name":"B","phone":"06123","birth_date":"01/02/1999","gender":"female"}"#,
        )
        .unwrap();
        let settings = AppSettings {
            viewer_email: Some("sara@x.com".to_string()),
            api_base: "http://127.0.0.1:9".to_string(),
            ..AppSettings::default()
        };
        let err = save_profile(&path, &settings).await.unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(err.to_string().contains("is not a valid profile"));
        assert!(format!("{err:#}").contains("10 digits"));
    }
}
