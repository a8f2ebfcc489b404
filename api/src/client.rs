use crate::context::LocationProvider;
use crate::draft::{NewMatch, NewProfile};
use crate::wire::{
    ActionResponse, IpLocationResponse, MatchesResponse, ProfileResponse,
};
use crate::{Coordinates, MatchSnapshot, Player, Profile, Roster};
use log::debug;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::future::Future;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_API_BASE: &str = "https://theao.vercel.app";
const IP_API_URL: &str = "http://ip-api.com/json/?fields=status,lat,lon";
const USER_AGENT: &str = "kickoff/0.1 (terminal match finder)";

/// Client for the match service's HTTP endpoints.
#[derive(Debug, Clone)]
pub struct KickoffApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for KickoffApi {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error for {1}: {0}")]
    Network(#[source] reqwest::Error, String),
    #[error("API error for {1}: {0}")]
    Api(#[source] reqwest::Error, String),
    #[error("Parse error for {1}: {0}")]
    Parsing(#[source] reqwest::Error, String),
    #[error("HTTP {0} from {1}")]
    Status(u16, String),
    #[error("{0}")]
    Rejected(String),
}

impl KickoffApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the full current match list. Records that fail validation are
    /// dropped and counted in `MatchSnapshot::skipped`.
    pub async fn fetch_matches(&self) -> ApiResult<MatchSnapshot> {
        let raw: MatchesResponse = self.get("/api/getmatch").await?;
        let snapshot = MatchSnapshot::from_raw(raw.matches.unwrap_or_default());
        debug!(
            "fetched {} matches ({} skipped)",
            snapshot.matches.len(),
            snapshot.skipped
        );
        Ok(snapshot)
    }

    /// Players signed up for a match, and whether `email` is one of them.
    pub async fn fetch_players(&self, email: &str, match_id: &str) -> ApiResult<Roster> {
        let body = json!({ "email": email, "matchId": id_value(match_id) });
        let response = self.post_action("/api/getmatchjoin", &body).await?;
        Ok(into_roster(response, false))
    }

    pub async fn join_match(&self, email: &str, match_id: &str) -> ApiResult<Roster> {
        let body = json!({ "email": email, "matchId": id_value(match_id) });
        let response = self.post_action("/api/matchjoin", &body).await?;
        Ok(into_roster(response, true))
    }

    pub async fn leave_match(&self, email: &str, match_id: &str) -> ApiResult<()> {
        let body = json!({ "email": email, "matchId": id_value(match_id) });
        self.post_action("/api/matchleave", &body).await?;
        Ok(())
    }

    /// The service only honours this for the match's creator.
    pub async fn delete_match(&self, email: &str, match_id: &str) -> ApiResult<()> {
        let body = json!({ "userEmail": email, "matchId": id_value(match_id) });
        self.post_action("/api/deletematch", &body).await?;
        Ok(())
    }

    pub async fn create_match(&self, email: &str, new_match: &NewMatch) -> ApiResult<()> {
        #[derive(Serialize)]
        struct SaveMatch<'a> {
            email: &'a str,
            #[serde(flatten)]
            new_match: &'a NewMatch,
        }
        self.post_action("/api/savematch", &SaveMatch { email, new_match })
            .await?;
        Ok(())
    }

    /// Creates or replaces the viewer's profile.
    pub async fn save_profile(&self, email: &str, profile: &NewProfile) -> ApiResult<()> {
        #[derive(Serialize)]
        struct SaveProfile<'a> {
            email: &'a str,
            #[serde(flatten)]
            profile: &'a NewProfile,
        }
        self.post_action("/api/saveprofile", &SaveProfile { email, profile })
            .await?;
        Ok(())
    }

    /// `None` when the viewer has not completed onboarding yet.
    pub async fn fetch_profile(&self, email: &str) -> ApiResult<Option<Profile>> {
        let raw: ProfileResponse = self
            .post("/api/getprofile", &json!({ "email": email }))
            .await?;
        if !raw.success {
            return Ok(None);
        }
        Ok(raw.data.map(|d| d.into_profile(email)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url)),
            Err(e) => Err(ApiError::Api(e, url)),
        }
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url)),
            Err(e) => Err(ApiError::Api(e, url)),
        }
    }

    /// POST to an endpoint answering `{success, error?, ...}`. The service
    /// reports refusals in the body, sometimes with a 4xx status.
    async fn post_action<B: Serialize>(&self, path: &str, body: &B) -> ApiResult<ActionResponse> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;

        let status = response.status();
        match response.json::<ActionResponse>().await {
            Ok(res) if res.success => Ok(res),
            Ok(res) => Err(ApiError::Rejected(res.error.unwrap_or_else(|| {
                format!("{path} was refused by the server ({})", status.as_u16())
            }))),
            Err(e) if status.is_success() => Err(ApiError::Parsing(e, url)),
            Err(_) => Err(ApiError::Status(status.as_u16(), url)),
        }
    }
}

fn build_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_default()
}

/// The service keys matches by integer; send numeric ids as JSON numbers.
fn id_value(match_id: &str) -> Value {
    match match_id.parse::<i64>() {
        Ok(n) => Value::from(n),
        Err(_) => Value::from(match_id),
    }
}

fn into_roster(response: ActionResponse, joined_default: bool) -> Roster {
    Roster {
        joined: response.joined.unwrap_or(joined_default),
        players: response
            .players
            .unwrap_or_default()
            .into_iter()
            .map(Player::from)
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// IP geolocation, a coarse fallback when no location is configured
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct IpGeolocation {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl Default for IpGeolocation {
    fn default() -> Self {
        Self::with_endpoint(IP_API_URL)
    }
}

impl IpGeolocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: build_client(),
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(5),
        }
    }

    async fn lookup(&self) -> ApiResult<Option<Coordinates>> {
        let url = self.endpoint.as_str();
        let raw: IpLocationResponse = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?
            .error_for_status()
            .map_err(|e| ApiError::Api(e, url.to_owned()))?
            .json()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))?;

        if raw.status.as_deref() != Some("success") {
            return Ok(None);
        }
        Ok(match (raw.lat, raw.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)).filter(Coordinates::is_valid),
            _ => None,
        })
    }
}

impl LocationProvider for IpGeolocation {
    fn current_location(&self) -> impl Future<Output = Option<Coordinates>> + Send {
        async move {
            self.lookup().await.unwrap_or_else(|e| {
                debug!("ip geolocation unavailable: {e}");
                None
            })
        }
    }
}
