use crate::state::messages::{NetworkRequest, NetworkResponse};
use kickoff_api::LocationProvider;
use kickoff_api::client::{ApiError, KickoffApi};
use log::{debug, error, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Performs every remote call on behalf of the UI loop, one request at a time.
pub struct NetworkWorker<L> {
    client: KickoffApi,
    location: L,
    viewer_email: Option<String>,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl<L: LocationProvider + Send + Sync + 'static> NetworkWorker<L> {
    pub fn new(
        client: KickoffApi,
        location: L,
        viewer_email: Option<String>,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            location,
            viewer_email,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let result = self.handle(request).await;

            debug!("network request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| NetworkResponse::Error {
                message: err.to_string(),
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle(&self, request: NetworkRequest) -> Result<NetworkResponse, ApiError> {
        match request {
            NetworkRequest::LoadMatches { generation } => {
                debug!("loading matches (generation {generation})");
                let snapshot = self.client.fetch_matches().await?;
                Ok(NetworkResponse::MatchesLoaded { generation, snapshot })
            }
            NetworkRequest::LocateViewer => {
                let location = self.location.current_location().await;
                match location {
                    Some(c) => info!("viewer located at {:.4},{:.4}", c.latitude, c.longitude),
                    None => info!("viewer location unavailable; distances disabled"),
                }
                Ok(NetworkResponse::LocationResolved { location })
            }
            NetworkRequest::LoadProfile => {
                let email = self.require_viewer("view your profile")?;
                debug!("loading profile for {email}");
                let profile = self.client.fetch_profile(email).await?;
                Ok(NetworkResponse::ProfileLoaded { profile })
            }
            NetworkRequest::LoadRoster { match_id } => {
                let email = self.require_viewer("see who is playing")?;
                debug!("loading roster for match {match_id}");
                let roster = self.client.fetch_players(email, &match_id).await?;
                Ok(NetworkResponse::RosterLoaded { match_id, roster })
            }
            NetworkRequest::JoinMatch { match_id } => {
                let email = self.require_viewer("join a match")?;
                info!("joining match {match_id}");
                let roster = self.client.join_match(email, &match_id).await?;
                Ok(NetworkResponse::MatchJoined { match_id, roster })
            }
            NetworkRequest::LeaveMatch { match_id } => {
                let email = self.require_viewer("leave a match")?;
                info!("leaving match {match_id}");
                self.client.leave_match(email, &match_id).await?;
                Ok(NetworkResponse::MatchLeft { match_id })
            }
            NetworkRequest::DeleteMatch { match_id } => {
                let email = self.require_viewer("delete a match")?;
                info!("deleting match {match_id}");
                self.client.delete_match(email, &match_id).await?;
                Ok(NetworkResponse::MatchDeleted { match_id })
            }
        }
    }

    fn require_viewer(&self, action: &str) -> Result<&str, ApiError> {
        self.viewer_email
            .as_deref()
            .ok_or_else(|| ApiError::Rejected(format!("Set KICKOFF_EMAIL to {action}.")))
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}
