use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use kickoff_api::{Coordinates, MatchSnapshot, Profile, Roster};

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    /// `generation` increases with every fetch; older replies are discarded.
    LoadMatches { generation: u64 },
    LocateViewer,
    LoadProfile,
    LoadRoster { match_id: String },
    JoinMatch { match_id: String },
    LeaveMatch { match_id: String },
    DeleteMatch { match_id: String },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    MatchesLoaded { generation: u64, snapshot: MatchSnapshot },
    LocationResolved { location: Option<Coordinates> },
    ProfileLoaded { profile: Option<Profile> },
    RosterLoaded { match_id: String, roster: Roster },
    MatchJoined { match_id: String, roster: Roster },
    MatchLeft { match_id: String },
    MatchDeleted { match_id: String },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    RefreshTick,
}
