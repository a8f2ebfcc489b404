use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use chrono::Timelike;
use kickoff_api::{
    Clock, Coordinates, FeedEntry, MatchSnapshot, Profile, Roster, SystemClock, ViewerContext,
};
use log::{debug, info};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Matches,
    Detail,
    Profile,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    clock: Box<dyn Clock + Send>,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        Self::with_clock(settings, Box::new(SystemClock))
    }

    pub fn with_clock(settings: AppSettings, clock: Box<dyn Clock + Send>) -> Self {
        let today = clock.now().date();
        let mut state = AppState::new(today);
        state.feed.location = settings.location;
        Self { settings, state, clock }
    }

    // -----------------------------------------------------------------------
    // Feed
    // -----------------------------------------------------------------------

    /// Viewer context for the current second. Also moves the date strip
    /// forward when the day has changed.
    pub fn viewer_context(&mut self) -> ViewerContext {
        let now = self.clock.now();
        let now = now.with_nanosecond(0).unwrap_or(now);
        self.state.feed.roll_to(now.date());
        self.state
            .feed
            .context(self.settings.viewer_email.as_deref(), now)
    }

    pub fn feed_entries(&mut self) -> Vec<FeedEntry> {
        let ctx = self.viewer_context();
        self.state.feed.entries(&ctx).to_vec()
    }

    pub fn next_fetch_generation(&mut self) -> u64 {
        self.state.feed.next_generation()
    }

    pub fn selected_entry(&mut self) -> Option<FeedEntry> {
        let selected = self.state.feed.selected;
        self.feed_entries().into_iter().nth(selected)
    }

    pub fn select_next(&mut self) {
        let len = self.feed_entries().len();
        self.state.feed.select_next(len);
    }

    pub fn select_prev(&mut self) {
        self.state.feed.select_prev();
    }

    /// Switches to the detail tab for the highlighted match and returns its id.
    pub fn open_selected(&mut self) -> Option<String> {
        let entry = self.selected_entry()?;
        let id = entry.game.id.clone();
        self.state.detail.open(entry);
        self.update_tab(MenuItem::Detail);
        Some(id)
    }

    pub fn has_viewer(&self) -> bool {
        self.settings.viewer_email.is_some()
    }

    /// Only the creator is offered deletion.
    pub fn can_delete(&self) -> bool {
        match (&self.state.detail.entry, self.settings.viewer_email.as_deref()) {
            (Some(entry), Some(email)) => entry.game.is_created_by(email),
            _ => false,
        }
    }

    pub fn viewer_has_joined(&self) -> bool {
        let Some(email) = self.settings.viewer_email.as_deref() else {
            return false;
        };
        match (&self.state.detail.roster, &self.state.detail.entry) {
            (Some(roster), _) => roster.joined,
            (None, Some(entry)) => entry
                .game
                .joined_players
                .iter()
                .any(|p| p.email.as_deref() == Some(email)),
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_matches_loaded(&mut self, generation: u64, snapshot: MatchSnapshot) {
        let count = snapshot.matches.len();
        if !self.state.feed.apply_snapshot(generation, snapshot) {
            debug!("discarding stale match list (generation {generation})");
            return;
        }
        info!("loaded {count} matches");
        self.state.last_error = None;
        let entries = self.feed_entries();
        let len = entries.len();
        if self.state.feed.selected >= len {
            self.state.feed.selected = len.saturating_sub(1);
        }
        self.state.detail.refresh_from(&entries);
    }

    pub fn on_location_resolved(&mut self, location: Option<Coordinates>) {
        if location.is_some() {
            self.state.feed.location = location;
        }
    }

    pub fn on_roster_loaded(&mut self, match_id: String, roster: Roster) {
        if self.state.detail.is_showing(&match_id) {
            self.state.detail.roster = Some(roster);
        }
    }

    pub fn on_match_joined(&mut self, match_id: String, roster: Roster) {
        self.state.notice = Some("You joined the match.".to_string());
        self.on_roster_loaded(match_id, roster);
    }

    pub fn on_match_left(&mut self, match_id: String) {
        self.state.notice = Some("You left the match.".to_string());
        if self.state.detail.is_showing(&match_id)
            && let (Some(roster), Some(email)) = (
                self.state.detail.roster.as_mut(),
                self.settings.viewer_email.as_deref(),
            )
        {
            roster.remove_player(email);
            roster.joined = false;
        }
    }

    pub fn on_match_deleted(&mut self, match_id: String) {
        self.state.notice = Some("Match deleted.".to_string());
        self.state.feed.remove_match(&match_id);
        if self.state.detail.is_showing(&match_id) {
            self.state.detail.close();
            self.update_tab(MenuItem::Matches);
        }
    }

    pub fn on_profile_loaded(&mut self, profile: Option<Profile>) {
        self.state.profile.profile = profile;
        self.state.profile.loaded = true;
    }

    pub fn on_error(&mut self, message: String) {
        self.state.notice = None;
        self.state.last_error = Some(message);
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        self.state.detail.confirm_delete = false;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use kickoff_api::{FixedClock, Match, Player, Scope};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn app(email: Option<&str>) -> App {
        let settings = AppSettings {
            viewer_email: email.map(str::to_string),
            ..AppSettings::default()
        };
        App::with_clock(settings, Box::new(FixedClock(now())))
    }

    fn game(id: &str, creator: &str, start: u32) -> Match {
        Match {
            id: id.to_string(),
            name: format!("Match {id}"),
            description: String::new(),
            location: String::new(),
            coordinates: None,
            capacity: 10,
            joined_players: Vec::new(),
            date: now().date(),
            start_time: NaiveTime::from_hms_opt(start, 0, 0),
            end_time: NaiveTime::from_hms_opt(start + 1, 0, 0).unwrap(),
            price: 0.0,
            creator_email: Some(creator.to_string()),
            creator_picture: None,
            communication_link: None,
        }
    }

    fn load(app: &mut App, matches: Vec<Match>) {
        let generation = app.next_fetch_generation();
        app.on_matches_loaded(generation, MatchSnapshot { matches, skipped: 0 });
    }

    #[test]
    fn open_selected_switches_tab() {
        let mut app = app(Some("me@x.com"));
        load(&mut app, vec![game("1", "me@x.com", 20), game("2", "o@x.com", 18)]);

        // Earlier start ranks first.
        assert_eq!(app.open_selected().as_deref(), Some("2"));
        assert_eq!(app.state.active_tab, MenuItem::Detail);
        assert!(!app.can_delete());

        app.update_tab(MenuItem::Matches);
        app.select_next();
        assert_eq!(app.open_selected().as_deref(), Some("1"));
        assert!(app.can_delete());
    }

    #[test]
    fn nothing_to_open_on_empty_feed() {
        let mut app = app(None);
        load(&mut app, Vec::new());
        assert!(app.open_selected().is_none());
        assert_eq!(app.state.active_tab, MenuItem::Matches);
    }

    #[test]
    fn mine_scope_without_identity_is_empty() {
        let mut app = app(None);
        load(&mut app, vec![game("1", "me@x.com", 20)]);
        assert_eq!(app.feed_entries().len(), 1);
        app.state.feed.toggle_scope();
        assert_eq!(app.state.feed.scope, Scope::Mine);
        assert!(app.feed_entries().is_empty());
    }

    #[test]
    fn deleting_open_match_returns_to_feed() {
        let mut app = app(Some("me@x.com"));
        load(&mut app, vec![game("1", "me@x.com", 20)]);
        app.open_selected();
        app.on_match_deleted("1".to_string());
        assert_eq!(app.state.active_tab, MenuItem::Matches);
        assert!(app.state.detail.entry.is_none());
        assert!(app.feed_entries().is_empty());
    }

    #[test]
    fn leaving_updates_roster() {
        let mut app = app(Some("me@x.com"));
        let mut m = game("1", "o@x.com", 20);
        m.joined_players.push(Player {
            email: Some("me@x.com".to_string()),
            ..Player::default()
        });
        load(&mut app, vec![m]);
        app.open_selected();
        assert!(app.viewer_has_joined());

        app.on_roster_loaded(
            "1".to_string(),
            Roster {
                joined: true,
                players: vec![Player {
                    email: Some("me@x.com".to_string()),
                    ..Player::default()
                }],
            },
        );
        app.on_match_left("1".to_string());
        let roster = app.state.detail.roster.as_ref().unwrap();
        assert!(!roster.joined);
        assert!(roster.players.is_empty());
        assert!(!app.viewer_has_joined());
    }

    #[test]
    fn stale_roster_for_other_match_is_ignored() {
        let mut app = app(Some("me@x.com"));
        load(&mut app, vec![game("1", "o@x.com", 20)]);
        app.open_selected();
        app.on_roster_loaded("9".to_string(), Roster::default());
        assert!(app.state.detail.roster.is_none());
    }

    #[test]
    fn help_returns_to_previous_tab() {
        let mut app = app(None);
        app.update_tab(MenuItem::Profile);
        app.update_tab(MenuItem::Help);
        app.exit_help();
        assert_eq!(app.state.active_tab, MenuItem::Profile);
    }
}
