use crate::app::MenuItem;
use chrono::{Days, NaiveDate, NaiveDateTime};
use kickoff_api::{
    Coordinates, FeedCache, FeedEntry, Match, MatchSnapshot, Profile, Roster, Scope,
    ViewerContext,
};

/// Number of selectable days in the date strip, today included.
pub const DATE_STRIP_DAYS: usize = 21;

// ---------------------------------------------------------------------------
// Feed (home screen) state
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct FeedState {
    /// Latest snapshot from the match source, in fetch order.
    pub matches: Vec<Match>,
    pub loaded: bool,
    pub skipped: usize,
    /// Generation of the snapshot currently shown.
    pub applied_generation: u64,
    /// Generation handed to the most recent fetch request.
    pub requested_generation: u64,
    pub today: NaiveDate,
    /// Index into the date strip; 0 is today.
    pub selected_day: usize,
    pub scope: Scope,
    pub search: String,
    pub composing_search: bool,
    pub selected: usize,
    pub location: Option<Coordinates>,
    cache: FeedCache,
}

impl FeedState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            matches: Vec::new(),
            loaded: false,
            skipped: 0,
            applied_generation: 0,
            requested_generation: 0,
            today,
            selected_day: 0,
            scope: Scope::All,
            search: String::new(),
            composing_search: false,
            selected: 0,
            location: None,
            cache: FeedCache::default(),
        }
    }

    pub fn next_generation(&mut self) -> u64 {
        self.requested_generation += 1;
        self.requested_generation
    }

    /// Install a fetched snapshot unless a newer one is already showing.
    /// Returns whether the snapshot was applied.
    pub fn apply_snapshot(&mut self, generation: u64, snapshot: MatchSnapshot) -> bool {
        if generation < self.applied_generation {
            return false;
        }
        self.applied_generation = generation;
        self.matches = snapshot.matches;
        self.skipped = snapshot.skipped;
        self.loaded = true;
        true
    }

    pub fn remove_match(&mut self, match_id: &str) {
        self.matches.retain(|m| m.id != match_id);
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        (0..DATE_STRIP_DAYS)
            .filter_map(|i| self.today.checked_add_days(Days::new(i as u64)))
            .collect()
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.today
            .checked_add_days(Days::new(self.selected_day as u64))
            .unwrap_or(self.today)
    }

    /// Keep the strip anchored on the current day once midnight passes.
    pub fn roll_to(&mut self, today: NaiveDate) {
        if today <= self.today {
            return;
        }
        let elapsed = (today - self.today).num_days().max(0) as usize;
        self.selected_day = self.selected_day.saturating_sub(elapsed);
        self.today = today;
    }

    pub fn next_day(&mut self) {
        if self.selected_day + 1 < DATE_STRIP_DAYS {
            self.selected_day += 1;
            self.selected = 0;
        }
    }

    pub fn prev_day(&mut self) {
        if self.selected_day > 0 {
            self.selected_day -= 1;
            self.selected = 0;
        }
    }

    pub fn toggle_scope(&mut self) {
        self.scope = self.scope.toggle();
        self.selected = 0;
    }

    pub fn push_search(&mut self, c: char) {
        self.search.push(c);
        self.selected = 0;
    }

    pub fn pop_search(&mut self) {
        self.search.pop();
        self.selected = 0;
    }

    pub fn context(&self, viewer_email: Option<&str>, now: NaiveDateTime) -> ViewerContext {
        ViewerContext {
            current_user_email: viewer_email.map(str::to_string),
            current_location: self.location,
            selected_date: self.selected_date(),
            scope: self.scope,
            search_text: self.search.clone(),
            now,
        }
    }

    pub fn entries(&mut self, ctx: &ViewerContext) -> &[FeedEntry] {
        self.cache.get(&self.matches, ctx)
    }

    pub fn select_next(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Match detail state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct DetailState {
    /// The feed entry the viewer opened, frozen at the moment it was opened.
    pub entry: Option<FeedEntry>,
    pub roster: Option<Roster>,
    pub confirm_delete: bool,
    pub scroll_offset: u16,
}

impl DetailState {
    pub fn open(&mut self, entry: FeedEntry) {
        let same = self.match_id() == Some(entry.game.id.as_str());
        if !same {
            self.roster = None;
            self.scroll_offset = 0;
        }
        self.confirm_delete = false;
        self.entry = Some(entry);
    }

    pub fn match_id(&self) -> Option<&str> {
        self.entry.as_ref().map(|e| e.game.id.as_str())
    }

    pub fn is_showing(&self, match_id: &str) -> bool {
        self.match_id() == Some(match_id)
    }

    /// Keep the opened entry in step with a fresher feed.
    pub fn refresh_from(&mut self, feed: &[FeedEntry]) {
        let Some(id) = self.match_id() else {
            return;
        };
        if let Some(fresh) = feed.iter().find(|e| e.game.id == id) {
            self.entry = Some(fresh.clone());
        }
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Default)]
pub struct ProfileState {
    pub profile: Option<Profile>,
    pub loaded: bool,
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    pub notice: Option<String>,
    pub feed: FeedState,
    pub detail: DetailState,
    pub profile: ProfileState,
}

impl AppState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            active_tab: MenuItem::default(),
            previous_tab: MenuItem::default(),
            show_logs: false,
            last_error: None,
            notice: None,
            feed: FeedState::new(today),
            detail: DetailState::default(),
            profile: ProfileState::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn game(id: &str, date: NaiveDate) -> Match {
        Match {
            id: id.to_string(),
            name: format!("Match {id}"),
            description: String::new(),
            location: String::new(),
            coordinates: None,
            capacity: 10,
            joined_players: Vec::new(),
            date,
            start_time: NaiveTime::from_hms_opt(18, 0, 0),
            end_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            price: 0.0,
            creator_email: None,
            creator_picture: None,
            communication_link: None,
        }
    }

    fn snapshot(ids: &[&str]) -> MatchSnapshot {
        MatchSnapshot {
            matches: ids.iter().map(|id| game(id, day(10))).collect(),
            skipped: 0,
        }
    }

    #[test]
    fn newer_snapshot_wins_over_late_older_reply() {
        let mut feed = FeedState::new(day(10));
        let first = feed.next_generation();
        let second = feed.next_generation();

        assert!(feed.apply_snapshot(second, snapshot(&["new"])));
        assert!(!feed.apply_snapshot(first, snapshot(&["old"])));
        assert_eq!(feed.matches[0].id, "new");
        assert_eq!(feed.applied_generation, second);
    }

    #[test]
    fn date_strip_spans_three_weeks() {
        let mut feed = FeedState::new(day(10));
        let days = feed.days();
        assert_eq!(days.len(), DATE_STRIP_DAYS);
        assert_eq!(days[0], day(10));
        assert_eq!(days[20], day(30));

        for _ in 0..50 {
            feed.next_day();
        }
        assert_eq!(feed.selected_date(), day(30));
        feed.prev_day();
        assert_eq!(feed.selected_date(), day(29));
    }

    #[test]
    fn rolling_over_midnight_keeps_selected_date() {
        let mut feed = FeedState::new(day(10));
        feed.next_day();
        feed.next_day();
        assert_eq!(feed.selected_date(), day(12));
        feed.roll_to(day(11));
        assert_eq!(feed.today, day(11));
        assert_eq!(feed.selected_date(), day(12));
        feed.roll_to(day(20));
        assert_eq!(feed.selected_date(), day(20));
    }

    #[test]
    fn context_reflects_filters() {
        let mut feed = FeedState::new(day(10));
        feed.toggle_scope();
        feed.push_search('p');
        feed.push_search('x');
        feed.pop_search();
        feed.next_day();
        feed.location = Some(Coordinates::new(1.0, 2.0));

        let now = day(10).and_hms_opt(9, 0, 0).unwrap();
        let ctx = feed.context(Some("me@x.com"), now);
        assert_eq!(ctx.scope, Scope::Mine);
        assert_eq!(ctx.search_text, "p");
        assert_eq!(ctx.selected_date, day(11));
        assert_eq!(ctx.current_user_email.as_deref(), Some("me@x.com"));
        assert_eq!(ctx.current_location, Some(Coordinates::new(1.0, 2.0)));
        assert_eq!(ctx.now, now);
    }

    #[test]
    fn entries_follow_selected_day() {
        let mut feed = FeedState::new(day(10));
        feed.apply_snapshot(1, MatchSnapshot {
            matches: vec![game("today", day(10)), game("tomorrow", day(11))],
            skipped: 0,
        });
        let now = day(10).and_hms_opt(9, 0, 0).unwrap();

        let ctx = feed.context(None, now);
        assert_eq!(feed.entries(&ctx)[0].game.id, "today");

        feed.next_day();
        let ctx = feed.context(None, now);
        let entries = feed.entries(&ctx);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].game.id, "tomorrow");
    }

    #[test]
    fn detail_keeps_roster_for_same_match_only() {
        let mut feed = FeedState::new(day(10));
        feed.apply_snapshot(1, snapshot(&["a", "b"]));
        let ctx = feed.context(None, day(10).and_hms_opt(9, 0, 0).unwrap());
        let entries = feed.entries(&ctx).to_vec();

        let mut detail = DetailState::default();
        detail.open(entries[0].clone());
        detail.roster = Some(Roster::default());
        detail.open(entries[0].clone());
        assert!(detail.roster.is_some());
        detail.open(entries[1].clone());
        assert!(detail.roster.is_none());
        assert!(detail.is_showing("b"));
    }
}
