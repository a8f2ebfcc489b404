//! Everything the feed engine needs to know about the person looking at it,
//! and the collaborators that supply it.

use crate::Coordinates;
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::future::Future;

/// "All matches" vs "my matches".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scope {
    #[default]
    All,
    Mine,
}

impl Scope {
    pub fn toggle(self) -> Self {
        match self {
            Scope::All => Scope::Mine,
            Scope::Mine => Scope::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Scope::All => "Open matches",
            Scope::Mine => "My matches",
        }
    }
}

/// Built per render from the shell's state. `now` is local wall-clock time,
/// the same frame of reference as match dates and times.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerContext {
    pub current_user_email: Option<String>,
    pub current_location: Option<Coordinates>,
    pub selected_date: NaiveDate,
    pub scope: Scope,
    pub search_text: String,
    pub now: NaiveDateTime,
}

impl ViewerContext {
    /// Anonymous viewer, no location, all matches of today.
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            current_user_email: None,
            current_location: None,
            selected_date: now.date(),
            scope: Scope::All,
            search_text: String::new(),
            now,
        }
    }
}

pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Where the viewer is. `None` covers both "permission denied" and
/// "lookup failed"; the feed falls back to the distance sentinel.
pub trait LocationProvider {
    fn current_location(&self) -> impl Future<Output = Option<Coordinates>> + Send;
}

/// A fixed pin, or `None` for a viewer who declined to share a location.
impl LocationProvider for Option<Coordinates> {
    fn current_location(&self) -> impl Future<Output = Option<Coordinates>> + Send {
        let location = *self;
        async move { location }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at, day};

    #[test]
    fn scope_toggles_both_ways() {
        assert_eq!(Scope::All.toggle(), Scope::Mine);
        assert_eq!(Scope::Mine.toggle(), Scope::All);
        assert_eq!(Scope::default(), Scope::All);
    }

    #[test]
    fn new_context_selects_today() {
        let now = at(day(2026, 3, 10), 23, 59);
        let ctx = ViewerContext::new(now);
        assert_eq!(ctx.selected_date, day(2026, 3, 10));
        assert_eq!(ctx.scope, Scope::All);
        assert!(ctx.search_text.is_empty());
    }

    #[test]
    fn fixed_clock_is_fixed() {
        let now = at(day(2026, 3, 10), 12, 0);
        let clock = FixedClock(now);
        assert_eq!(clock.now(), now);
        assert_eq!(clock.now(), clock.now());
    }

    #[tokio::test]
    async fn fixed_pin_resolves_to_itself() {
        let pin = Some(Coordinates::new(33.5, -7.6));
        assert_eq!(pin.current_location().await, pin);
        assert_eq!(None::<Coordinates>.current_location().await, None);
    }
}
