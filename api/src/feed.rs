//! Match feed: filter, enrich and rank a fetched match list for one viewer.
//!
//! `compute_feed` is a pure function of its arguments. It never fails: bad
//! records were already dropped by `wire::RawMatch` validation, and missing
//! viewer data (identity, location) only narrows or flattens the result.
//!
//! Ranking, highest priority first:
//!
//! 1. open matches before full ones
//! 2. nearest first (no distance → `DISTANCE_SENTINEL_KM`)
//! 3. soonest kick-off first
//!
//! Remaining ties keep fetch order.

use crate::context::{Scope, ViewerContext};
use crate::Match;
use chrono::NaiveTime;
use std::cmp::Ordering;

/// Distance assigned when either side has no coordinates. Larger than any
/// distance on Earth, so such matches rank last within their fullness group.
pub const DISTANCE_SENTINEL_KM: f64 = 99_999.0;

/// A visible match plus the values it was ranked by.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub game: Match,
    pub distance_km: f64,
    pub remaining_places: i64,
    pub is_full: bool,
    /// Negative once the match has kicked off but not yet ended.
    pub minutes_until_start: f64,
}

impl FeedEntry {
    pub fn has_distance(&self) -> bool {
        self.distance_km < DISTANCE_SENTINEL_KM
    }

    pub fn distance_label(&self) -> Option<String> {
        if !self.has_distance() {
            return None;
        }
        Some(if self.distance_km < 1.0 {
            format!("{:.0} m", self.distance_km * 1000.0)
        } else {
            format!("{:.1} km", self.distance_km)
        })
    }

    pub fn places_label(&self) -> String {
        match self.remaining_places {
            r if r <= 0 => "Full".to_string(),
            1 => "1 spot left".to_string(),
            r => format!("{r} spots left"),
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.minutes_until_start < 0.0
    }
}

pub fn compute_feed(matches: &[Match], ctx: &ViewerContext) -> Vec<FeedEntry> {
    let needle = ctx.search_text.to_lowercase();
    let mut feed: Vec<FeedEntry> = matches
        .iter()
        .filter(|m| is_visible(m, ctx, &needle))
        .map(|m| enrich(m, ctx))
        .collect();
    // `sort_by` is stable: equal entries stay in fetch order.
    feed.sort_by(compare_entries);
    feed
}

/// Every filter predicate, AND-combined. `needle` is the lowercased search text.
fn is_visible(m: &Match, ctx: &ViewerContext, needle: &str) -> bool {
    if m.end_instant() <= ctx.now {
        return false;
    }
    if m.date != ctx.selected_date {
        return false;
    }
    if ctx.scope == Scope::Mine {
        let Some(viewer) = ctx.current_user_email.as_deref() else {
            return false;
        };
        if !m.is_created_by(viewer) {
            return false;
        }
    }
    matches_search(m, needle)
}

fn matches_search(m: &Match, needle: &str) -> bool {
    needle.is_empty()
        || m.name.to_lowercase().contains(needle)
        || m.location.to_lowercase().contains(needle)
}

fn enrich(m: &Match, ctx: &ViewerContext) -> FeedEntry {
    let distance_km = match (ctx.current_location, m.coordinates) {
        (Some(viewer), Some(pitch)) => viewer.distance_km(&pitch),
        _ => DISTANCE_SENTINEL_KM,
    };
    let remaining_places = m.remaining_places();
    let minutes_until_start = (m.start_instant() - ctx.now).num_seconds() as f64 / 60.0;

    FeedEntry {
        game: m.clone(),
        distance_km,
        remaining_places,
        is_full: remaining_places <= 0,
        minutes_until_start,
    }
}

/// The single ranking comparator: fullness, then distance, then kick-off.
pub fn compare_entries(a: &FeedEntry, b: &FeedEntry) -> Ordering {
    a.is_full
        .cmp(&b.is_full)
        .then_with(|| a.distance_km.total_cmp(&b.distance_km))
        .then_with(|| a.minutes_until_start.total_cmp(&b.minutes_until_start))
}

/// Zero-padded 24-hour `HH:MM`.
pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Third comma-separated segment of a free-text address (usually the city),
/// or an empty string when there are fewer than three segments.
pub fn short_location_label(location: &str) -> String {
    location
        .split(',')
        .nth(2)
        .map(|part| part.trim().to_string())
        .unwrap_or_default()
}

/// Remembers the last `(matches, ctx)` pair and its feed.
#[derive(Debug, Default)]
pub struct FeedCache {
    key: Option<(Vec<Match>, ViewerContext)>,
    feed: Vec<FeedEntry>,
}

impl FeedCache {
    pub fn get(&mut self, matches: &[Match], ctx: &ViewerContext) -> &[FeedEntry] {
        let hit = self
            .key
            .as_ref()
            .is_some_and(|(m, c)| m.as_slice() == matches && c == ctx);
        if !hit {
            self.feed = compute_feed(matches, ctx);
            self.key = Some((matches.to_vec(), ctx.clone()));
        }
        &self.feed
    }

    pub fn invalidate(&mut self) {
        self.key = None;
        self.feed.clear();
    }
}
