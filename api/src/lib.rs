pub mod client;
pub mod context;
pub mod draft;
pub mod feed;
pub mod geo;
pub mod wire;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::debug;

pub use context::{Clock, FixedClock, LocationProvider, Scope, SystemClock, ViewerContext};
pub use feed::{FeedCache, FeedEntry, compute_feed, format_time_of_day, short_location_label};
pub use geo::{Coordinates, haversine_distance_km};

// ---------------------------------------------------------------------------
// Domain types, independent of the remote wire format
// ---------------------------------------------------------------------------

/// A pickup match as published by the remote service. Only records that
/// carry a date and an end time make it this far; see `wire::RawMatch`.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: String, // free text, often "street, district, city, region, country"
    pub coordinates: Option<Coordinates>,
    pub capacity: u32,
    pub joined_players: Vec<Player>,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: NaiveTime,
    pub price: f64,
    pub creator_email: Option<String>,
    pub creator_picture: Option<String>,
    pub communication_link: Option<String>,
}

impl Match {
    /// Free slots left. Negative when the match is over-subscribed.
    pub fn remaining_places(&self) -> i64 {
        i64::from(self.capacity) - self.joined_players.len() as i64
    }

    pub fn is_full(&self) -> bool {
        self.remaining_places() <= 0
    }

    /// Kick-off instant. A record without a start time counts down to its end.
    pub fn start_instant(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time.unwrap_or(self.end_time))
    }

    pub fn end_instant(&self) -> NaiveDateTime {
        self.date.and_time(self.end_time)
    }

    pub fn format(&self) -> Option<MatchFormat> {
        MatchFormat::from_capacity(self.capacity)
    }

    pub fn is_created_by(&self, email: &str) -> bool {
        self.creator_email.as_deref() == Some(email)
    }

    pub fn short_location(&self) -> String {
        short_location_label(&self.location)
    }

    /// "HH:MM - HH:MM", with a placeholder when the start time is unknown.
    pub fn time_range_label(&self) -> String {
        let start = self
            .start_time
            .map(format_time_of_day)
            .unwrap_or_else(|| "--:--".to_string());
        format!("{start} - {}", format_time_of_day(self.end_time))
    }

    pub fn maps_url(&self) -> Option<String> {
        self.coordinates.map(|c| {
            format!(
                "https://www.google.com/maps/search/?api=1&query={},{}",
                c.latitude, c.longitude
            )
        })
    }
}

/// Team sizes offered when creating a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchFormat {
    FourASide,
    FiveASide,
    SixASide,
}

impl MatchFormat {
    pub const ALL: [MatchFormat; 3] = [
        MatchFormat::FourASide,
        MatchFormat::FiveASide,
        MatchFormat::SixASide,
    ];

    pub fn from_capacity(capacity: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.capacity() == capacity)
    }

    pub fn capacity(&self) -> u32 {
        match self {
            MatchFormat::FourASide => 8,
            MatchFormat::FiveASide => 10,
            MatchFormat::SixASide => 12,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchFormat::FourASide => "4v4",
            MatchFormat::FiveASide => "5v5",
            MatchFormat::SixASide => "6v6",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Player {
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub picture: Option<String>,
}

impl Player {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone().unwrap_or_else(|| "Player".to_string())
        } else {
            name.to_string()
        }
    }
}

/// Players signed up for a match, as seen by the current viewer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    pub joined: bool,
    pub players: Vec<Player>,
}

impl Roster {
    pub fn remove_player(&mut self, email: &str) {
        self.players.retain(|p| p.email.as_deref() != Some(email));
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub picture: Option<String>,
}

impl Profile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// One fetch of the match list. Records that failed validation are counted,
/// never surfaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchSnapshot {
    pub matches: Vec<Match>,
    pub skipped: usize,
}

impl MatchSnapshot {
    pub fn from_raw(raw: Vec<wire::RawMatch>) -> Self {
        let mut snapshot = MatchSnapshot::default();
        for record in raw {
            match Match::try_from(record) {
                Ok(m) => snapshot.matches.push(m),
                Err(e) => {
                    debug!("skipping malformed match record: {e}");
                    snapshot.skipped += 1;
                }
            }
        }
        snapshot
    }
}
