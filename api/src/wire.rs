//! Raw wire types of the match service: serde shapes for its JSON.
//! Every field is optional here; `TryFrom<RawMatch> for Match` decides what
//! a usable record is.

use crate::{Coordinates, Match, Player, Profile};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use log::debug;
use serde::Deserialize;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("invalid date `{0}`")]
    InvalidDate(String),
    #[error("invalid time `{0}`")]
    InvalidTime(String),
}

/// The service stores some numbers as text (prices typed into a form).
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawNumber::Number(n) => Some(*n),
            RawNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    pub fn into_string(self) -> String {
        match self {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

// ---------------------------------------------------------------------------
// Match list  (GET /api/getmatch)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct MatchesResponse {
    pub matches: Option<Vec<RawMatch>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RawMatch {
    pub id: Option<RawId>,
    pub nom: Option<String>,
    pub description: Option<String>,
    pub localisation: Option<String>,
    pub latitude: Option<RawNumber>,
    pub longitude: Option<RawNumber>,
    pub places: Option<RawNumber>,
    pub prix: Option<RawNumber>,
    pub joueur_de_match: Option<Vec<RawPlayer>>,
    pub date_match: Option<String>,
    pub heure_debut: Option<String>,
    pub heure_fin: Option<String>,
    pub profiles: Option<RawCreator>,
    pub creator_picture: Option<String>,
    pub communication_link: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RawCreator {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RawPlayer {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub picture: Option<String>,
}

impl From<RawPlayer> for Player {
    fn from(raw: RawPlayer) -> Self {
        Player {
            email: raw.email,
            first_name: raw.first_name.unwrap_or_default(),
            last_name: raw.last_name.unwrap_or_default(),
            phone: raw.phone,
            picture: raw.picture,
        }
    }
}

impl TryFrom<RawMatch> for Match {
    type Error = ParseError;

    fn try_from(raw: RawMatch) -> Result<Self, Self::Error> {
        // Join, leave, roster and delete all address a match by id.
        let id = raw
            .id
            .map(RawId::into_string)
            .ok_or(ParseError::MissingField("id"))?;
        let date = required(raw.date_match, "date_match")
            .and_then(|s| parse_match_date(&s))?;
        let end_time = required(raw.heure_fin, "heure_fin")
            .and_then(|s| parse_time_of_day(&s))?;
        // Optional: an unreadable start only loses the countdown.
        let start_time = raw
            .heure_debut
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| match parse_time_of_day(&s) {
                Ok(t) => Some(t),
                Err(e) => {
                    debug!("match {id}: ignoring start time, {e}");
                    None
                }
            });

        let coordinates = match (
            raw.latitude.as_ref().and_then(RawNumber::as_f64),
            raw.longitude.as_ref().and_then(RawNumber::as_f64),
        ) {
            (Some(lat), Some(lon)) => {
                Some(Coordinates::new(lat, lon)).filter(Coordinates::is_valid)
            }
            _ => None,
        };

        // Negative or non-numeric capacities become 0 (always full); fractions truncate.
        let capacity = raw
            .places
            .as_ref()
            .and_then(RawNumber::as_f64)
            .filter(|p| p.is_finite() && *p >= 0.0)
            .map(|p| p as u32)
            .unwrap_or(0);

        Ok(Match {
            id,
            name: raw.nom.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            location: raw.localisation.unwrap_or_default(),
            coordinates,
            capacity,
            joined_players: raw
                .joueur_de_match
                .unwrap_or_default()
                .into_iter()
                .map(Player::from)
                .collect(),
            date,
            start_time,
            end_time,
            price: raw.prix.as_ref().and_then(RawNumber::as_f64).unwrap_or(0.0),
            creator_email: raw.profiles.and_then(|p| p.email),
            creator_picture: raw.creator_picture,
            communication_link: raw.communication_link,
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ParseError> {
    value
        .filter(|s| !s.trim().is_empty())
        .ok_or(ParseError::MissingField(field))
}

/// Accepts `YYYY-MM-DD`, a full timestamp (its date part is kept as written),
/// or the `DD/MM/YYYY` form used by the creation screen.
pub fn parse_match_date(text: &str) -> Result<NaiveDate, ParseError> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(ts.date());
    }
    NaiveDate::parse_from_str(text, "%d/%m/%Y").map_err(|_| ParseError::InvalidDate(text.to_owned()))
}

/// `HH:MM` or `HH:MM:SS`, 24-hour clock.
pub fn parse_time_of_day(text: &str) -> Result<NaiveTime, ParseError> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .map_err(|_| ParseError::InvalidTime(text.to_owned()))
}

// ---------------------------------------------------------------------------
// Action endpoints  (matchjoin, matchleave, getmatchjoin, deletematch, ...)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ActionResponse {
    pub success: bool,
    pub error: Option<String>,
    pub joined: Option<bool>,
    pub players: Option<Vec<RawPlayer>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ProfileResponse {
    pub success: bool,
    pub data: Option<RawProfile>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RawProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub pictures: Option<String>,
}

impl RawProfile {
    pub fn into_profile(self, email: &str) -> Profile {
        Profile {
            email: email.to_owned(),
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            birth_date: self.birth_date.and_then(|d| parse_match_date(&d).ok()),
            gender: self.gender.filter(|g| !g.is_empty()),
            picture: self.pictures,
        }
    }
}

// ---------------------------------------------------------------------------
// IP geolocation  (ip-api.com)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct IpLocationResponse {
    pub status: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{day, hm};

    fn raw(json: &str) -> RawMatch {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn full_record_maps_every_field() {
        let m = Match::try_from(raw(
            r#"{
                "id": 42,
                "nom": "Match au Parc",
                "description": "Friendly",
                "localisation": "Rue 5, Anfa, Casablanca, Maroc",
                "latitude": 33.59,
                "longitude": "-7.63",
                "places": 10,
                "prix": "25",
                "joueur_de_match": [{"email": "a@x.com", "first_name": "Ali"}],
                "date_match": "2026-03-10",
                "heure_debut": "18:00:00",
                "heure_fin": "19:30",
                "profiles": {"email": "owner@x.com"},
                "communication_link": "https://chat.example/abc"
            }"#,
        ))
        .unwrap();

        assert_eq!(m.id, "42");
        assert_eq!(m.name, "Match au Parc");
        assert_eq!(m.coordinates, Some(Coordinates::new(33.59, -7.63)));
        assert_eq!(m.capacity, 10);
        assert_eq!(m.price, 25.0);
        assert_eq!(m.joined_players.len(), 1);
        assert_eq!(m.joined_players[0].first_name, "Ali");
        assert_eq!(m.date, day(2026, 3, 10));
        assert_eq!(m.start_time, Some(hm(18, 0)));
        assert_eq!(m.end_time, hm(19, 30));
        assert_eq!(m.creator_email.as_deref(), Some("owner@x.com"));
    }

    #[test]
    fn missing_end_time_is_malformed() {
        let err = Match::try_from(raw(r#"{"id": 1, "date_match": "2026-03-10"}"#)).unwrap_err();
        assert_eq!(err, ParseError::MissingField("heure_fin"));
    }

    #[test]
    fn missing_or_blank_date_is_malformed() {
        let err = Match::try_from(raw(r#"{"id": 1, "heure_fin": "19:00"}"#)).unwrap_err();
        assert_eq!(err, ParseError::MissingField("date_match"));
        let err = Match::try_from(raw(r#"{"id": 1, "date_match": " ", "heure_fin": "19:00"}"#))
            .unwrap_err();
        assert_eq!(err, ParseError::MissingField("date_match"));
    }

    #[test]
    fn garbage_time_is_malformed() {
        let err = Match::try_from(raw(
            r#"{"id": 1, "date_match": "2026-03-10", "heure_fin": "late"}"#,
        ))
        .unwrap_err();
        assert_eq!(err, ParseError::InvalidTime("late".into()));
    }

    #[test]
    fn half_a_map_pin_means_no_coordinates() {
        let m = Match::try_from(raw(
            r#"{"id": "x", "date_match": "2026-03-10", "heure_fin": "19:00", "latitude": 33.1, "longitude": null}"#,
        ))
        .unwrap();
        assert_eq!(m.coordinates, None);
        assert_eq!(m.capacity, 0);
        assert!(m.is_full());
        assert!(m.start_time.is_none());
    }

    #[test]
    fn unreadable_start_time_keeps_the_record() {
        let m = Match::try_from(raw(
            r#"{"id": 1, "date_match": "2026-03-10", "heure_debut": "18h", "heure_fin": "19:30", "places": 10}"#,
        ))
        .unwrap();
        assert_eq!(m.start_time, None);
        assert_eq!(m.start_instant(), day(2026, 3, 10).and_time(hm(19, 30)));
    }

    #[test]
    fn record_without_id_is_skipped() {
        let err = Match::try_from(raw(r#"{"date_match": "2026-03-10", "heure_fin": "19:30"}"#))
            .unwrap_err();
        assert_eq!(err, ParseError::MissingField("id"));

        let snapshot = crate::MatchSnapshot::from_raw(vec![
            raw(r#"{"date_match": "2026-03-10", "heure_fin": "19:30"}"#),
            raw(r#"{"id": 2, "date_match": "2026-03-10", "heure_fin": "19:30"}"#),
        ]);
        assert_eq!(snapshot.matches.len(), 1);
        assert_eq!(snapshot.skipped, 1);
    }

    #[test]
    fn out_of_range_or_nan_pin_means_no_coordinates() {
        for (lat, lon) in [(r#""NaN""#, "-7.6"), ("91.0", "-7.6"), ("33.5", "200")] {
            let m = Match::try_from(raw(&format!(
                r#"{{"id": 1, "date_match": "2026-03-10", "heure_fin": "19:00", "latitude": {lat}, "longitude": {lon}}}"#
            )))
            .unwrap();
            assert_eq!(m.coordinates, None, "lat {lat} lon {lon}");
        }
    }

    #[test]
    fn fractional_capacity_truncates() {
        let m = Match::try_from(raw(
            r#"{"id": 1, "date_match": "2026-03-10", "heure_fin": "19:00", "places": 10.5}"#,
        ))
        .unwrap();
        assert_eq!(m.capacity, 10);
        let m = Match::try_from(raw(
            r#"{"id": 1, "date_match": "2026-03-10", "heure_fin": "19:00", "places": -3}"#,
        ))
        .unwrap();
        assert_eq!(m.capacity, 0);
    }

    #[test]
    fn date_formats() {
        assert_eq!(parse_match_date("2026-03-10"), Ok(day(2026, 3, 10)));
        assert_eq!(parse_match_date("2026-03-10T00:00:00+00:00"), Ok(day(2026, 3, 10)));
        assert_eq!(parse_match_date("2026-03-10T00:00:00"), Ok(day(2026, 3, 10)));
        assert_eq!(parse_match_date("10/03/2026"), Ok(day(2026, 3, 10)));
        assert!(parse_match_date("31/02/2026").is_err());
    }

    #[test]
    fn profile_maps_birth_date_and_picture() {
        let raw: RawProfile = serde_json::from_str(
            r#"{"first_name": "Sara", "last_name": "B", "phone": "0600000000", "birth_date": "1999-04-02", "gender": "female", "pictures": "https://img/1.jpg"}"#,
        )
        .unwrap();
        let profile = raw.into_profile("sara@x.com");
        assert_eq!(profile.full_name(), "Sara B");
        assert_eq!(profile.birth_date, Some(day(1999, 4, 2)));
        assert_eq!(profile.picture.as_deref(), Some("https://img/1.jpg"));
    }
}
