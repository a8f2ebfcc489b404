use crate::{Coordinates, MatchFormat};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("field `{0}` is required")]
    MissingField(&'static str),
    #[error("capacity must be 8, 10 or 12 players")]
    InvalidCapacity,
    #[error("price must be a positive number")]
    InvalidPrice,
    #[error("date must be a real day written DD/MM/YYYY")]
    InvalidDate,
    #[error("times must be HH:MM with HH 0-23 and MM 0-59")]
    InvalidTime,
    #[error("cannot create a match in the past")]
    InPast,
    #[error("end time must be after start time")]
    EndNotAfterStart,
    #[error("phone must be exactly 10 digits")]
    InvalidPhone,
    #[error("birth date must be a past day written DD/MM/YYYY")]
    InvalidBirthDate,
    #[error("gender must be `male` or `female`")]
    InvalidGender,
}

/// The match creation form, as typed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MatchDraft {
    pub name: String,
    pub description: String,
    pub communication_link: String,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub capacity: Option<u32>,
    pub price: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

/// A validated draft, shaped as the `savematch` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMatch {
    pub nom: String,
    pub description: String,
    pub communication_link: String,
    pub localisation: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub places: u32,
    pub prix: f64,
    pub date_match: String,
    pub heure_debut: String,
    pub heure_fin: String,
}

impl MatchDraft {
    pub fn validate(&self, now: NaiveDateTime) -> Result<NewMatch, DraftError> {
        let fields = [
            ("name", &self.name),
            ("description", &self.description),
            ("communication_link", &self.communication_link),
            ("location", &self.location),
            ("price", &self.price),
            ("date", &self.date),
            ("start_time", &self.start_time),
            ("end_time", &self.end_time),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(DraftError::MissingField(*name));
        }

        let capacity = self.capacity.ok_or(DraftError::MissingField("capacity"))?;
        let format = MatchFormat::from_capacity(capacity).ok_or(DraftError::InvalidCapacity)?;

        let price = self
            .price
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p >= 0.0)
            .ok_or(DraftError::InvalidPrice)?;

        let date = parse_form_date(&self.date).ok_or(DraftError::InvalidDate)?;
        let start = parse_form_time(&self.start_time).ok_or(DraftError::InvalidTime)?;
        let end = parse_form_time(&self.end_time).ok_or(DraftError::InvalidTime)?;

        let kick_off = date.and_time(start);
        if kick_off < now {
            return Err(DraftError::InPast);
        }
        if date.and_time(end) <= kick_off {
            return Err(DraftError::EndNotAfterStart);
        }

        Ok(NewMatch {
            nom: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            communication_link: self.communication_link.trim().to_string(),
            localisation: self.location.trim().to_string(),
            latitude: self.coordinates.map(|c| c.latitude),
            longitude: self.coordinates.map(|c| c.longitude),
            places: format.capacity(),
            prix: price,
            date_match: date.format("%d/%m/%Y").to_string(),
            heure_debut: start.format("%H:%M").to_string(),
            heure_fin: end.format("%H:%M").to_string(),
        })
    }
}

/// The onboarding and profile form, as typed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileDraft {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub birth_date: String,
    pub gender: String,
}

/// A validated profile, shaped as the `saveprofile` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub birth_date: String,
    pub gender: String,
}

impl ProfileDraft {
    pub fn validate(&self, today: NaiveDate) -> Result<NewProfile, DraftError> {
        let fields = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("phone", &self.phone),
            ("birth_date", &self.birth_date),
            ("gender", &self.gender),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(DraftError::MissingField(*name));
        }

        // Spaces, dots and dashes are accepted as separators.
        let phone: String = self
            .phone
            .chars()
            .filter(|c| !matches!(c, ' ' | '.' | '-'))
            .collect();
        if phone.len() != 10 || !phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(DraftError::InvalidPhone);
        }

        let birth_date = parse_birth_date(&self.birth_date)
            .filter(|d| *d < today)
            .ok_or(DraftError::InvalidBirthDate)?;

        let gender = self.gender.trim().to_ascii_lowercase();
        if gender != "male" && gender != "female" {
            return Err(DraftError::InvalidGender);
        }

        Ok(NewProfile {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone,
            birth_date: birth_date.format("%d/%m/%Y").to_string(),
            gender,
        })
    }
}

/// Strict DD/MM/YYYY, zero padded.
fn parse_birth_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let shape = text.len() == 10
        && text.char_indices().all(|(i, c)| match i {
            2 | 5 => c == '/',
            _ => c.is_ascii_digit(),
        });
    if !shape {
        return None;
    }
    parse_form_date(text)
}

fn parse_form_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.trim().split('/');
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_form_time(text: &str) -> Option<NaiveTime> {
    let (h, m) = text.trim().split_once(':')?;
    let hour = h.trim().parse::<u32>().ok()?;
    let minute = m.trim().parse::<u32>().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at, day};

    fn draft() -> MatchDraft {
        MatchDraft {
            name: "Five a side".into(),
            description: "Bring water".into(),
            communication_link: "https://chat.example/g".into(),
            location: "Rue 1, Maarif, Casablanca".into(),
            coordinates: Some(Coordinates::new(33.58, -7.63)),
            capacity: Some(10),
            price: "30".into(),
            date: "12/03/2026".into(),
            start_time: "18:00".into(),
            end_time: "19:30".into(),
        }
    }

    fn profile() -> ProfileDraft {
        ProfileDraft {
            first_name: " Sara ".into(),
            last_name: "Bennani".into(),
            phone: "06 12 34 56 78".into(),
            birth_date: "29/02/2000".into(),
            gender: "Female".into(),
        }
    }

    fn now() -> NaiveDateTime {
        at(day(2026, 3, 10), 12, 0)
    }

    #[test]
    fn valid_draft_becomes_request_body() {
        let new_match = draft().validate(now()).unwrap();
        assert_eq!(new_match.places, 10);
        assert_eq!(new_match.prix, 30.0);
        assert_eq!(new_match.heure_debut, "18:00");

        let body = serde_json::to_value(&new_match).unwrap();
        assert_eq!(body["nom"], "Five a side");
        assert_eq!(body["communicationLink"], "https://chat.example/g");
        assert_eq!(body["dateMatch"], "12/03/2026");
        assert_eq!(body["heureFin"], "19:30");
        assert_eq!(body["latitude"], 33.58);
    }

    #[test]
    fn empty_fields_are_reported_by_name() {
        let mut d = draft();
        d.location = "  ".into();
        assert_eq!(d.validate(now()), Err(DraftError::MissingField("location")));
        let mut d = draft();
        d.capacity = None;
        assert_eq!(d.validate(now()), Err(DraftError::MissingField("capacity")));
    }

    #[test]
    fn capacity_must_be_a_known_format() {
        let mut d = draft();
        d.capacity = Some(11);
        assert_eq!(d.validate(now()), Err(DraftError::InvalidCapacity));
    }

    #[test]
    fn price_accepts_decimal_comma() {
        let mut d = draft();
        d.price = "12,5".into();
        assert_eq!(d.validate(now()).unwrap().prix, 12.5);
        d.price = "-3".into();
        assert_eq!(d.validate(now()), Err(DraftError::InvalidPrice));
    }

    #[test]
    fn dates_and_times_are_checked() {
        let mut d = draft();
        d.date = "31/02/2026".into();
        assert_eq!(d.validate(now()), Err(DraftError::InvalidDate));

        let mut d = draft();
        d.start_time = "24:00".into();
        assert_eq!(d.validate(now()), Err(DraftError::InvalidTime));

        let mut d = draft();
        d.end_time = "18:60".into();
        assert_eq!(d.validate(now()), Err(DraftError::InvalidTime));
    }

    #[test]
    fn past_and_inverted_slots_are_rejected() {
        let mut d = draft();
        d.date = "09/03/2026".into();
        assert_eq!(d.validate(now()), Err(DraftError::InPast));

        let mut d = draft();
        d.end_time = "18:00".into();
        assert_eq!(d.validate(now()), Err(DraftError::EndNotAfterStart));
    }

    #[test]
    fn valid_profile_becomes_request_body() {
        let new_profile = profile().validate(day(2026, 3, 10)).unwrap();
        assert_eq!(new_profile.phone, "0612345678");
        assert_eq!(new_profile.gender, "female");

        let body = serde_json::to_value(&new_profile).unwrap();
        assert_eq!(body["firstName"], "Sara");
        assert_eq!(body["lastName"], "Bennani");
        assert_eq!(body["birthDate"], "29/02/2000");
    }

    #[test]
    fn phone_needs_ten_digits() {
        let mut p = profile();
        p.phone = "061234567".into();
        assert_eq!(p.validate(day(2026, 3, 10)), Err(DraftError::InvalidPhone));
        p.phone = "06123456789".into();
        assert_eq!(p.validate(day(2026, 3, 10)), Err(DraftError::InvalidPhone));
        p.phone = "+212612345".into();
        assert_eq!(p.validate(day(2026, 3, 10)), Err(DraftError::InvalidPhone));
    }

    #[test]
    fn birth_date_must_be_a_real_past_day() {
        let today = day(2026, 3, 10);
        for bad in ["31/02/2000", "29/02/2001", "1/2/2000", "2000-02-01", "10/03/2026", "01/01/2030"] {
            let mut p = profile();
            p.birth_date = bad.into();
            assert_eq!(p.validate(today), Err(DraftError::InvalidBirthDate), "{bad}");
        }
    }

    #[test]
    fn profile_fields_are_required() {
        let mut p = profile();
        p.last_name = String::new();
        assert_eq!(p.validate(day(2026, 3, 10)), Err(DraftError::MissingField("last_name")));
        let mut p = profile();
        p.gender = "other".into();
        assert_eq!(p.validate(day(2026, 3, 10)), Err(DraftError::InvalidGender));
    }
}
