use crate::id::MovieId;
use chrono::{DateTime, Utc};
use marquee_shared::Masked;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A movie document. Everything besides `_id` and `shows` (title, poster,
/// runtime, ...) is carried through untouched in `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "_id")]
    pub id: MovieId,
    /// Calendar-date key -> showtimes screening that day.
    #[serde(default)]
    pub shows: BTreeMap<String, Vec<Showtime>>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Showtime {
    pub id: String,
    /// Seats still available.
    #[serde(with = "seat_count")]
    pub seats: u32,
    #[serde(default)]
    pub bookings: Vec<Booking>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Uuid>,
    pub name: String,
    pub email: Masked<String>,
    pub phone_number: Masked<String>,
    #[serde(with = "seat_count")]
    pub seats: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booked_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn new(
        reference: Uuid,
        name: String,
        email: String,
        phone_number: String,
        seats: u32,
    ) -> Self {
        Self {
            reference: Some(reference),
            name,
            email: Masked(email),
            phone_number: Masked(phone_number),
            seats,
            booked_at: Some(Utc::now()),
        }
    }
}

/// Where a showtime sits inside its movie document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShowtimeLocation {
    pub date: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    #[error("showtime {0} not found")]
    NotFound(String),
    #[error("showtime id {show_id} appears {count} times in one movie")]
    Duplicate { show_id: String, count: usize },
}

impl Movie {
    /// Finds the single showtime with `show_id` across every date bucket.
    ///
    /// Showtime ids must be unique per movie; a repeated id is reported as
    /// [`LocateError::Duplicate`] instead of picking one of the matches.
    pub fn locate_showtime(
        &self,
        show_id: &str,
    ) -> Result<(ShowtimeLocation, &Showtime), LocateError> {
        let mut matches = self.shows.iter().flat_map(move |(date, showtimes)| {
            showtimes
                .iter()
                .enumerate()
                .filter(move |(_, show)| show.id == show_id)
                .map(move |(index, show)| {
                    (
                        ShowtimeLocation {
                            date: date.clone(),
                            index,
                        },
                        show,
                    )
                })
        });

        let first = matches
            .next()
            .ok_or_else(|| LocateError::NotFound(show_id.to_string()))?;

        let extra = matches.count();
        if extra > 0 {
            return Err(LocateError::Duplicate {
                show_id: show_id.to_string(),
                count: extra + 1,
            });
        }

        Ok(first)
    }

    pub fn showtime_at(&self, location: &ShowtimeLocation) -> Option<&Showtime> {
        self.shows.get(&location.date)?.get(location.index)
    }

    pub fn showtime_at_mut(&mut self, location: &ShowtimeLocation) -> Option<&mut Showtime> {
        self.shows.get_mut(&location.date)?.get_mut(location.index)
    }

    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            id: self.id,
            shows: self
                .shows
                .iter()
                .map(|(date, showtimes)| {
                    let summaries = showtimes
                        .iter()
                        .map(|show| ShowtimeSummary {
                            id: show.id.clone(),
                            seats: show.seats,
                            details: show.details.clone(),
                        })
                        .collect();
                    (date.clone(), summaries)
                })
                .collect(),
            details: self.details.clone(),
        }
    }
}

/// Listing view of a movie: showtimes without their bookings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    #[serde(rename = "_id")]
    pub id: MovieId,
    pub shows: BTreeMap<String, Vec<ShowtimeSummary>>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowtimeSummary {
    pub id: String,
    pub seats: u32,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Seat counts are integers, but older documents store them as numeric strings.
mod seat_count {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    pub fn serialize<S>(value: &u32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(*value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid seat count {s:?}"))),
        }
    }
}
