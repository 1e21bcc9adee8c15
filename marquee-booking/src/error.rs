use marquee_core::{IdError, MovieId, StoreError};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestField {
    MovieId,
    ShowId,
    Seats,
    Name,
    Email,
    PhoneNumber,
}

impl RequestField {
    /// Name of the field in the request body.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestField::MovieId => "movieId",
            RequestField::ShowId => "showId",
            RequestField::Seats => "seats",
            RequestField::Name => "name",
            RequestField::Email => "email",
            RequestField::PhoneNumber => "phoneNumber",
        }
    }
}

impl fmt::Display for RequestField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRequest {
    #[error("missing field `{0}`")]
    MissingField(RequestField),
    #[error("seat count {0:?} is not a positive integer")]
    InvalidSeatCount(String),
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error(transparent)]
    InvalidIdentifier(#[from] IdError),

    #[error("invalid booking request: {0}")]
    InvalidRequest(#[from] InvalidRequest),

    #[error("movie {0} not found")]
    MovieNotFound(MovieId),

    #[error("showtime {show_id} not found in movie {movie_id}")]
    ShowtimeNotFound { movie_id: MovieId, show_id: String },

    #[error("showtime id {show_id} appears {count} times in movie {movie_id}")]
    DuplicateShowtime {
        movie_id: MovieId,
        show_id: String,
        count: usize,
    },

    #[error("insufficient seats: requested {requested}, available {available}")]
    InsufficientSeats { requested: u64, available: u32 },

    #[error("showtime {show_id} of movie {movie_id} changed before the booking was written")]
    UpdateConflict { movie_id: MovieId, show_id: String },

    #[error("movie store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    #[error("movie store did not answer `{operation}` within {after:?}")]
    StoreTimeout {
        operation: &'static str,
        after: Duration,
    },
}

impl BookingError {
    /// Whether re-issuing the same call (re-read and re-validate) can succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            BookingError::UpdateConflict { .. } | BookingError::StoreTimeout { .. } => true,
            BookingError::StoreUnavailable(source) => {
                matches!(source, StoreError::Backend(_))
            }
            _ => false,
        }
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
