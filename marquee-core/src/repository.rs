use async_trait::async_trait;
use crate::id::MovieId;
use crate::models::{Booking, Movie, ShowtimeLocation};

/// Compare-and-swap on one showtime's seat counter.
///
/// Applies only when the showtime at `location` still has id `show_id` and
/// `expected_seats` remaining. On success the counter becomes `new_seats` and
/// `booking` is appended to that showtime's bookings, both in one write.
#[derive(Debug, Clone)]
pub struct SeatUpdate {
    pub location: ShowtimeLocation,
    pub show_id: String,
    pub expected_seats: u32,
    pub new_seats: u32,
    pub booking: Booking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    /// Nothing was written: the movie is gone or the showtime no longer
    /// matches what the caller read.
    NotApplied,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("stored document {id} is malformed: {reason}")]
    Corrupt { id: String, reason: String },
    #[error("movie {0} already exists")]
    AlreadyExists(MovieId),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

/// Document store holding one document per movie.
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Movie>, StoreError>;

    async fn get_by_id(&self, id: &MovieId) -> Result<Option<Movie>, StoreError>;

    async fn conditional_update(
        &self,
        id: &MovieId,
        update: &SeatUpdate,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Seeding only.
    async fn insert(&self, movie: &Movie) -> Result<(), StoreError>;
}
