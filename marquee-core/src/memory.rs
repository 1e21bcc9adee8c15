use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::id::MovieId;
use crate::models::Movie;
use crate::repository::{MovieStore, SeatUpdate, StoreError, UpdateOutcome};

/// Process-local movie store.
///
/// The seat check and the write in `conditional_update` happen under one
/// write lock, which gives the same all-or-nothing guarantee as a single
/// database statement.
#[derive(Default)]
pub struct InMemoryMovieStore {
    movies: RwLock<BTreeMap<MovieId, Movie>>,
}

impl InMemoryMovieStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_movies(movies: impl IntoIterator<Item = Movie>) -> Self {
        Self {
            movies: RwLock::new(movies.into_iter().map(|m| (m.id, m)).collect()),
        }
    }

    pub async fn len(&self) -> usize {
        self.movies.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.movies.read().await.is_empty()
    }
}

#[async_trait]
impl MovieStore for InMemoryMovieStore {
    async fn list(&self) -> Result<Vec<Movie>, StoreError> {
        Ok(self.movies.read().await.values().cloned().collect())
    }

    async fn get_by_id(&self, id: &MovieId) -> Result<Option<Movie>, StoreError> {
        Ok(self.movies.read().await.get(id).cloned())
    }

    async fn conditional_update(
        &self,
        id: &MovieId,
        update: &SeatUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut movies = self.movies.write().await;

        let Some(show) = movies
            .get_mut(id)
            .and_then(|movie| movie.showtime_at_mut(&update.location))
        else {
            debug!(movie_id = %id, date = %update.location.date, index = update.location.index, "No showtime at location");
            return Ok(UpdateOutcome::NotApplied);
        };

        if show.id != update.show_id || show.seats != update.expected_seats {
            debug!(movie_id = %id, show_id = %update.show_id, current = show.seats, expected = update.expected_seats, "Showtime changed since read");
            return Ok(UpdateOutcome::NotApplied);
        }

        show.seats = update.new_seats;
        show.bookings.push(update.booking.clone());
        Ok(UpdateOutcome::Applied)
    }

    async fn insert(&self, movie: &Movie) -> Result<(), StoreError> {
        let mut movies = self.movies.write().await;
        if movies.contains_key(&movie.id) {
            return Err(StoreError::AlreadyExists(movie.id));
        }
        movies.insert(movie.id, movie.clone());
        Ok(())
    }
}
