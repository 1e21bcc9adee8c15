use marquee_core::{Movie, MovieId, MovieStore, MovieSummary};
use std::sync::Arc;
use std::time::Duration;

use crate::engine::call_store;
use crate::error::{BookingError, BookingResult};

/// Read side of the service: listing and fetching movies.
#[derive(Clone)]
pub struct MovieCatalog {
    store: Arc<dyn MovieStore>,
    store_timeout: Duration,
}

impl MovieCatalog {
    pub fn new(store: Arc<dyn MovieStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    pub async fn list_movies(&self) -> BookingResult<Vec<MovieSummary>> {
        let movies = call_store(self.store_timeout, "list", self.store.list()).await?;
        Ok(movies.iter().map(Movie::summary).collect())
    }

    /// Full movie document, bookings included. The id is checked before the
    /// store is asked.
    pub async fn get_movie(&self, id: &str) -> BookingResult<Movie> {
        let id = MovieId::parse(id)?;
        call_store(self.store_timeout, "get_by_id", self.store.get_by_id(&id))
            .await?
            .ok_or(BookingError::MovieNotFound(id))
    }
}
