//! Store doubles and fixtures shared by the engine and catalog tests.

use async_trait::async_trait;
use marquee_core::{
    Booking, InMemoryMovieStore, Movie, MovieId, MovieStore, SeatUpdate, Showtime, StoreError,
    UpdateOutcome,
};
use serde_json::{json, Map};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const SHOW_DATE: &str = "2024-05-01";

pub fn showtime(id: &str, seats: u32) -> Showtime {
    let mut details = Map::new();
    details.insert("time".to_string(), json!("19:30"));
    Showtime {
        id: id.to_string(),
        seats,
        bookings: Vec::new(),
        details,
    }
}

/// Movie with a single showtime `S1` on [`SHOW_DATE`] plus `S2` the day after.
pub fn movie(seats: u32) -> Movie {
    let mut details = Map::new();
    details.insert("title".to_string(), json!("Metropolis"));
    Movie {
        id: MovieId::generate(),
        shows: BTreeMap::from([
            (SHOW_DATE.to_string(), vec![showtime("S1", seats)]),
            ("2024-05-02".to_string(), vec![showtime("S2", 50)]),
        ]),
        details,
    }
}

pub fn store_with(movie: &Movie) -> Arc<InMemoryMovieStore> {
    Arc::new(InMemoryMovieStore::with_movies([movie.clone()]))
}

/// Counts every call that reaches the store.
#[derive(Default)]
pub struct CountingStore {
    pub inner: InMemoryMovieStore,
    pub calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MovieStore for CountingStore {
    async fn list(&self) -> Result<Vec<Movie>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list().await
    }

    async fn get_by_id(&self, id: &MovieId) -> Result<Option<Movie>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_by_id(id).await
    }

    async fn conditional_update(
        &self,
        id: &MovieId,
        update: &SeatUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.conditional_update(id, update).await
    }

    async fn insert(&self, movie: &Movie) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(movie).await
    }
}

/// Lets another client book one seat of the same showtime between our read
/// and our write.
pub struct InterleavingStore {
    pub inner: InMemoryMovieStore,
}

#[async_trait]
impl MovieStore for InterleavingStore {
    async fn list(&self) -> Result<Vec<Movie>, StoreError> {
        self.inner.list().await
    }

    async fn get_by_id(&self, id: &MovieId) -> Result<Option<Movie>, StoreError> {
        self.inner.get_by_id(id).await
    }

    async fn conditional_update(
        &self,
        id: &MovieId,
        update: &SeatUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        let rival = SeatUpdate {
            new_seats: update.expected_seats - 1,
            booking: Booking::new(
                uuid::Uuid::new_v4(),
                "Rival".into(),
                "rival@x.com".into(),
                "000".into(),
                1,
            ),
            ..update.clone()
        };
        self.inner.conditional_update(id, &rival).await?;
        self.inner.conditional_update(id, update).await
    }

    async fn insert(&self, movie: &Movie) -> Result<(), StoreError> {
        self.inner.insert(movie).await
    }
}

/// Store that never answers in time.
pub struct StalledStore {
    pub delay: Duration,
}

#[async_trait]
impl MovieStore for StalledStore {
    async fn list(&self) -> Result<Vec<Movie>, StoreError> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }

    async fn get_by_id(&self, _id: &MovieId) -> Result<Option<Movie>, StoreError> {
        tokio::time::sleep(self.delay).await;
        Ok(None)
    }

    async fn conditional_update(
        &self,
        _id: &MovieId,
        _update: &SeatUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        tokio::time::sleep(self.delay).await;
        Ok(UpdateOutcome::NotApplied)
    }

    async fn insert(&self, _movie: &Movie) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Store whose backend is down.
pub struct BrokenStore;

#[async_trait]
impl MovieStore for BrokenStore {
    async fn list(&self) -> Result<Vec<Movie>, StoreError> {
        Err(StoreError::backend(std::io::Error::other("connection refused")))
    }

    async fn get_by_id(&self, _id: &MovieId) -> Result<Option<Movie>, StoreError> {
        Err(StoreError::backend(std::io::Error::other("connection refused")))
    }

    async fn conditional_update(
        &self,
        _id: &MovieId,
        _update: &SeatUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        Err(StoreError::backend(std::io::Error::other("connection refused")))
    }

    async fn insert(&self, _movie: &Movie) -> Result<(), StoreError> {
        Err(StoreError::backend(std::io::Error::other("connection refused")))
    }
}
