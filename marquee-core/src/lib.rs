pub mod id;
pub mod memory;
pub mod models;
pub mod repository;

pub use id::{IdError, MovieId};
pub use memory::InMemoryMovieStore;
pub use models::{
    Booking, LocateError, Movie, MovieSummary, Showtime, ShowtimeLocation, ShowtimeSummary,
};
pub use repository::{MovieStore, SeatUpdate, StoreError, UpdateOutcome};
