pub mod catalog;
pub mod engine;
pub mod error;
pub mod request;

pub use catalog::MovieCatalog;
pub use engine::{BookingConfirmation, BookingEngine, BookingSettings};
pub use error::{BookingError, BookingResult, InvalidRequest, RequestField};
pub use request::{BookingOrder, BookingRequest, SeatInput};

#[cfg(test)]
pub(crate) mod test_support;
