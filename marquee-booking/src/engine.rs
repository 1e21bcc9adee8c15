use marquee_core::{Booking, LocateError, MovieId, MovieStore, SeatUpdate, StoreError, UpdateOutcome};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{BookingError, BookingResult};
use crate::request::{BookingOrder, BookingRequest};

const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct BookingSettings {
    /// Upper bound for each individual store call.
    pub store_timeout: Duration,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub reference: Uuid,
    pub movie_id: MovieId,
    pub show_id: String,
    pub date: String,
    pub seats_booked: u32,
    pub seats_remaining: u32,
}

/// Books seats against showtimes held in a [`MovieStore`].
///
/// The engine keeps no state of its own between the read and the write. Lost
/// updates are prevented by the store's conditional update: the write only
/// lands if the showtime still holds the seat count that was validated.
#[derive(Clone)]
pub struct BookingEngine {
    store: Arc<dyn MovieStore>,
    settings: BookingSettings,
}

/// Runs one store call under `timeout`, folding store failures into the
/// booking taxonomy.
pub(crate) async fn call_store<T, F>(
    timeout: Duration,
    operation: &'static str,
    call: F,
) -> BookingResult<T>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            error!(operation, error = %e, "Movie store call failed");
            Err(BookingError::StoreUnavailable(e))
        }
        Err(_) => {
            error!(operation, timeout_ms = timeout.as_millis() as u64, "Movie store call timed out");
            Err(BookingError::StoreTimeout {
                operation,
                after: timeout,
            })
        }
    }
}

impl BookingEngine {
    pub fn new(store: Arc<dyn MovieStore>, settings: BookingSettings) -> Self {
        Self { store, settings }
    }

    /// Validates a raw request and books it.
    pub async fn book(&self, request: BookingRequest) -> BookingResult<BookingConfirmation> {
        let order = request.validate()?;
        self.place(order).await
    }

    /// Books an already validated order.
    ///
    /// Exactly one showtime loses `order.seats` seats and gains one booking,
    /// or the store is left untouched and an error is returned. Conflicts are
    /// not retried here since a retry has to re-check availability.
    pub async fn place(&self, order: BookingOrder) -> BookingResult<BookingConfirmation> {
        let timeout = self.settings.store_timeout;

        // 1. Read the movie document
        let movie = call_store(timeout, "get_by_id", self.store.get_by_id(&order.movie_id))
            .await?
            .ok_or(BookingError::MovieNotFound(order.movie_id))?;

        // 2. Locate the showtime; its address comes from this same read
        let (location, show) = movie
            .locate_showtime(&order.show_id)
            .map_err(|e| match e {
                LocateError::NotFound(show_id) => BookingError::ShowtimeNotFound {
                    movie_id: movie.id,
                    show_id,
                },
                LocateError::Duplicate { show_id, count } => {
                    error!(movie_id = %movie.id, %show_id, count, "Showtime id is not unique within movie");
                    BookingError::DuplicateShowtime {
                        movie_id: movie.id,
                        show_id,
                        count,
                    }
                }
            })?;

        // 3. Check availability
        let available = show.seats;
        let seats = match u32::try_from(order.seats) {
            Ok(seats) if seats <= available => seats,
            _ => {
                warn!(movie_id = %movie.id, show_id = %order.show_id, requested = order.seats, available, "Not enough seats");
                return Err(BookingError::InsufficientSeats {
                    requested: order.seats,
                    available,
                });
            }
        };

        // 4. Derive the new state
        let seats_remaining = available - seats;
        let reference = Uuid::new_v4();
        let update = SeatUpdate {
            location,
            show_id: order.show_id,
            expected_seats: available,
            new_seats: seats_remaining,
            booking: Booking::new(
                reference,
                order.name,
                order.email.into_inner(),
                order.phone_number.into_inner(),
                seats,
            ),
        };

        // 5. Conditional write
        let outcome = call_store(
            timeout,
            "conditional_update",
            self.store.conditional_update(&movie.id, &update),
        )
        .await?;

        match outcome {
            UpdateOutcome::Applied => {
                info!(
                    movie_id = %movie.id,
                    show_id = %update.show_id,
                    date = %update.location.date,
                    seats,
                    seats_remaining,
                    %reference,
                    "Booking confirmed"
                );
                Ok(BookingConfirmation {
                    reference,
                    movie_id: movie.id,
                    show_id: update.show_id,
                    date: update.location.date,
                    seats_booked: seats,
                    seats_remaining,
                })
            }
            UpdateOutcome::NotApplied => {
                warn!(movie_id = %movie.id, show_id = %update.show_id, expected_seats = available, "Showtime changed since read, booking not applied");
                Err(BookingError::UpdateConflict {
                    movie_id: movie.id,
                    show_id: update.show_id,
                })
            }
        }
    }
}
