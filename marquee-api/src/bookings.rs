use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use marquee_booking::{BookingConfirmation, BookingError, BookingRequest};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub message: &'static str,
    pub booking: BookingConfirmation,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/movie/book-movie", post(book_movie))
}

async fn book_movie(
    State(state): State<AppState>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<Json<BookingResponse>, AppError> {
    let Json(request) = payload?;
    let order = request.validate()?;

    // Each attempt re-reads the showtime, so availability is checked again
    // against whatever the winning writer left behind.
    let mut attempt = 0;
    let booking = loop {
        match state.engine.place(order.clone()).await {
            Err(BookingError::UpdateConflict { movie_id, show_id })
                if attempt < state.conflict_retries =>
            {
                attempt += 1;
                debug!(%movie_id, %show_id, attempt, "Retrying booking after conflict");
            }
            result => break result?,
        }
    };

    info!(reference = %booking.reference, attempts = attempt + 1, "Booking created");
    Ok(Json(BookingResponse {
        message: "Booking created successfully",
        booking,
    }))
}
