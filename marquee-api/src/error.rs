use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use marquee_booking::{BookingError, InvalidRequest};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Booking(BookingError),
    MalformedBody(JsonRejection),
    RateLimited,
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Booking(err) => match err {
                BookingError::InvalidRequest(InvalidRequest::MissingField(_)) => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_REQUEST",
                    "Some fields are missing".to_string(),
                ),
                BookingError::InvalidRequest(InvalidRequest::InvalidSeatCount(_)) => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_REQUEST",
                    "Invalid seat count".to_string(),
                ),
                BookingError::InvalidIdentifier(_) => (
                    StatusCode::BAD_REQUEST,
                    "INVALID_IDENTIFIER",
                    "Invalid movieId format".to_string(),
                ),
                BookingError::MovieNotFound(_) => (
                    StatusCode::NOT_FOUND,
                    "MOVIE_NOT_FOUND",
                    "Requested movie is not found".to_string(),
                ),
                BookingError::ShowtimeNotFound { .. } => (
                    StatusCode::NOT_FOUND,
                    "SHOWTIME_NOT_FOUND",
                    "Show not found".to_string(),
                ),
                BookingError::InsufficientSeats { .. } => (
                    StatusCode::CONFLICT,
                    "INSUFFICIENT_SEATS",
                    "Not enough seats available".to_string(),
                ),
                BookingError::UpdateConflict { .. } => (
                    StatusCode::CONFLICT,
                    "UPDATE_CONFLICT",
                    "Seats changed while booking, please try again".to_string(),
                ),
                BookingError::DuplicateShowtime { .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATA_INTEGRITY",
                    "Internal Server Error".to_string(),
                ),
                BookingError::StoreUnavailable(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "Movie store is unavailable".to_string(),
                ),
                BookingError::StoreTimeout { .. } => (
                    StatusCode::GATEWAY_TIMEOUT,
                    "STORE_TIMEOUT",
                    "Movie store did not respond in time".to_string(),
                ),
            },
            AppError::MalformedBody(rejection) => (
                StatusCode::BAD_REQUEST,
                "INVALID_REQUEST",
                rejection.body_text(),
            ),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Rate limit exceeded".to_string(),
            ),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            AppError::Booking(err) => err.is_retryable(),
            AppError::MalformedBody(_) => false,
            AppError::RateLimited => true,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, error = ?self, "Request failed");
        } else {
            tracing::debug!(code, error = ?self, "Request rejected");
        }

        let mut body = json!({
            "message": message,
            "code": code,
        });
        if self.retryable() {
            body["retryable"] = json!(true);
        }

        (status, Json(body)).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError::Booking(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedBody(rejection)
    }
}
