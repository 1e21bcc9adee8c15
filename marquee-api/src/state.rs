use marquee_booking::{BookingEngine, MovieCatalog};
use marquee_store::app_config::CorsConfig;
use std::sync::Arc;

use crate::middleware::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub catalog: MovieCatalog,
    pub engine: BookingEngine,
    /// Rate limiting is off when this is `None`.
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
    /// Extra attempts for a booking that lost the conditional write.
    pub conflict_retries: u32,
    pub cors: CorsConfig,
}
