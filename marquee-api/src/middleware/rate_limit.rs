use async_trait::async_trait;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use marquee_store::app_config::RateLimitConfig;
use marquee_store::RedisClient;
use std::error::Error;
use std::net::SocketAddr;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

/// Decides whether one more request from `subject` is allowed right now.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn allow(&self, subject: &str) -> Result<bool, Box<dyn Error + Send + Sync>>;
}

/// Fixed-window counter per subject, kept in Redis.
pub struct RedisRateLimiter {
    client: RedisClient,
    config: RateLimitConfig,
}

impl RedisRateLimiter {
    pub fn new(client: RedisClient, config: RateLimitConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn allow(&self, subject: &str) -> Result<bool, Box<dyn Error + Send + Sync>> {
        self.client
            .check_rate_limit(subject, self.config.max_requests, self.config.window_seconds)
            .await
            .map_err(Into::into)
    }
}

/// Limits requests per client IP. Requests pass through when no limiter is
/// configured or the limiter cannot be reached.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let Some(limiter) = state.rate_limiter.as_ref() else {
        return next.run(req).await;
    };

    let subject = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match limiter.allow(&subject).await {
        Ok(true) => next.run(req).await,
        Ok(false) => {
            warn!(client = %subject, "Rate limit exceeded");
            AppError::RateLimited.into_response()
        }
        Err(e) => {
            warn!(error = %e, "Rate limiter unavailable, letting request through");
            next.run(req).await
        }
    }
}
