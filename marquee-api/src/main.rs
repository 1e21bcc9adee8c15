use anyhow::Context;
use marquee_api::middleware::{RateLimiter, RedisRateLimiter};
use marquee_api::{app, shutdown, AppState};
use marquee_booking::{BookingEngine, BookingSettings, MovieCatalog};
use marquee_core::{InMemoryMovieStore, MovieStore};
use marquee_store::app_config::{Config, StoreBackend};
use marquee_store::{seed, DbClient, PostgresMovieStore, RedisClient};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "marquee_api=debug,marquee_booking=debug,marquee_store=debug,tower_http=debug,axum::rejection=trace"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Marquee API on port {}", config.server.port);

    let store: Arc<dyn MovieStore> = match config.store.backend {
        StoreBackend::Postgres => {
            let database = config
                .database
                .as_ref()
                .context("store.backend is postgres but [database] is not configured")?;
            let db = DbClient::new(database)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            Arc::new(PostgresMovieStore::new(db.pool.clone()))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory movie store, bookings are lost on restart");
            Arc::new(InMemoryMovieStore::new())
        }
    };

    if let Some(path) = &config.store.seed_path {
        let movies = seed::load_seed_file(path)
            .await
            .with_context(|| format!("Failed to load seed file {path}"))?;
        seed::seed_movies(store.as_ref(), &movies)
            .await
            .context("Failed to seed movie store")?;
    }

    let rate_limiter: Option<Arc<dyn RateLimiter>> = match &config.redis {
        Some(redis) => {
            let client = RedisClient::new(&redis.url).context("Invalid Redis URL")?;
            tracing::info!(
                max_requests = config.rate_limit.max_requests,
                window_seconds = config.rate_limit.window_seconds,
                "Rate limiting enabled"
            );
            Some(Arc::new(RedisRateLimiter::new(
                client,
                config.rate_limit.clone(),
            )))
        }
        None => None,
    };

    let store_timeout = config.booking.store_timeout();
    let app_state = AppState {
        catalog: MovieCatalog::new(store.clone(), store_timeout),
        engine: BookingEngine::new(store, BookingSettings { store_timeout }),
        rate_limiter,
        conflict_retries: config.booking.conflict_retries,
        cors: config.cors.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown::graceful())
    .await
    .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}
