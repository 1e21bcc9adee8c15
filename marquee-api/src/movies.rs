use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use marquee_core::{Movie, MovieSummary};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/movie/get-movies", get(list_movies))
        .route("/movie/{id}", get(get_movie))
}

async fn list_movies(State(state): State<AppState>) -> Result<Json<Vec<MovieSummary>>, AppError> {
    let movies = state.catalog.list_movies().await?;
    Ok(Json(movies))
}

async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Movie>, AppError> {
    let movie = state.catalog.get_movie(&id).await?;
    Ok(Json(movie))
}
