use marquee_core::{Movie, MovieStore, StoreError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("seed file {path} is not a JSON array of movies: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub async fn load_seed_file(path: impl AsRef<Path>) -> Result<Vec<Movie>, SeedError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Inserts the movies that are not stored yet. Returns how many were inserted.
pub async fn seed_movies(store: &dyn MovieStore, movies: &[Movie]) -> Result<usize, SeedError> {
    let mut inserted = 0;
    for movie in movies {
        match store.insert(movie).await {
            Ok(()) => inserted += 1,
            Err(StoreError::AlreadyExists(id)) => {
                debug!(movie_id = %id, "Movie already present, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }
    info!(inserted, total = movies.len(), "Seeded movie store");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_core::InMemoryMovieStore;
    use std::io::Write;

    const SEED: &str = r#"[
        { "_id": "65f1c2a9e4b0a1b2c3d4e5f6", "title": "Metropolis",
          "shows": { "2024-05-01": [ { "id": "s1", "time": "18:00", "seats": 40 } ] } },
        { "_id": { "$oid": "65f1c2a9e4b0a1b2c3d4e5f7" }, "title": "Nosferatu",
          "shows": {} }
    ]"#;

    #[tokio::test]
    async fn test_load_and_seed_is_idempotent() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();

        let movies = load_seed_file(file.path()).await.unwrap();
        assert_eq!(movies.len(), 2);

        let store = InMemoryMovieStore::new();
        assert_eq!(seed_movies(&store, &movies).await.unwrap(), 2);
        assert_eq!(seed_movies(&store, &movies).await.unwrap(), 0);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_bad_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ \"not\": \"an array\" }").unwrap();
        assert!(matches!(
            load_seed_file(file.path()).await,
            Err(SeedError::Parse { .. })
        ));

        assert!(matches!(
            load_seed_file("/definitely/not/here.json").await,
            Err(SeedError::Read { .. })
        ));
    }
}
