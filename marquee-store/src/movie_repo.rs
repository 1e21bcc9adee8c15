use async_trait::async_trait;
use marquee_core::{
    Movie, MovieId, MovieStore, SeatUpdate, ShowtimeLocation, StoreError, UpdateOutcome,
};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;

/// Movie documents stored as JSONB rows in `movies`.
#[derive(Clone)]
pub struct PostgresMovieStore {
    pool: PgPool,
}

impl PostgresMovieStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Single statement: Postgres locks the row and re-checks the WHERE clause
// against the latest row version, so two writers that read the same seat
// count cannot both match.
const CONDITIONAL_UPDATE_SQL: &str = r#"
    UPDATE movies
    SET document = jsonb_set(
            jsonb_set(document, $3::text[], to_jsonb($5::bigint)),
            $4::text[],
            COALESCE(document #> $4::text[], '[]'::jsonb) || jsonb_build_array($6::jsonb)
        ),
        updated_at = NOW()
    WHERE id = $1
      AND document #>> $7::text[] = $2
      AND CASE
            WHEN document #>> $3::text[] ~ '^\s*[0-9]+\s*$'
            THEN btrim(document #>> $3::text[])::bigint = $8
            ELSE FALSE
          END
"#;

/// JSON path of `field` on the showtime at `location`.
pub(crate) fn showtime_path(location: &ShowtimeLocation, field: &str) -> Vec<String> {
    vec![
        "shows".to_string(),
        location.date.clone(),
        location.index.to_string(),
        field.to_string(),
    ]
}

fn decode(id: &str, document: Value) -> Result<Movie, StoreError> {
    let movie: Movie = serde_json::from_value(document).map_err(|e| StoreError::Corrupt {
        id: id.to_string(),
        reason: e.to_string(),
    })?;

    if movie.id.to_string() != id {
        return Err(StoreError::Corrupt {
            id: id.to_string(),
            reason: format!("document _id {} does not match row id", movie.id),
        });
    }
    Ok(movie)
}

#[async_trait]
impl MovieStore for PostgresMovieStore {
    async fn list(&self) -> Result<Vec<Movie>, StoreError> {
        let rows: Vec<(String, Json<Value>)> =
            sqlx::query_as("SELECT id, document FROM movies ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(StoreError::backend)?;

        rows.into_iter()
            .map(|(id, Json(document))| decode(&id, document))
            .collect()
    }

    async fn get_by_id(&self, id: &MovieId) -> Result<Option<Movie>, StoreError> {
        let row: Option<(String, Json<Value>)> =
            sqlx::query_as("SELECT id, document FROM movies WHERE id = $1")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::backend)?;

        row.map(|(id, Json(document))| decode(&id, document))
            .transpose()
    }

    async fn conditional_update(
        &self,
        id: &MovieId,
        update: &SeatUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        let result = sqlx::query(CONDITIONAL_UPDATE_SQL)
            .bind(id.to_string())
            .bind(&update.show_id)
            .bind(showtime_path(&update.location, "seats"))
            .bind(showtime_path(&update.location, "bookings"))
            .bind(i64::from(update.new_seats))
            .bind(Json(&update.booking))
            .bind(showtime_path(&update.location, "id"))
            .bind(i64::from(update.expected_seats))
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            debug!(movie_id = %id, show_id = %update.show_id, "Conditional update matched no row");
            return Ok(UpdateOutcome::NotApplied);
        }
        Ok(UpdateOutcome::Applied)
    }

    async fn insert(&self, movie: &Movie) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO movies (id, document) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
        )
        .bind(movie.id.to_string())
        .bind(Json(movie))
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists(movie.id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_showtime_path() {
        let location = ShowtimeLocation {
            date: "2024-05-01".to_string(),
            index: 2,
        };
        assert_eq!(
            showtime_path(&location, "seats"),
            vec!["shows", "2024-05-01", "2", "seats"]
        );
    }

    #[test]
    fn test_decode_checks_row_id() {
        let document = json!({ "_id": "65f1c2a9e4b0a1b2c3d4e5f6", "shows": {} });

        assert!(decode("65f1c2a9e4b0a1b2c3d4e5f6", document.clone()).is_ok());
        assert!(matches!(
            decode("000000000000000000000000", document),
            Err(StoreError::Corrupt { .. })
        ));
        assert!(matches!(
            decode("65f1c2a9e4b0a1b2c3d4e5f6", json!({ "shows": [] })),
            Err(StoreError::Corrupt { .. })
        ));
    }
}
