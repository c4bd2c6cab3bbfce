use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{Marker, MarkerChanges, NewMarker};

/// Persistence client for report markers.
///
/// Implementations translate between the storage row shape and the
/// [`Marker`] type; errors are returned as values and surfaced by the
/// caller. At-most-one-in-flight per marker is the caller's concern.
#[async_trait]
pub trait MarkerStore: Send + Sync {
    /// All reports, newest first.
    async fn fetch_all(&self) -> Result<Vec<Marker>>;

    async fn get(&self, id: i64) -> Result<Option<Marker>>;

    /// Insert one row and return it with the server-assigned id and timestamp.
    async fn create(&self, data: &NewMarker) -> Result<Marker>;

    /// Update only the supplied fields; unspecified fields are left untouched.
    async fn update(&self, id: i64, changes: &MarkerChanges) -> Result<Marker>;

    async fn delete(&self, id: i64) -> Result<()>;
}

/// Postgres-backed marker store
pub struct PgMarkerStore {
    pool: PgPool,
}

impl PgMarkerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MarkerStore for PgMarkerStore {
    async fn fetch_all(&self) -> Result<Vec<Marker>> {
        sqlx::query_as::<_, Marker>(
            r#"
            SELECT id, lat, lng, address, note, inserted_at
            FROM reports
            ORDER BY inserted_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch reports: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn get(&self, id: i64) -> Result<Option<Marker>> {
        sqlx::query_as::<_, Marker>(
            r#"
            SELECT id, lat, lng, address, note, inserted_at
            FROM reports
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get report: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn create(&self, data: &NewMarker) -> Result<Marker> {
        let marker = sqlx::query_as::<_, Marker>(
            r#"
            INSERT INTO reports (lat, lng, address, note)
            VALUES ($1, $2, $3, $4)
            RETURNING id, lat, lng, address, note, inserted_at
            "#,
        )
        .bind(data.lat)
        .bind(data.lng)
        .bind(&data.address)
        .bind(&data.note)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create report: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Created report {} at ({}, {})",
            marker.id,
            marker.lat,
            marker.lng
        );

        Ok(marker)
    }

    async fn update(&self, id: i64, changes: &MarkerChanges) -> Result<Marker> {
        sqlx::query_as::<_, Marker>(
            r#"
            UPDATE reports
            SET address = COALESCE($2, address),
                note = COALESCE($3, note)
            WHERE id = $1
            RETURNING id, lat, lng, address, note, inserted_at
            "#,
        )
        .bind(id)
        .bind(&changes.address)
        .bind(&changes.note)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update report: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete report: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Report {} not found", id)));
        }

        tracing::info!("Deleted report {}", id);
        Ok(())
    }
}
