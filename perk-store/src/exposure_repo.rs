use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use perk_core::models::ExposureRecord;
use perk_core::repository::{BoxError, ExposureRepository};

pub struct PostgresExposureRepository {
    pub pool: PgPool,
}

#[async_trait]
impl ExposureRepository for PostgresExposureRepository {
    async fn seen_coupon_ids(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, BoxError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT DISTINCT coupon_id FROM exposures \
             WHERE user_id = $1 AND shown_at >= $2",
        )
        .bind(user_id.to_owned())
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn append(&self, records: &[ExposureRecord]) -> Result<(), BoxError> {
        for record in records {
            sqlx::query(
                "INSERT INTO exposures (user_id, coupon_id, shown_at) VALUES ($1, $2, $3)",
            )
            .bind(&record.user_id)
            .bind(record.coupon_id)
            .bind(record.shown_at)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }
}
