use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use perk_core::models::{Category, Coupon, DiscountKind};
use perk_core::repository::{BoxError, CouponRepository};

use crate::app_config::AllocationRules;

/// Upper bound on candidates handed to the selection engine per tier.
/// Combined with the `times_shown` ordering this is what makes the
/// exposure counter a rotation signal on large pools.
const CANDIDATE_LIMIT: i64 = 100;

pub struct PostgresCouponRepository {
    pub pool: PgPool,
    pub rules: AllocationRules,
}

#[derive(sqlx::FromRow)]
struct CouponRow {
    id: Uuid,
    merchant: String,
    offer_text: String,
    code: String,
    redemption_url: String,
    discount_value: i32,
    discount_kind: String,
    category: String,
    country: String,
    currency_code: String,
    currency_symbol: String,
    is_active: bool,
    expires_at: DateTime<Utc>,
    verified: bool,
    positive_votes: i32,
    negative_votes: i32,
    times_shown: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CouponRow> for Coupon {
    fn from(row: CouponRow) -> Self {
        let discount_kind = match row.discount_kind.as_str() {
            "FLAT" => DiscountKind::Flat,
            _ => DiscountKind::Percentage,
        };
        Coupon {
            id: row.id,
            merchant: row.merchant,
            offer_text: row.offer_text,
            code: row.code,
            redemption_url: row.redemption_url,
            discount_value: row.discount_value,
            discount_kind,
            category: Category::new(&row.category),
            country: row.country,
            currency_code: row.currency_code,
            currency_symbol: row.currency_symbol,
            is_active: row.is_active,
            expires_at: row.expires_at,
            verified: row.verified,
            positive_votes: row.positive_votes,
            negative_votes: row.negative_votes,
            times_shown: row.times_shown,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn discount_kind_str(kind: DiscountKind) -> &'static str {
    match kind {
        DiscountKind::Percentage => "PERCENTAGE",
        DiscountKind::Flat => "FLAT",
    }
}

const SELECT_COLUMNS: &str = "SELECT id, merchant, offer_text, code, redemption_url, \
     discount_value, discount_kind, category, country, currency_code, currency_symbol, \
     is_active, expires_at, verified, positive_votes, negative_votes, times_shown, \
     created_at, updated_at FROM coupons";

#[async_trait]
impl CouponRepository for PostgresCouponRepository {
    async fn find_eligible(
        &self,
        category: &Category,
        country: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Coupon>, BoxError> {
        let cutoff = now + Duration::minutes(self.rules.expiry_margin_minutes);

        let rows = match country {
            Some(country) => {
                let sql = format!(
                    "{SELECT_COLUMNS} \
                     WHERE is_active = TRUE AND category = $1 AND expires_at > $2 \
                       AND negative_votes < $3 AND country = $4 \
                     ORDER BY times_shown ASC LIMIT $5"
                );
                sqlx::query_as::<_, CouponRow>(&sql)
                    .bind(category.as_str().to_owned())
                    .bind(cutoff)
                    .bind(self.rules.rejection_threshold)
                    .bind(country.to_owned())
                    .bind(CANDIDATE_LIMIT)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "{SELECT_COLUMNS} \
                     WHERE is_active = TRUE AND category = $1 AND expires_at > $2 \
                       AND negative_votes < $3 \
                     ORDER BY times_shown ASC LIMIT $4"
                );
                sqlx::query_as::<_, CouponRow>(&sql)
                    .bind(category.as_str().to_owned())
                    .bind(cutoff)
                    .bind(self.rules.rejection_threshold)
                    .bind(CANDIDATE_LIMIT)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows.into_iter().map(Coupon::from).collect())
    }

    async fn insert_batch(&self, coupons: &[Coupon]) -> Result<u64, BoxError> {
        let mut inserted = 0;
        for coupon in coupons {
            sqlx::query(
                "INSERT INTO coupons (id, merchant, offer_text, code, redemption_url, \
                 discount_value, discount_kind, category, country, currency_code, \
                 currency_symbol, is_active, expires_at, verified, positive_votes, \
                 negative_votes, times_shown, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, \
                 $15, $16, $17, $18, $19)",
            )
            .bind(coupon.id)
            .bind(&coupon.merchant)
            .bind(&coupon.offer_text)
            .bind(&coupon.code)
            .bind(&coupon.redemption_url)
            .bind(coupon.discount_value)
            .bind(discount_kind_str(coupon.discount_kind))
            .bind(coupon.category.as_str().to_owned())
            .bind(&coupon.country)
            .bind(&coupon.currency_code)
            .bind(&coupon.currency_symbol)
            .bind(coupon.is_active)
            .bind(coupon.expires_at)
            .bind(coupon.verified)
            .bind(coupon.positive_votes)
            .bind(coupon.negative_votes)
            .bind(coupon.times_shown)
            .bind(coupon.created_at)
            .bind(coupon.updated_at)
            .execute(&self.pool)
            .await?;
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn record_exposure(&self, coupon_id: Uuid) -> Result<(), BoxError> {
        // Atomic add at the store; deliberately not serialized with
        // selection (lost updates are tolerated).
        sqlx::query(
            "UPDATE coupons SET times_shown = times_shown + 1, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(coupon_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
