use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Category, Coupon, ExposureRecord};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Repository trait for coupon pool access
#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// The eligibility filter as a store-level query: active, in the
    /// category, outside the expiry safety margin, under the rejection
    /// threshold. `country = None` removes the tier restriction.
    /// Results come back least-shown first.
    async fn find_eligible(
        &self,
        category: &Category,
        country: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Coupon>, BoxError>;

    /// Bulk insert of well-formed pool rows (population job).
    async fn insert_batch(&self, coupons: &[Coupon]) -> Result<u64, BoxError>;

    /// Best-effort rotation signal: atomic add on the exposure counter.
    async fn record_exposure(&self, coupon_id: Uuid) -> Result<(), BoxError>;
}

/// Repository trait for per-user exposure history
#[async_trait]
pub trait ExposureRepository: Send + Sync {
    /// Distinct coupon ids shown to this user since `since`.
    async fn seen_coupon_ids(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, BoxError>;

    async fn append(&self, records: &[ExposureRecord]) -> Result<(), BoxError>;
}
