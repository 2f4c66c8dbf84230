use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default eligibility margin: a coupon must outlive the request by this much.
pub const EXPIRY_MARGIN_MINUTES: i64 = 60;

/// A coupon with this many negative votes is dropped from selection.
pub const REJECTION_THRESHOLD: i32 = 3;

/// Cooldown window for repeat exposures to the same user.
pub const COOLDOWN_DAYS: i64 = 30;

/// Maximum number of coupons returned per allocation.
pub const BATCH_SIZE: usize = 5;

/// Expiry sentinel for pool-level entries (2100-01-01T00:00:00Z).
/// Individual user-facing claims carry their own short expiry elsewhere.
pub fn pool_expiry_sentinel() -> DateTime<Utc> {
    DateTime::from_timestamp(4_102_444_800, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// How a coupon's discount is expressed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    Percentage,
    Flat,
}

/// Coupon category, normalized to lowercase on construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An entry in the shared coupon pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: Uuid,
    pub merchant: String,
    pub offer_text: String,
    pub code: String,
    pub redemption_url: String,
    pub discount_value: i32,
    pub discount_kind: DiscountKind,
    pub category: Category,
    pub country: String,
    pub currency_code: String,
    pub currency_symbol: String,
    pub is_active: bool,
    pub expires_at: DateTime<Utc>,
    pub verified: bool,
    pub positive_votes: i32,
    pub negative_votes: i32,
    pub times_shown: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Create a new pool entry with the far-future expiry sentinel.
    pub fn new(
        merchant: String,
        offer_text: String,
        code: String,
        redemption_url: String,
        discount_value: i32,
        discount_kind: DiscountKind,
        category: Category,
        country: String,
    ) -> Self {
        let now = Utc::now();
        let currency = crate::geo::currency_for(&country);
        Self {
            id: Uuid::new_v4(),
            merchant,
            offer_text,
            code,
            redemption_url,
            discount_value,
            discount_kind,
            category,
            country,
            currency_code: currency.code.to_string(),
            currency_symbol: currency.symbol.to_string(),
            is_active: true,
            expires_at: pool_expiry_sentinel(),
            verified: false,
            positive_votes: 0,
            negative_votes: 0,
            times_shown: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mirror of the store-level eligibility predicate, used at the edges
    /// and in tests. The store query remains the source of truth; pass the
    /// deployment's configured margin and threshold to stay in step with it.
    pub fn is_eligible_with(
        &self,
        now: DateTime<Utc>,
        expiry_margin_minutes: i64,
        rejection_threshold: i32,
    ) -> bool {
        self.is_active
            && self.negative_votes < rejection_threshold
            && self.expires_at > now + Duration::minutes(expiry_margin_minutes)
    }

    /// [`Self::is_eligible_with`] at the default product rules.
    pub fn is_eligible_at(&self, now: DateTime<Utc>) -> bool {
        self.is_eligible_with(now, EXPIRY_MARGIN_MINUTES, REJECTION_THRESHOLD)
    }
}

/// Record of one coupon shown to one user. Insert-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExposureRecord {
    pub user_id: String,
    pub coupon_id: Uuid,
    pub shown_at: DateTime<Utc>,
}

impl ExposureRecord {
    pub fn new(user_id: String, coupon_id: Uuid) -> Self {
        Self {
            user_id,
            coupon_id,
            shown_at: Utc::now(),
        }
    }
}

/// A single allocation request, after country resolution.
#[derive(Debug, Clone)]
pub struct AllocationRequest {
    pub user_id: String,
    pub category: Category,
    pub country: String,
    pub exclude_ids: Vec<Uuid>,
}

/// Result of one allocation. `degraded` marks the placeholder path;
/// callers must not record exposures for a degraded batch.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub coupons: Vec<Coupon>,
    pub degraded: bool,
    pub reason: Option<String>,
}

impl AllocationOutcome {
    pub fn fulfilled(coupons: Vec<Coupon>) -> Self {
        Self {
            coupons,
            degraded: false,
            reason: None,
        }
    }

    pub fn degraded(coupons: Vec<Coupon>, reason: impl Into<String>) -> Self {
        Self {
            coupons,
            degraded: true,
            reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_coupon() -> Coupon {
        Coupon::new(
            "TestMart".to_string(),
            "10% off everything".to_string(),
            "TEST10".to_string(),
            "https://testmart.example/redeem".to_string(),
            10,
            DiscountKind::Percentage,
            Category::new("Food"),
            "US".to_string(),
        )
    }

    #[test]
    fn category_normalizes_case_and_whitespace() {
        assert_eq!(Category::new("  Food ").as_str(), "food");
        assert_eq!(Category::new("TRAVEL"), Category::new("travel"));
    }

    #[test]
    fn coupon_expiring_within_margin_is_ineligible() {
        let now = Utc::now();
        let mut coupon = base_coupon();
        coupon.expires_at = now + Duration::minutes(30);
        assert!(!coupon.is_eligible_at(now));

        coupon.expires_at = now + Duration::hours(2);
        assert!(coupon.is_eligible_at(now));
    }

    #[test]
    fn coupon_over_rejection_threshold_is_ineligible() {
        let now = Utc::now();
        let mut coupon = base_coupon();
        coupon.negative_votes = 2;
        assert!(coupon.is_eligible_at(now));

        coupon.negative_votes = 3;
        assert!(!coupon.is_eligible_at(now));
    }

    #[test]
    fn eligibility_follows_overridden_rules() {
        let now = Utc::now();
        let mut coupon = base_coupon();
        coupon.negative_votes = 4;
        coupon.expires_at = now + Duration::hours(3);

        // Stricter margin, looser threshold than the defaults.
        assert!(coupon.is_eligible_with(now, 120, 5));
        assert!(!coupon.is_eligible_with(now, 240, 5));
        assert!(!coupon.is_eligible_with(now, 120, 3));
        assert!(!coupon.is_eligible_at(now));
    }

    #[test]
    fn inactive_coupon_is_ineligible() {
        let now = Utc::now();
        let mut coupon = base_coupon();
        coupon.is_active = false;
        assert!(!coupon.is_eligible_at(now));
    }

    #[test]
    fn pool_sentinel_is_far_future() {
        assert!(pool_expiry_sentinel() > Utc::now() + Duration::days(365 * 10));
    }
}
