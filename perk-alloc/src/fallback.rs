use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::timeout;

use perk_core::models::{Category, Coupon};
use perk_core::repository::CouponRepository;

use crate::AllocError;

/// One geographic slice of the pool. Tiers are tried in order; the first
/// non-empty result is used as-is, never blended with a broader tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tier {
    /// The user's resolved country.
    Exact(String),
    /// The pool's largest market.
    Reference(String),
    /// No country restriction.
    Global,
}

impl Tier {
    fn country(&self) -> Option<&str> {
        match self {
            Tier::Exact(code) | Tier::Reference(code) => Some(code),
            Tier::Global => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Tier::Exact(_) => "exact",
            Tier::Reference(_) => "reference",
            Tier::Global => "global",
        }
    }
}

/// Cascades the eligibility filter across progressively broader tiers
/// until one yields candidates.
pub struct FallbackResolver<'a> {
    repo: &'a dyn CouponRepository,
    tiers: Vec<Tier>,
    store_timeout: Duration,
}

impl<'a> FallbackResolver<'a> {
    pub fn new(
        repo: &'a dyn CouponRepository,
        country: &str,
        reference_country: &str,
        store_timeout: Duration,
    ) -> Self {
        let mut tiers = vec![Tier::Exact(country.to_string())];
        if country != reference_country {
            tiers.push(Tier::Reference(reference_country.to_string()));
        }
        tiers.push(Tier::Global);
        Self {
            repo,
            tiers,
            store_timeout,
        }
    }

    /// First non-empty eligible set across the tier cascade. Empty only
    /// when every tier is empty.
    pub async fn resolve(
        &self,
        category: &Category,
        now: DateTime<Utc>,
    ) -> Result<Vec<Coupon>, AllocError> {
        for tier in &self.tiers {
            let query = self.repo.find_eligible(category, tier.country(), now);
            let found = timeout(self.store_timeout, query)
                .await
                .map_err(|_| AllocError::Timeout(self.store_timeout))?
                .map_err(AllocError::Store)?;

            if !found.is_empty() {
                tracing::debug!(
                    tier = tier.label(),
                    category = %category,
                    candidates = found.len(),
                    "fallback resolver matched tier"
                );
                return Ok(found);
            }
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{coupon_in, FakeCouponRepo};
    use perk_core::models::Category;

    #[tokio::test]
    async fn exact_tier_wins_when_populated() {
        let repo = FakeCouponRepo::with_coupons(vec![
            coupon_in("food", "IN", false),
            coupon_in("food", "US", false),
        ]);
        let resolver = FallbackResolver::new(&repo, "IN", "US", Duration::from_secs(1));

        let found = resolver
            .resolve(&Category::new("food"), Utc::now())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].country, "IN");
    }

    #[tokio::test]
    async fn cascades_to_reference_tier_without_mixing() {
        let repo = FakeCouponRepo::with_coupons(vec![
            coupon_in("food", "US", false),
            coupon_in("food", "US", true),
            coupon_in("food", "GB", false),
        ]);
        let resolver = FallbackResolver::new(&repo, "IN", "US", Duration::from_secs(1));

        let found = resolver
            .resolve(&Category::new("food"), Utc::now())
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|c| c.country == "US"));
    }

    #[tokio::test]
    async fn cascades_to_global_tier_last() {
        let repo = FakeCouponRepo::with_coupons(vec![coupon_in("food", "GB", false)]);
        let resolver = FallbackResolver::new(&repo, "IN", "US", Duration::from_secs(1));

        let found = resolver
            .resolve(&Category::new("food"), Utc::now())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].country, "GB");
    }

    #[tokio::test]
    async fn empty_pool_resolves_to_empty_set() {
        let repo = FakeCouponRepo::with_coupons(vec![coupon_in("travel", "IN", false)]);
        let resolver = FallbackResolver::new(&repo, "IN", "US", Duration::from_secs(1));

        let found = resolver
            .resolve(&Category::new("food"), Utc::now())
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn slow_store_query_times_out() {
        let repo = FakeCouponRepo::stalling();
        let resolver = FallbackResolver::new(&repo, "IN", "US", Duration::from_millis(20));

        let err = resolver
            .resolve(&Category::new("food"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AllocError::Timeout(_)));
    }

    #[tokio::test]
    async fn store_failure_propagates_as_alloc_error() {
        let repo = FakeCouponRepo::failing();
        let resolver = FallbackResolver::new(&repo, "IN", "US", Duration::from_secs(1));

        let err = resolver
            .resolve(&Category::new("food"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AllocError::Store(_)));
    }
}
