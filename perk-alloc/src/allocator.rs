use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use perk_core::models::{AllocationOutcome, AllocationRequest, Coupon};
use perk_core::repository::{CouponRepository, ExposureRepository};
use perk_store::app_config::AllocationRules;

use crate::fallback::FallbackResolver;
use crate::history::ExposureHistory;
use crate::placeholder::placeholder_coupons;
use crate::selection::{self, quality_buckets};
use crate::AllocError;

/// Orchestrates one allocation: tier cascade, cooldown exclusion,
/// bucket selection. Read-path failures degrade to placeholders; this
/// never returns an error.
pub struct Allocator {
    coupon_repo: Arc<dyn CouponRepository>,
    exposure_repo: Arc<dyn ExposureRepository>,
    rules: AllocationRules,
}

impl Allocator {
    pub fn new(
        coupon_repo: Arc<dyn CouponRepository>,
        exposure_repo: Arc<dyn ExposureRepository>,
        rules: AllocationRules,
    ) -> Self {
        Self {
            coupon_repo,
            exposure_repo,
            rules,
        }
    }

    pub async fn allocate(&self, request: &AllocationRequest) -> AllocationOutcome {
        let now = Utc::now();
        match self.try_allocate(request, now).await {
            Ok(coupons) if !coupons.is_empty() => AllocationOutcome::fulfilled(coupons),
            Ok(_) => {
                tracing::info!(
                    category = %request.category,
                    country = %request.country,
                    "no eligible coupons in any tier, serving placeholders"
                );
                AllocationOutcome::degraded(
                    placeholder_coupons(&request.category, &request.country),
                    "no eligible coupons available",
                )
            }
            Err(e) => {
                tracing::error!(
                    category = %request.category,
                    country = %request.country,
                    error = %e,
                    "allocation read path failed, serving placeholders"
                );
                AllocationOutcome::degraded(
                    placeholder_coupons(&request.category, &request.country),
                    e.to_string(),
                )
            }
        }
    }

    async fn try_allocate(
        &self,
        request: &AllocationRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<Coupon>, AllocError> {
        let store_timeout = Duration::from_millis(self.rules.store_timeout_ms);

        let resolver = FallbackResolver::new(
            self.coupon_repo.as_ref(),
            &request.country,
            &self.rules.reference_country,
            store_timeout,
        );
        let candidates = resolver.resolve(&request.category, now).await?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let history = ExposureHistory::new(
            self.exposure_repo.as_ref(),
            self.rules.cooldown_days,
            store_timeout,
        );
        let excluded = history
            .exclusion_set(&request.user_id, &request.exclude_ids, now)
            .await?;

        Ok(selection::select(
            candidates,
            &excluded,
            self.rules.batch_size,
            &quality_buckets(),
        ))
    }
}
