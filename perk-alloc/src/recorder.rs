use std::sync::Arc;
use uuid::Uuid;

use perk_core::models::ExposureRecord;
use perk_core::repository::{CouponRepository, ExposureRepository};

/// Writes the post-selection exposure trail: one counter bump per coupon
/// plus the per-user history rows. Runs after the response is computed;
/// failures are logged and swallowed, never surfaced to the caller.
pub struct ExposureRecorder {
    coupon_repo: Arc<dyn CouponRepository>,
    exposure_repo: Arc<dyn ExposureRepository>,
}

impl ExposureRecorder {
    pub fn new(
        coupon_repo: Arc<dyn CouponRepository>,
        exposure_repo: Arc<dyn ExposureRepository>,
    ) -> Self {
        Self {
            coupon_repo,
            exposure_repo,
        }
    }

    /// Fire-and-forget variant used on the request path.
    pub fn spawn_record(self: &Arc<Self>, user_id: String, coupon_ids: Vec<Uuid>) {
        let recorder = Arc::clone(self);
        tokio::spawn(async move {
            recorder.record(&user_id, &coupon_ids).await;
        });
    }

    /// Best-effort: each counter bump is attempted independently; no
    /// retries, under-counting is tolerated.
    pub async fn record(&self, user_id: &str, coupon_ids: &[Uuid]) {
        for &coupon_id in coupon_ids {
            if let Err(e) = self.coupon_repo.record_exposure(coupon_id).await {
                tracing::warn!(%coupon_id, error = %e, "exposure counter update failed");
            }
        }

        let records: Vec<ExposureRecord> = coupon_ids
            .iter()
            .map(|&id| ExposureRecord::new(user_id.to_string(), id))
            .collect();
        if let Err(e) = self.exposure_repo.append(&records).await {
            tracing::warn!(user_id, error = %e, "exposure history append failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{coupon_in, FakeCouponRepo, FakeExposureRepo};
    use chrono::Utc;
    use perk_core::models::Category;

    #[tokio::test]
    async fn record_bumps_counters_and_appends_history() {
        let coupon = coupon_in("food", "US", false);
        let coupon_id = coupon.id;
        let coupon_repo = Arc::new(FakeCouponRepo::with_coupons(vec![coupon]));
        let exposure_repo = Arc::new(FakeExposureRepo::default());
        let recorder = ExposureRecorder::new(coupon_repo.clone(), exposure_repo.clone());

        recorder.record("user-1", &[coupon_id]).await;

        let stored = coupon_repo
            .find_eligible(&Category::new("food"), None, Utc::now())
            .await
            .unwrap();
        assert_eq!(stored[0].times_shown, 1);

        let seen = exposure_repo
            .seen_coupon_ids("user-1", Utc::now() - chrono::Duration::days(1))
            .await
            .unwrap();
        assert_eq!(seen, vec![coupon_id]);
    }

    #[tokio::test]
    async fn store_failures_are_swallowed() {
        let coupon_repo = Arc::new(FakeCouponRepo::failing());
        let exposure_repo = Arc::new(FakeExposureRepo::failing());
        let recorder = ExposureRecorder::new(coupon_repo, exposure_repo);

        // Must not panic or propagate.
        recorder.record("user-1", &[Uuid::new_v4()]).await;
    }
}
