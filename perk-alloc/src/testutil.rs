//! In-memory repository fakes mirroring the store-level predicates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use uuid::Uuid;

use perk_core::models::{Category, Coupon, DiscountKind, ExposureRecord};
use perk_core::repository::{BoxError, CouponRepository, ExposureRepository};

pub fn coupon_in(category: &str, country: &str, verified: bool) -> Coupon {
    let mut coupon = Coupon::new(
        "TestMart".to_string(),
        format!("20% off {}", category),
        "TEST20".to_string(),
        "https://testmart.example/redeem".to_string(),
        20,
        DiscountKind::Percentage,
        Category::new(category),
        country.to_string(),
    );
    coupon.verified = verified;
    coupon
}

#[derive(Default)]
pub struct FakeCouponRepo {
    coupons: Mutex<Vec<Coupon>>,
    fail: bool,
    stall: bool,
}

impl FakeCouponRepo {
    pub fn with_coupons(coupons: Vec<Coupon>) -> Self {
        Self {
            coupons: Mutex::new(coupons),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Queries never complete, forcing the caller's timeout to fire.
    pub fn stalling() -> Self {
        Self {
            stall: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl CouponRepository for FakeCouponRepo {
    async fn find_eligible(
        &self,
        category: &Category,
        country: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Coupon>, BoxError> {
        if self.stall {
            std::future::pending::<()>().await;
        }
        if self.fail {
            return Err("coupon store unavailable".into());
        }
        let mut found: Vec<Coupon> = self
            .coupons
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.category == *category)
            .filter(|c| country.map_or(true, |code| c.country == code))
            .filter(|c| c.is_eligible_at(now))
            .cloned()
            .collect();
        found.sort_by_key(|c| c.times_shown);
        Ok(found)
    }

    async fn insert_batch(&self, coupons: &[Coupon]) -> Result<u64, BoxError> {
        if self.fail {
            return Err("coupon store unavailable".into());
        }
        let mut stored = self.coupons.lock().unwrap();
        stored.extend_from_slice(coupons);
        Ok(coupons.len() as u64)
    }

    async fn record_exposure(&self, coupon_id: Uuid) -> Result<(), BoxError> {
        if self.fail {
            return Err("coupon store unavailable".into());
        }
        let mut stored = self.coupons.lock().unwrap();
        if let Some(coupon) = stored.iter_mut().find(|c| c.id == coupon_id) {
            coupon.times_shown += 1;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeExposureRepo {
    records: Mutex<Vec<ExposureRecord>>,
    fail: bool,
    stall: bool,
}

impl FakeExposureRepo {
    pub fn with_records(records: Vec<ExposureRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Lookups never complete, forcing the caller's timeout to fire.
    pub fn stalling() -> Self {
        Self {
            stall: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ExposureRepository for FakeExposureRepo {
    async fn seen_coupon_ids(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, BoxError> {
        if self.stall {
            std::future::pending::<()>().await;
        }
        if self.fail {
            return Err("exposure store unavailable".into());
        }
        let mut ids: Vec<Uuid> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id && r.shown_at >= since)
            .map(|r| r.coupon_id)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn append(&self, records: &[ExposureRecord]) -> Result<(), BoxError> {
        if self.fail {
            return Err("exposure store unavailable".into());
        }
        self.records.lock().unwrap().extend_from_slice(records);
        Ok(())
    }
}
