use std::sync::Arc;

use perk_alloc::{Allocator, ExposureRecorder};
use perk_core::repository::CouponRepository;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub coupon_repo: Arc<dyn CouponRepository>,
    pub allocator: Arc<Allocator>,
    pub recorder: Arc<ExposureRecorder>,
    pub auth: AuthConfig,
}
