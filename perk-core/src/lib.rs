pub mod geo;
pub mod logos;
pub mod models;
pub mod repository;

pub use models::{
    AllocationOutcome, AllocationRequest, Category, Coupon, DiscountKind, ExposureRecord,
};
pub use repository::{CouponRepository, ExposureRepository};
