pub mod app_config;
pub mod coupon_repo;
pub mod database;
pub mod exposure_repo;

pub use coupon_repo::PostgresCouponRepository;
pub use database::DbClient;
pub use exposure_repo::PostgresExposureRepository;
