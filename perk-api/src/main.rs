use std::net::SocketAddr;
use std::sync::Arc;

use perk_alloc::{Allocator, ExposureRecorder};
use perk_api::{
    app,
    state::{AppState, AuthConfig},
};
use perk_core::repository::{CouponRepository, ExposureRepository};
use perk_store::{DbClient, PostgresCouponRepository, PostgresExposureRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "perk_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = perk_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Perk API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let coupon_repo: Arc<dyn CouponRepository> = Arc::new(PostgresCouponRepository {
        pool: db.pool.clone(),
        rules: config.allocation.clone(),
    });
    let exposure_repo: Arc<dyn ExposureRepository> = Arc::new(PostgresExposureRepository {
        pool: db.pool.clone(),
    });

    let allocator = Arc::new(Allocator::new(
        coupon_repo.clone(),
        exposure_repo.clone(),
        config.allocation.clone(),
    ));
    let recorder = Arc::new(ExposureRecorder::new(
        coupon_repo.clone(),
        exposure_repo.clone(),
    ));

    let app_state = AppState {
        coupon_repo,
        allocator,
        recorder,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
