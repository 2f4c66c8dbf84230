use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use perk_core::geo;
use perk_core::models::{Category, Coupon, DiscountKind};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PopulateCouponRequest {
    pub merchant: String,
    pub offer_text: String,
    pub code: String,
    #[serde(default)]
    pub redemption_url: String,
    pub discount_value: i32,
    pub discount_kind: DiscountKind,
    pub category: String,
    pub country: String,
    #[serde(default)]
    pub verified: bool,
    /// Pool-level entries omit this and get the far-future sentinel.
    pub expires_at: Option<DateTime<Utc>>,
}

/// POST /v1/admin/coupons
/// Bulk population of the pool. Admin-only; no user-specific input.
pub async fn populate_coupons(
    State(state): State<AppState>,
    Json(entries): Json<Vec<PopulateCouponRequest>>,
) -> Result<Json<serde_json::Value>, AppError> {
    if entries.is_empty() {
        return Err(AppError::ValidationError(
            "at least one coupon is required".to_string(),
        ));
    }

    let coupons: Vec<Coupon> = entries
        .into_iter()
        .map(|entry| {
            let country = geo::resolve_country(&entry.country);
            let mut coupon = Coupon::new(
                entry.merchant,
                entry.offer_text,
                entry.code,
                entry.redemption_url,
                entry.discount_value,
                entry.discount_kind,
                Category::new(&entry.category),
                country,
            );
            coupon.verified = entry.verified;
            if let Some(expires_at) = entry.expires_at {
                coupon.expires_at = expires_at;
            }
            coupon
        })
        .collect();

    let inserted = state
        .coupon_repo
        .insert_batch(&coupons)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tracing::info!(inserted, "coupon pool populated");
    Ok(Json(serde_json::json!({ "inserted": inserted })))
}
