use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use perk_core::models::{AllocationRequest, Category, Coupon, DiscountKind};
use perk_core::{geo, logos};

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AllocateRequest {
    pub user_id: Option<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub exclude_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CouponPayload {
    pub id: Uuid,
    pub pool_id: Uuid,
    pub code: String,
    pub merchant: String,
    pub offer_text: String,
    pub redemption_url: String,
    pub discount_value: i32,
    pub discount_kind: DiscountKind,
    pub category: String,
    pub currency_code: String,
    pub currency_symbol: String,
    pub expires_at: DateTime<Utc>,
    pub verified: bool,
    pub positive_votes: i32,
    pub negative_votes: i32,
    pub country: String,
    pub logo_url: String,
}

#[derive(Debug, Serialize)]
pub struct CurrencyPayload {
    pub code: String,
    pub symbol: String,
}

#[derive(Debug, Serialize)]
pub struct AllocateResponse {
    pub coupons: Vec<CouponPayload>,
    pub category: String,
    pub country: String,
    pub currency: CurrencyPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn coupon_payload(coupon: &Coupon) -> CouponPayload {
    CouponPayload {
        // Claim-level id; the pool row keeps its own identity.
        id: Uuid::new_v4(),
        pool_id: coupon.id,
        code: coupon.code.clone(),
        merchant: coupon.merchant.clone(),
        offer_text: coupon.offer_text.clone(),
        redemption_url: coupon.redemption_url.clone(),
        discount_value: coupon.discount_value,
        discount_kind: coupon.discount_kind,
        category: coupon.category.to_string(),
        currency_code: coupon.currency_code.clone(),
        currency_symbol: coupon.currency_symbol.clone(),
        expires_at: coupon.expires_at,
        verified: coupon.verified,
        positive_votes: coupon.positive_votes,
        negative_votes: coupon.negative_votes,
        country: coupon.country.clone(),
        logo_url: logos::logo_url(&coupon.merchant),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/rewards/allocate
/// Allocate a batch of coupons to the requesting user. Always answers
/// 2xx once the identity check passes; pool problems degrade the body,
/// never the status.
pub async fn allocate(
    State(state): State<AppState>,
    Json(req): Json<AllocateRequest>,
) -> Result<Json<AllocateResponse>, AppError> {
    // Missing identity is the one hard input error; rejected before any
    // store access.
    let user_id = req
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::ValidationError("user_id is required".to_string()))?
        .to_string();

    let country = geo::resolve_country(&req.country);
    let category = Category::new(&req.category);
    // Malformed exclusion ids are dropped, not rejected.
    let exclude_ids: Vec<Uuid> = req
        .exclude_ids
        .iter()
        .filter_map(|raw| Uuid::parse_str(raw.trim()).ok())
        .collect();

    let request = AllocationRequest {
        user_id: user_id.clone(),
        category: category.clone(),
        country: country.clone(),
        exclude_ids,
    };
    let outcome = state.allocator.allocate(&request).await;

    // Placeholder batches are never recorded as exposures.
    if !outcome.degraded {
        let ids: Vec<Uuid> = outcome.coupons.iter().map(|c| c.id).collect();
        state.recorder.spawn_record(user_id, ids);
    }

    // A batch is always single-tier, so the first coupon's currency
    // speaks for the whole response.
    let currency = match outcome.coupons.first() {
        Some(coupon) => CurrencyPayload {
            code: coupon.currency_code.clone(),
            symbol: coupon.currency_symbol.clone(),
        },
        None => {
            let fallback = geo::currency_for(&country);
            CurrencyPayload {
                code: fallback.code.to_string(),
                symbol: fallback.symbol.to_string(),
            }
        }
    };

    Ok(Json(AllocateResponse {
        coupons: outcome.coupons.iter().map(coupon_payload).collect(),
        category: category.to_string(),
        country,
        currency,
        fallback: outcome.degraded.then_some(true),
        error: outcome.reason,
    }))
}
