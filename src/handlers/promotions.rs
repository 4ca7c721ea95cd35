use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::MessageResponse;
use crate::application::DynPromotionService;
use crate::domain::order::Page;
use crate::domain::promotion::{NewPromotion, Promotion, PromotionPatch, PromotionQuote, Redemption};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyPromotionRequest {
    pub code: String,
    pub order_total_cents: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApplyPromotionResponse {
    pub promotion_code: String,
    pub discount_percent: i32,
    pub discount_amount_cents: i64,
    pub original_total_cents: i64,
    pub final_total_cents: i64,
    pub savings_cents: i64,
}

impl From<PromotionQuote> for ApplyPromotionResponse {
    fn from(quote: PromotionQuote) -> Self {
        ApplyPromotionResponse {
            promotion_code: quote.promotion_code,
            discount_percent: quote.discount_percent,
            discount_amount_cents: quote.discount_cents,
            original_total_cents: quote.original_total_cents,
            final_total_cents: quote.final_total_cents,
            savings_cents: quote.discount_cents,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateCodeResponse {
    pub code: String,
    pub is_valid: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RedeemPromotionRequest {
    pub code: String,
    pub order_number: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RedemptionResponse {
    pub promotion_code: String,
    pub order_number: String,
    pub discount_percent: i32,
    pub discount_amount_cents: i64,
    pub original_total_cents: i64,
    pub final_total_cents: i64,
    pub redeemed_at: DateTime<Utc>,
}

impl From<Redemption> for RedemptionResponse {
    fn from(redemption: Redemption) -> Self {
        let quote = redemption.quote;
        RedemptionResponse {
            promotion_code: quote.promotion_code,
            order_number: redemption.order_number,
            discount_percent: quote.discount_percent,
            discount_amount_cents: quote.discount_cents,
            original_total_cents: quote.original_total_cents,
            final_total_cents: quote.final_total_cents,
            redeemed_at: redemption.redeemed_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePromotionRequest {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub discount_percent: i32,
    #[serde(default)]
    pub min_order_amount_cents: i64,
    #[serde(default)]
    pub max_discount_cents: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Omit for unlimited use.
    #[serde(default)]
    pub usage_limit: Option<i32>,
}

impl From<CreatePromotionRequest> for NewPromotion {
    fn from(req: CreatePromotionRequest) -> Self {
        NewPromotion {
            code: req.code,
            description: req.description,
            discount_percent: req.discount_percent,
            min_order_amount_cents: req.min_order_amount_cents,
            max_discount_cents: req.max_discount_cents,
            expires_at: req.expires_at,
            usage_limit: req.usage_limit,
        }
    }
}

/// Only the supplied fields change.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdatePromotionRequest {
    pub description: Option<String>,
    pub discount_percent: Option<i32>,
    pub min_order_amount_cents: Option<i64>,
    pub max_discount_cents: Option<i64>,
    pub is_active: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
}

impl From<UpdatePromotionRequest> for PromotionPatch {
    fn from(req: UpdatePromotionRequest) -> Self {
        PromotionPatch {
            description: req.description,
            discount_percent: req.discount_percent,
            min_order_amount_cents: req.min_order_amount_cents,
            max_discount_cents: req.max_discount_cents,
            is_active: req.is_active,
            expires_at: req.expires_at,
            usage_limit: req.usage_limit,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PromotionResponse {
    pub id: i32,
    pub code: String,
    pub description: Option<String>,
    pub discount_percent: i32,
    pub min_order_amount_cents: i64,
    pub max_discount_cents: Option<i64>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub usage_limit: Option<i32>,
    pub times_used: i32,
}

impl From<Promotion> for PromotionResponse {
    fn from(p: Promotion) -> Self {
        PromotionResponse {
            id: p.id,
            code: p.code,
            description: p.description,
            discount_percent: p.discount_percent,
            min_order_amount_cents: p.min_order_amount_cents,
            max_discount_cents: p.max_discount_cents,
            is_active: p.is_active,
            expires_at: p.expires_at,
            created_at: p.created_at,
            usage_limit: p.usage_limit,
            times_used: p.times_used,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListPromotionsParams {
    #[serde(default = "default_active_only")]
    pub active_only: bool,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_active_only() -> bool {
    true
}

fn default_limit() -> i64 {
    Page::DEFAULT_LIMIT
}

// ── Quote / validate / redeem ────────────────────────────────────────────────

/// POST /promotions/apply
///
/// Quotes a discount. Usage counters are not touched.
#[utoipa::path(
    post,
    path = "/promotions/apply",
    request_body = ApplyPromotionRequest,
    responses(
        (status = 200, description = "Discount quoted", body = ApplyPromotionResponse),
        (status = 400, description = "Expired, limit reached or minimum not met"),
        (status = 404, description = "Promotion code not found"),
    ),
    tag = "promotions"
)]
pub async fn apply_promotion(
    service: web::Data<DynPromotionService>,
    body: web::Json<ApplyPromotionRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let quote = web::block(move || service.apply(&body.code, body.order_total_cents))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ApplyPromotionResponse::from(quote)))
}

/// GET /promotions/validate/{code}
///
/// Never fails for an unusable code; `is_valid` is false instead.
#[utoipa::path(
    get,
    path = "/promotions/validate/{code}",
    params(
        ("code" = String, Path, description = "Promotion code, any case"),
    ),
    responses(
        (status = 200, description = "Validation result", body = ValidateCodeResponse),
    ),
    tag = "promotions"
)]
pub async fn validate_code(
    service: web::Data<DynPromotionService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let code = path.into_inner();
    let lookup = code.clone();

    let is_valid = web::block(move || service.validate(&lookup))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ValidateCodeResponse { code, is_valid }))
}

/// POST /promotions/redeem
///
/// Consumes one use of the code for a placed order. Repeating the request for
/// the same order returns the original redemption.
#[utoipa::path(
    post,
    path = "/promotions/redeem",
    request_body = RedeemPromotionRequest,
    responses(
        (status = 200, description = "Promotion redeemed", body = RedemptionResponse),
        (status = 400, description = "Expired, limit reached or minimum not met"),
        (status = 404, description = "Promotion code or order not found"),
    ),
    tag = "promotions"
)]
pub async fn redeem_promotion(
    service: web::Data<DynPromotionService>,
    body: web::Json<RedeemPromotionRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let redemption = web::block(move || service.redeem(&body.code, &body.order_number))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(RedemptionResponse::from(redemption)))
}

// ── Administration ───────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/promotions",
    request_body = CreatePromotionRequest,
    responses(
        (status = 200, description = "Promotion created", body = PromotionResponse),
        (status = 400, description = "Code already exists"),
        (status = 422, description = "Field out of bounds"),
    ),
    tag = "promotions"
)]
pub async fn create_promotion(
    service: web::Data<DynPromotionService>,
    body: web::Json<CreatePromotionRequest>,
) -> Result<HttpResponse, AppError> {
    let promotion = NewPromotion::from(body.into_inner());

    let created = web::block(move || service.create(promotion))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(PromotionResponse::from(created)))
}

#[utoipa::path(
    get,
    path = "/promotions",
    params(
        ("active_only" = Option<bool>, Query, description = "Active only (default true)"),
        ("skip" = Option<i64>, Query, description = "Rows to skip (default 0)"),
        ("limit" = Option<i64>, Query, description = "Page size (default 100, max 100)"),
    ),
    responses(
        (status = 200, description = "Promotions in id order", body = [PromotionResponse]),
    ),
    tag = "promotions"
)]
pub async fn list_promotions(
    service: web::Data<DynPromotionService>,
    query: web::Query<ListPromotionsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = Page::new(params.skip, params.limit);

    let promotions = web::block(move || service.list(params.active_only, page))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<PromotionResponse> = promotions
        .into_iter()
        .map(PromotionResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(items))
}

#[utoipa::path(
    get,
    path = "/promotions/{id}",
    params(("id" = i32, Path, description = "Promotion id")),
    responses(
        (status = 200, description = "Promotion found", body = PromotionResponse),
        (status = 404, description = "Promotion not found"),
    ),
    tag = "promotions"
)]
pub async fn get_promotion(
    service: web::Data<DynPromotionService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let promotion = web::block(move || service.get(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(PromotionResponse::from(promotion)))
}

#[utoipa::path(
    put,
    path = "/promotions/{id}",
    params(("id" = i32, Path, description = "Promotion id")),
    request_body = UpdatePromotionRequest,
    responses(
        (status = 200, description = "Promotion updated", body = PromotionResponse),
        (status = 404, description = "Promotion not found"),
        (status = 422, description = "Field out of bounds"),
    ),
    tag = "promotions"
)]
pub async fn update_promotion(
    service: web::Data<DynPromotionService>,
    path: web::Path<i32>,
    body: web::Json<UpdatePromotionRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let patch = PromotionPatch::from(body.into_inner());

    let promotion = web::block(move || service.update(id, patch))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(PromotionResponse::from(promotion)))
}

/// DELETE /promotions/{id}
///
/// Soft delete: the promotion is deactivated and kept.
#[utoipa::path(
    delete,
    path = "/promotions/{id}",
    params(("id" = i32, Path, description = "Promotion id")),
    responses(
        (status = 200, description = "Promotion deactivated", body = MessageResponse),
        (status = 404, description = "Promotion not found"),
    ),
    tag = "promotions"
)]
pub async fn deactivate_promotion(
    service: web::Data<DynPromotionService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    web::block(move || service.deactivate(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Promotion deactivated".to_string(),
    }))
}
