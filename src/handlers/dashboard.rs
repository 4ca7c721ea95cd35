use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::orders::OrderResponse;
use crate::application::DynOrderService;
use crate::domain::order::{OrdersSummary, Page};
use crate::domain::status::FulfillmentStatus;
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct StaffOrdersParams {
    /// One of the seven fulfillment tokens; omit for all orders.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    Page::DEFAULT_LIMIT
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrdersSummaryResponse {
    pub pending_orders: i64,
    pub confirmed_orders: i64,
    pub preparing_orders: i64,
    pub ready_orders: i64,
    pub out_for_delivery_orders: i64,
    pub delivered_orders: i64,
    pub cancelled_orders: i64,
    /// Everything not yet delivered or cancelled.
    pub total_active_orders: i64,
}

impl From<OrdersSummary> for OrdersSummaryResponse {
    fn from(summary: OrdersSummary) -> Self {
        OrdersSummaryResponse {
            pending_orders: summary.count(FulfillmentStatus::Pending),
            confirmed_orders: summary.count(FulfillmentStatus::Confirmed),
            preparing_orders: summary.count(FulfillmentStatus::Preparing),
            ready_orders: summary.count(FulfillmentStatus::Ready),
            out_for_delivery_orders: summary.count(FulfillmentStatus::OutForDelivery),
            delivered_orders: summary.count(FulfillmentStatus::Delivered),
            cancelled_orders: summary.count(FulfillmentStatus::Cancelled),
            total_active_orders: summary.total_active(),
        }
    }
}

/// GET /dashboard/staff/orders
///
/// Orders in placement order, each with its lines.
#[utoipa::path(
    get,
    path = "/dashboard/staff/orders",
    params(
        ("status" = Option<String>, Query, description = "Fulfillment status filter"),
        ("skip" = Option<i64>, Query, description = "Rows to skip (default 0)"),
        ("limit" = Option<i64>, Query, description = "Page size (default 100, max 100)"),
    ),
    responses(
        (status = 200, description = "Page of orders", body = [OrderResponse]),
        (status = 400, description = "Unknown status token"),
    ),
    tag = "dashboard"
)]
pub async fn staff_orders(
    service: web::Data<DynOrderService>,
    query: web::Query<StaffOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = Page::new(params.skip, params.limit);
    // An empty `?status=` means no filter.
    let status = params.status.filter(|s| !s.is_empty());

    let orders = web::block(move || service.list_by_status(status.as_deref(), page))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// GET /dashboard/manager/orders-summary
#[utoipa::path(
    get,
    path = "/dashboard/manager/orders-summary",
    responses(
        (status = 200, description = "Order counts per status", body = OrdersSummaryResponse),
    ),
    tag = "dashboard"
)]
pub async fn orders_summary(service: web::Data<DynOrderService>) -> Result<HttpResponse, AppError> {
    let summary = web::block(move || service.summary())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrdersSummaryResponse::from(summary)))
}
