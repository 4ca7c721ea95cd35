use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::DynOrderService;
use crate::domain::order::{CartItem, GuestDetails, Order, OrderLine};
use crate::domain::status::{FulfillmentStatus, PaymentStatus};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartItemRequest {
    pub dish_id: i32,
    pub qty: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GuestOrderRequest {
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub is_delivery: bool,
    /// e.g. "cash", "card" or "online"
    #[serde(default)]
    pub payment_method: Option<String>,
    pub items: Vec<CartItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentUpdateRequest {
    pub payment_status: String,
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub id: i32,
    pub order_id: i32,
    pub dish_id: i32,
    pub qty: i32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub order_number: String,
    pub id: i32,
    pub status: FulfillmentStatus,
    pub total_cents: i64,
    pub payment_method: Option<String>,
    pub payment_status: PaymentStatus,
    pub items: Vec<OrderLineResponse>,
    pub created_at: String,
    pub is_delivery: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusChangeResponse {
    pub message: String,
    pub order_number: String,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(line: OrderLine) -> Self {
        OrderLineResponse {
            id: line.id,
            order_id: line.order_id,
            dish_id: line.dish_id,
            qty: line.quantity,
            unit_price_cents: line.unit_price_cents,
            line_total_cents: line.line_total_cents,
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            order_number: order.order_number,
            id: order.id,
            status: order.status,
            total_cents: order.total_cents,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            items: order
                .lines
                .into_iter()
                .map(OrderLineResponse::from)
                .collect(),
            created_at: order.created_at.to_rfc3339(),
            is_delivery: order.is_delivery,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders/guest
///
/// Prices the cart from the catalog and stores the order with all of its
/// lines in a single transaction. Client-supplied prices are never trusted.
#[utoipa::path(
    post,
    path = "/orders/guest",
    request_body = GuestOrderRequest,
    responses(
        (status = 200, description = "Order placed", body = OrderResponse),
        (status = 404, description = "Dish not found or not orderable"),
        (status = 422, description = "Invalid quantity or customer details"),
    ),
    tag = "orders"
)]
pub async fn create_guest_order(
    service: web::Data<DynOrderService>,
    body: web::Json<GuestOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let items: Vec<CartItem> = body
        .items
        .iter()
        .map(|item| CartItem {
            dish_id: item.dish_id,
            quantity: item.qty,
        })
        .collect();
    let guest = GuestDetails {
        customer_name: body.customer_name,
        customer_phone: body.customer_phone,
        customer_address: body.customer_address,
        is_delivery: body.is_delivery,
        payment_method: body.payment_method,
    };

    let order = web::block(move || service.create_guest_order(&items, guest))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders/{order_number}
#[utoipa::path(
    get,
    path = "/orders/{order_number}",
    params(
        ("order_number" = String, Path, description = "Public order number"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<DynOrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let order_number = path.into_inner();

    let order = web::block(move || service.get_by_order_number(&order_number))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PATCH /orders/{order_number}/status
///
/// Any of the seven fulfillment tokens is accepted from any current status.
#[utoipa::path(
    patch,
    path = "/orders/{order_number}/status",
    params(
        ("order_number" = String, Path, description = "Public order number"),
    ),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Status updated", body = StatusChangeResponse),
        (status = 400, description = "Unknown status token"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn update_status(
    service: web::Data<DynOrderService>,
    path: web::Path<String>,
    body: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let order_number = path.into_inner();
    let status = body.into_inner().status;

    let order = web::block(move || service.set_fulfillment_status(&order_number, &status))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(StatusChangeResponse {
        message: format!("Order status updated to {}", order.status),
        order_number: order.order_number,
    }))
}

/// PATCH /orders/{order_number}/payment
#[utoipa::path(
    patch,
    path = "/orders/{order_number}/payment",
    params(
        ("order_number" = String, Path, description = "Public order number"),
    ),
    request_body = PaymentUpdateRequest,
    responses(
        (status = 200, description = "Payment status updated", body = StatusChangeResponse),
        (status = 400, description = "Unknown payment status token"),
        (status = 404, description = "Order not found"),
        (status = 422, description = "Payment method too long"),
    ),
    tag = "orders"
)]
pub async fn update_payment(
    service: web::Data<DynOrderService>,
    path: web::Path<String>,
    body: web::Json<PaymentUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let order_number = path.into_inner();
    let body = body.into_inner();

    let order = web::block(move || {
        service.set_payment_status(&order_number, &body.payment_status, body.payment_method)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(StatusChangeResponse {
        message: format!("Payment status updated to {}", order.payment_status),
        order_number: order.order_number,
    }))
}
