use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderLine};
use crate::domain::pricing::DishRef;
use crate::domain::promotion::{Promotion, PromotionPatch, PromotionQuote, Redemption};
use crate::schema::{dishes, order_lines, orders, promotion_redemptions, promotions};

// ── Dishes ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = dishes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DishRow {
    pub id: i32,
    pub name: String,
    pub price_cents: i64,
    pub is_active: bool,
}

impl From<DishRow> for DishRef {
    fn from(row: DishRow) -> Self {
        DishRef {
            dish_id: row.id,
            unit_price_cents: row.price_cents,
            is_orderable: row.is_active,
        }
    }
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: i32,
    pub order_number: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub is_delivery: bool,
    pub status: String,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub order_number: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub is_delivery: bool,
    pub status: String,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub total_cents: i64,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
pub struct PaymentChangeset {
    pub payment_status: String,
    /// `None` keeps the stored method.
    pub payment_method: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_lines)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderLineRow {
    pub id: i32,
    pub order_id: i32,
    pub dish_id: i32,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_lines)]
pub struct NewOrderLineRow {
    pub order_id: i32,
    pub dish_id: i32,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        OrderLine {
            id: row.id,
            order_id: row.order_id,
            dish_id: row.dish_id,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents,
            line_total_cents: row.line_total_cents,
        }
    }
}

impl OrderRow {
    /// Assemble the aggregate. Status columns that fall outside the known
    /// vocabulary are reported as storage corruption.
    pub fn into_order(self, lines: Vec<OrderLineRow>) -> Result<Order, DomainError> {
        let status = self.status.parse().map_err(|_| {
            DomainError::Storage(format!(
                "order {} has unknown status '{}'",
                self.order_number, self.status
            ))
        })?;
        let payment_status = self.payment_status.parse().map_err(|_| {
            DomainError::Storage(format!(
                "order {} has unknown payment status '{}'",
                self.order_number, self.payment_status
            ))
        })?;

        Ok(Order {
            id: self.id,
            order_number: self.order_number,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            customer_address: self.customer_address,
            is_delivery: self.is_delivery,
            status,
            payment_status,
            payment_method: self.payment_method,
            total_cents: self.total_cents,
            created_at: self.created_at,
            lines: lines.into_iter().map(OrderLine::from).collect(),
        })
    }
}

// ── Promotions ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = promotions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PromotionRow {
    pub id: i32,
    pub code: String,
    pub description: Option<String>,
    pub discount_percent: i32,
    pub min_order_amount_cents: i64,
    pub max_discount_cents: Option<i64>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
    pub times_used: i32,
    pub created_at: DateTime<Utc>,
}

impl From<PromotionRow> for Promotion {
    fn from(row: PromotionRow) -> Self {
        Promotion {
            id: row.id,
            code: row.code,
            description: row.description,
            discount_percent: row.discount_percent,
            min_order_amount_cents: row.min_order_amount_cents,
            max_discount_cents: row.max_discount_cents,
            is_active: row.is_active,
            expires_at: row.expires_at,
            usage_limit: row.usage_limit,
            times_used: row.times_used,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = promotions)]
pub struct NewPromotionRow {
    pub code: String,
    pub description: Option<String>,
    pub discount_percent: i32,
    pub min_order_amount_cents: i64,
    pub max_discount_cents: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
}

/// `None` fields are skipped by Diesel, so only supplied values change.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = promotions)]
pub struct PromotionChangeset {
    pub description: Option<String>,
    pub discount_percent: Option<i32>,
    pub min_order_amount_cents: Option<i64>,
    pub max_discount_cents: Option<i64>,
    pub is_active: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
}

impl From<PromotionPatch> for PromotionChangeset {
    fn from(patch: PromotionPatch) -> Self {
        PromotionChangeset {
            description: patch.description,
            discount_percent: patch.discount_percent,
            min_order_amount_cents: patch.min_order_amount_cents,
            max_discount_cents: patch.max_discount_cents,
            is_active: patch.is_active,
            expires_at: patch.expires_at,
            usage_limit: patch.usage_limit,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = promotion_redemptions)]
#[diesel(belongs_to(PromotionRow, foreign_key = promotion_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RedemptionRow {
    pub id: i32,
    pub promotion_id: i32,
    pub promotion_code: String,
    pub order_number: String,
    pub discount_percent: i32,
    pub original_total_cents: i64,
    pub discount_cents: i64,
    pub final_total_cents: i64,
    pub redeemed_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = promotion_redemptions)]
pub struct NewRedemptionRow {
    pub promotion_id: i32,
    pub promotion_code: String,
    pub order_number: String,
    pub discount_percent: i32,
    pub original_total_cents: i64,
    pub discount_cents: i64,
    pub final_total_cents: i64,
}

impl NewRedemptionRow {
    pub fn new(promotion_id: i32, order_number: &str, quote: &PromotionQuote) -> Self {
        NewRedemptionRow {
            promotion_id,
            promotion_code: quote.promotion_code.clone(),
            order_number: order_number.to_string(),
            discount_percent: quote.discount_percent,
            original_total_cents: quote.original_total_cents,
            discount_cents: quote.discount_cents,
            final_total_cents: quote.final_total_cents,
        }
    }
}

impl From<RedemptionRow> for Redemption {
    fn from(row: RedemptionRow) -> Self {
        Redemption {
            promotion_id: row.promotion_id,
            order_number: row.order_number,
            quote: PromotionQuote {
                promotion_code: row.promotion_code,
                discount_percent: row.discount_percent,
                discount_cents: row.discount_cents,
                original_total_cents: row.original_total_cents,
                final_total_cents: row.final_total_cents,
            },
            redeemed_at: row.redeemed_at,
        }
    }
}
