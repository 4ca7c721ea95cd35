//! In-process adapters for the domain ports. Each repository keeps its state
//! behind a single mutex, so every operation (including redemption's
//! check-and-increment) is atomic.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderLine, OrdersSummary, Page};
use crate::domain::ports::{CatalogLookup, OrderRepository, PromotionRepository};
use crate::domain::pricing::DishRef;
use crate::domain::promotion::{NewPromotion, Promotion, PromotionPatch, PromotionQuote, Redemption};
use crate::domain::status::{FulfillmentStatus, PaymentStatus};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, DomainError> {
    mutex
        .lock()
        .map_err(|_| DomainError::StorageUnavailable("in-memory store poisoned".to_string()))
}

fn window<T: Clone>(items: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    items
        .skip(page.skip as usize)
        .take(page.limit as usize)
        .collect()
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    dishes: Mutex<HashMap<i32, DishRef>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dish(self, dish_id: i32, unit_price_cents: i64, is_orderable: bool) -> Self {
        self.upsert(dish_id, unit_price_cents, is_orderable);
        self
    }

    /// Insert or replace a dish, e.g. to simulate a price change.
    pub fn upsert(&self, dish_id: i32, unit_price_cents: i64, is_orderable: bool) {
        if let Ok(mut dishes) = self.dishes.lock() {
            dishes.insert(
                dish_id,
                DishRef {
                    dish_id,
                    unit_price_cents,
                    is_orderable,
                },
            );
        }
    }
}

impl CatalogLookup for InMemoryCatalog {
    fn find_dish(&self, dish_id: i32) -> Result<Option<DishRef>, DomainError> {
        Ok(lock(&self.dishes)?.get(&dish_id).copied())
    }
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct OrderState {
    orders: Vec<Order>,
    next_order_id: i32,
    next_line_id: i32,
}

#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    state: Mutex<OrderState>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.orders.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn modify(
        &self,
        order_number: &str,
        apply: impl FnOnce(&mut Order),
    ) -> Result<Option<Order>, DomainError> {
        let mut state = lock(&self.state)?;
        Ok(state
            .orders
            .iter_mut()
            .find(|o| o.order_number == order_number)
            .map(|order| {
                apply(order);
                order.clone()
            }))
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut state = lock(&self.state)?;
        if state
            .orders
            .iter()
            .any(|o| o.order_number == order.order_number)
        {
            return Err(DomainError::Storage(format!(
                "duplicate order number {}",
                order.order_number
            )));
        }

        state.next_order_id += 1;
        let order_id = state.next_order_id;
        let mut lines = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            state.next_line_id += 1;
            lines.push(OrderLine {
                id: state.next_line_id,
                order_id,
                dish_id: line.dish_id,
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                line_total_cents: line.line_total_cents,
            });
        }

        let created = Order {
            id: order_id,
            order_number: order.order_number,
            customer_name: order.guest.customer_name,
            customer_phone: order.guest.customer_phone,
            customer_address: order.guest.customer_address,
            is_delivery: order.guest.is_delivery,
            status: FulfillmentStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: order.guest.payment_method,
            total_cents: order.total_cents,
            created_at: Utc::now(),
            lines,
        };
        state.orders.push(created.clone());
        Ok(created)
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<Order>, DomainError> {
        let state = lock(&self.state)?;
        Ok(state
            .orders
            .iter()
            .find(|o| o.order_number == order_number)
            .cloned())
    }

    fn update_status(
        &self,
        order_number: &str,
        status: FulfillmentStatus,
    ) -> Result<Option<Order>, DomainError> {
        self.modify(order_number, |order| order.status = status)
    }

    fn update_payment(
        &self,
        order_number: &str,
        status: PaymentStatus,
        method: Option<String>,
    ) -> Result<Option<Order>, DomainError> {
        self.modify(order_number, |order| {
            order.payment_status = status;
            if method.is_some() {
                order.payment_method = method;
            }
        })
    }

    fn list(
        &self,
        status: Option<FulfillmentStatus>,
        page: Page,
    ) -> Result<Vec<Order>, DomainError> {
        let state = lock(&self.state)?;
        let matching = state
            .orders
            .iter()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .cloned();
        Ok(window(matching, page))
    }

    fn count_by_status(&self) -> Result<OrdersSummary, DomainError> {
        let state = lock(&self.state)?;
        Ok(OrdersSummary::from_counts(
            state.orders.iter().map(|o| (o.status, 1)),
        ))
    }
}

// ── Promotions ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct PromotionState {
    promotions: Vec<Promotion>,
    redemptions: Vec<Redemption>,
    next_id: i32,
}

#[derive(Debug, Default)]
pub struct InMemoryPromotionRepository {
    state: Mutex<PromotionState>,
}

impl InMemoryPromotionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fully specified promotion, bypassing validation. Handy for
    /// seeding expired or exhausted promotions.
    pub fn insert(&self, promotion: Promotion) -> Promotion {
        if let Ok(mut state) = self.state.lock() {
            state.next_id = state.next_id.max(promotion.id);
            state.promotions.push(promotion.clone());
        }
        promotion
    }
}

impl PromotionRepository for InMemoryPromotionRepository {
    fn create(&self, new: NewPromotion) -> Result<Promotion, DomainError> {
        let mut state = lock(&self.state)?;
        if state.promotions.iter().any(|p| p.code == new.code) {
            return Err(DomainError::DuplicatePromotionCode(new.code));
        }
        state.next_id += 1;
        let promotion = Promotion {
            id: state.next_id,
            code: new.code,
            description: new.description,
            discount_percent: new.discount_percent,
            min_order_amount_cents: new.min_order_amount_cents,
            max_discount_cents: new.max_discount_cents,
            is_active: true,
            expires_at: new.expires_at,
            usage_limit: new.usage_limit,
            times_used: 0,
            created_at: Utc::now(),
        };
        state.promotions.push(promotion.clone());
        Ok(promotion)
    }

    fn find_by_id(&self, id: i32) -> Result<Option<Promotion>, DomainError> {
        let state = lock(&self.state)?;
        Ok(state.promotions.iter().find(|p| p.id == id).cloned())
    }

    fn find_active_by_code(&self, code: &str) -> Result<Option<Promotion>, DomainError> {
        let state = lock(&self.state)?;
        Ok(state
            .promotions
            .iter()
            .find(|p| p.code == code && p.is_active)
            .cloned())
    }

    fn list(&self, active_only: bool, page: Page) -> Result<Vec<Promotion>, DomainError> {
        let state = lock(&self.state)?;
        let mut matching: Vec<Promotion> = state
            .promotions
            .iter()
            .filter(|p| !active_only || p.is_active)
            .cloned()
            .collect();
        matching.sort_by_key(|p| p.id);
        Ok(window(matching.into_iter(), page))
    }

    fn update(&self, id: i32, patch: PromotionPatch) -> Result<Option<Promotion>, DomainError> {
        let mut state = lock(&self.state)?;
        let Some(promotion) = state.promotions.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(description) = patch.description {
            promotion.description = Some(description);
        }
        if let Some(discount_percent) = patch.discount_percent {
            promotion.discount_percent = discount_percent;
        }
        if let Some(min) = patch.min_order_amount_cents {
            promotion.min_order_amount_cents = min;
        }
        if let Some(cap) = patch.max_discount_cents {
            promotion.max_discount_cents = Some(cap);
        }
        if let Some(is_active) = patch.is_active {
            promotion.is_active = is_active;
        }
        if let Some(expires_at) = patch.expires_at {
            promotion.expires_at = Some(expires_at);
        }
        if let Some(limit) = patch.usage_limit {
            promotion.usage_limit = Some(limit);
        }
        Ok(Some(promotion.clone()))
    }

    fn find_redemption(
        &self,
        promotion_id: i32,
        order_number: &str,
    ) -> Result<Option<Redemption>, DomainError> {
        let state = lock(&self.state)?;
        Ok(state
            .redemptions
            .iter()
            .find(|r| r.promotion_id == promotion_id && r.order_number == order_number)
            .cloned())
    }

    fn record_redemption(
        &self,
        promotion_id: i32,
        order_number: &str,
        quote: &PromotionQuote,
    ) -> Result<Redemption, DomainError> {
        let mut state = lock(&self.state)?;
        if let Some(existing) = state
            .redemptions
            .iter()
            .find(|r| r.promotion_id == promotion_id && r.order_number == order_number)
        {
            return Ok(existing.clone());
        }

        let promotion = state
            .promotions
            .iter_mut()
            .find(|p| p.id == promotion_id)
            .ok_or(DomainError::PromotionNotFound)?;
        if promotion.is_limit_reached() {
            return Err(DomainError::PromotionLimitReached);
        }
        promotion.times_used += 1;

        let redemption = Redemption {
            promotion_id,
            order_number: order_number.to_string(),
            quote: quote.clone(),
            redeemed_at: Utc::now(),
        };
        state.redemptions.push(redemption.clone());
        Ok(redemption)
    }
}
