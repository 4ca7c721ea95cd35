use std::sync::Arc;

use super::errors::DomainError;
use super::order::{NewOrder, Order, OrdersSummary, Page};
use super::pricing::DishRef;
use super::promotion::{NewPromotion, Promotion, PromotionPatch, PromotionQuote, Redemption};
use super::status::{FulfillmentStatus, PaymentStatus};

/// Read-only view of the menu.
pub trait CatalogLookup: Send + Sync + 'static {
    fn find_dish(&self, dish_id: i32) -> Result<Option<DishRef>, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Persist the order and all of its lines, or nothing at all.
    fn create(&self, order: NewOrder) -> Result<Order, DomainError>;
    fn find_by_number(&self, order_number: &str) -> Result<Option<Order>, DomainError>;
    fn update_status(
        &self,
        order_number: &str,
        status: FulfillmentStatus,
    ) -> Result<Option<Order>, DomainError>;
    fn update_payment(
        &self,
        order_number: &str,
        status: PaymentStatus,
        method: Option<String>,
    ) -> Result<Option<Order>, DomainError>;
    fn list(
        &self,
        status: Option<FulfillmentStatus>,
        page: Page,
    ) -> Result<Vec<Order>, DomainError>;
    fn count_by_status(&self) -> Result<OrdersSummary, DomainError>;
}

pub trait PromotionRepository: Send + Sync + 'static {
    fn create(&self, promotion: NewPromotion) -> Result<Promotion, DomainError>;
    fn find_by_id(&self, id: i32) -> Result<Option<Promotion>, DomainError>;
    fn find_active_by_code(&self, code: &str) -> Result<Option<Promotion>, DomainError>;
    fn list(&self, active_only: bool, page: Page) -> Result<Vec<Promotion>, DomainError>;
    fn update(&self, id: i32, patch: PromotionPatch) -> Result<Option<Promotion>, DomainError>;
    fn find_redemption(
        &self,
        promotion_id: i32,
        order_number: &str,
    ) -> Result<Option<Redemption>, DomainError>;
    /// Record the redemption and bump `times_used` atomically. Fails with
    /// `PromotionLimitReached` when the usage limit was hit concurrently.
    /// Recording the same order twice returns the first redemption.
    fn record_redemption(
        &self,
        promotion_id: i32,
        order_number: &str,
        quote: &PromotionQuote,
    ) -> Result<Redemption, DomainError>;
}

// Shared handles let the HTTP layer hold trait objects behind `web::Data`.

impl<T: CatalogLookup + ?Sized> CatalogLookup for Arc<T> {
    fn find_dish(&self, dish_id: i32) -> Result<Option<DishRef>, DomainError> {
        (**self).find_dish(dish_id)
    }
}

impl<T: OrderRepository + ?Sized> OrderRepository for Arc<T> {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        (**self).create(order)
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<Order>, DomainError> {
        (**self).find_by_number(order_number)
    }

    fn update_status(
        &self,
        order_number: &str,
        status: FulfillmentStatus,
    ) -> Result<Option<Order>, DomainError> {
        (**self).update_status(order_number, status)
    }

    fn update_payment(
        &self,
        order_number: &str,
        status: PaymentStatus,
        method: Option<String>,
    ) -> Result<Option<Order>, DomainError> {
        (**self).update_payment(order_number, status, method)
    }

    fn list(
        &self,
        status: Option<FulfillmentStatus>,
        page: Page,
    ) -> Result<Vec<Order>, DomainError> {
        (**self).list(status, page)
    }

    fn count_by_status(&self) -> Result<OrdersSummary, DomainError> {
        (**self).count_by_status()
    }
}

impl<T: PromotionRepository + ?Sized> PromotionRepository for Arc<T> {
    fn create(&self, promotion: NewPromotion) -> Result<Promotion, DomainError> {
        (**self).create(promotion)
    }

    fn find_by_id(&self, id: i32) -> Result<Option<Promotion>, DomainError> {
        (**self).find_by_id(id)
    }

    fn find_active_by_code(&self, code: &str) -> Result<Option<Promotion>, DomainError> {
        (**self).find_active_by_code(code)
    }

    fn list(&self, active_only: bool, page: Page) -> Result<Vec<Promotion>, DomainError> {
        (**self).list(active_only, page)
    }

    fn update(&self, id: i32, patch: PromotionPatch) -> Result<Option<Promotion>, DomainError> {
        (**self).update(id, patch)
    }

    fn find_redemption(
        &self,
        promotion_id: i32,
        order_number: &str,
    ) -> Result<Option<Redemption>, DomainError> {
        (**self).find_redemption(promotion_id, order_number)
    }

    fn record_redemption(
        &self,
        promotion_id: i32,
        order_number: &str,
        quote: &PromotionQuote,
    ) -> Result<Redemption, DomainError> {
        (**self).record_redemption(promotion_id, order_number, quote)
    }
}
