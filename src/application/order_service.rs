use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{limit_len, MAX_PAYMENT_METHOD_LEN};
use crate::domain::order::{CartItem, GuestDetails, NewOrder, Order, OrdersSummary, Page};
use crate::domain::ports::{CatalogLookup, OrderRepository};
use crate::domain::pricing::compute_cart;
use crate::domain::status::{FulfillmentStatus, PaymentStatus};

pub const ORDER_NUMBER_LEN: usize = 12;

/// Fresh externally visible order number: 12 lowercase hex characters.
pub fn generate_order_number() -> String {
    let mut number = Uuid::new_v4().simple().to_string();
    number.truncate(ORDER_NUMBER_LEN);
    number
}

/// Owns the order aggregate: guest checkout plus the fulfillment and payment
/// status changes that follow it.
pub struct OrderService<R, C> {
    repo: R,
    catalog: C,
}

impl<R: OrderRepository, C: CatalogLookup> OrderService<R, C> {
    pub fn new(repo: R, catalog: C) -> Self {
        Self { repo, catalog }
    }

    pub fn create_guest_order(
        &self,
        items: &[CartItem],
        guest: GuestDetails,
    ) -> Result<Order, DomainError> {
        guest.validate()?;
        let priced = compute_cart(items, &self.catalog)?;

        let order = self.repo.create(NewOrder {
            order_number: generate_order_number(),
            guest,
            total_cents: priced.total_cents,
            lines: priced.lines,
        })?;

        log::info!(
            "Created order {} with {} line(s), total {} cents",
            order.order_number,
            order.lines.len(),
            order.total_cents
        );
        Ok(order)
    }

    pub fn get_by_order_number(&self, order_number: &str) -> Result<Order, DomainError> {
        self.repo
            .find_by_number(order_number)?
            .ok_or(DomainError::OrderNotFound)
    }

    /// Accepts any token of the fulfillment vocabulary from any current state.
    /// Moves that do not follow the forward sequence are logged, not refused.
    pub fn set_fulfillment_status(
        &self,
        order_number: &str,
        new_status: &str,
    ) -> Result<Order, DomainError> {
        let current = self.get_by_order_number(order_number)?;
        let new_status: FulfillmentStatus = new_status.parse()?;

        if current.status != new_status && !current.status.is_forward_transition(new_status) {
            log::warn!(
                "Order {} moved backwards or out of a terminal state: {} -> {}",
                order_number,
                current.status,
                new_status
            );
        }

        let order = self
            .repo
            .update_status(order_number, new_status)?
            .ok_or(DomainError::OrderNotFound)?;
        log::info!("Order {} status set to {}", order_number, new_status);
        Ok(order)
    }

    pub fn set_payment_status(
        &self,
        order_number: &str,
        new_status: &str,
        new_method: Option<String>,
    ) -> Result<Order, DomainError> {
        let current = self.get_by_order_number(order_number)?;
        let new_status: PaymentStatus = new_status.parse()?;
        // An empty method means "not supplied".
        let new_method = new_method.filter(|m| !m.is_empty());
        if let Some(method) = &new_method {
            limit_len("payment_method", method, MAX_PAYMENT_METHOD_LEN)?;
        }

        if current.payment_status != new_status
            && !current.payment_status.is_forward_transition(new_status)
        {
            log::warn!(
                "Order {} payment moved from {} to {}",
                order_number,
                current.payment_status,
                new_status
            );
        }

        let order = self
            .repo
            .update_payment(order_number, new_status, new_method)?
            .ok_or(DomainError::OrderNotFound)?;
        log::info!(
            "Order {} payment status set to {}",
            order_number,
            new_status
        );
        Ok(order)
    }

    pub fn list_by_status(
        &self,
        status: Option<&str>,
        page: Page,
    ) -> Result<Vec<Order>, DomainError> {
        let status = status.map(str::parse::<FulfillmentStatus>).transpose()?;
        self.repo.list(status, page)
    }

    /// Per-status counts for the manager dashboard.
    pub fn summary(&self) -> Result<OrdersSummary, DomainError> {
        self.repo.count_by_status()
    }
}
