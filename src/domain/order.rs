use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::errors::DomainError;
use super::status::{FulfillmentStatus, PaymentStatus};

pub const MAX_CUSTOMER_NAME_LEN: usize = 100;
pub const MAX_CUSTOMER_PHONE_LEN: usize = 20;
pub const MAX_CUSTOMER_ADDRESS_LEN: usize = 300;
pub const MAX_PAYMENT_METHOD_LEN: usize = 50;

/// One entry of a guest's cart. Quantities are validated during pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartItem {
    pub dish_id: i32,
    pub quantity: i32,
}

/// Who is ordering and how the order is handed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestDetails {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub is_delivery: bool,
    pub payment_method: Option<String>,
}

impl GuestDetails {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("customer_name", &self.customer_name, MAX_CUSTOMER_NAME_LEN)?;
        require_text(
            "customer_phone",
            &self.customer_phone,
            MAX_CUSTOMER_PHONE_LEN,
        )?;
        if let Some(address) = &self.customer_address {
            limit_len("customer_address", address, MAX_CUSTOMER_ADDRESS_LEN)?;
        }
        if let Some(method) = &self.payment_method {
            limit_len("payment_method", method, MAX_PAYMENT_METHOD_LEN)?;
        }
        Ok(())
    }
}

fn require_text(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidInput(format!("{field} must not be empty")));
    }
    limit_len(field, value, max)
}

pub(crate) fn limit_len(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.chars().count() > max {
        return Err(DomainError::InvalidInput(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// A cart line after server-side price resolution. The unit price is frozen
/// here and never re-read from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub dish_id: i32,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub total_cents: i64,
}

/// Everything the repository needs to persist a fresh order in one unit.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub guest: GuestDetails,
    pub total_cents: i64,
    pub lines: Vec<PricedLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub id: i32,
    pub order_id: i32,
    pub dish_id: i32,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: i32,
    pub order_number: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub is_delivery: bool,
    pub status: FulfillmentStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

/// Offset/limit window used by the list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 100;
    pub const MAX_LIMIT: i64 = 100;

    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip: skip.max(0),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_LIMIT)
    }
}

/// Number of orders currently in each fulfillment status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrdersSummary {
    by_status: HashMap<FulfillmentStatus, i64>,
}

impl OrdersSummary {
    pub fn from_counts(counts: impl IntoIterator<Item = (FulfillmentStatus, i64)>) -> Self {
        let mut by_status = HashMap::new();
        for (status, count) in counts {
            *by_status.entry(status).or_insert(0) += count;
        }
        Self { by_status }
    }

    pub fn count(&self, status: FulfillmentStatus) -> i64 {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Orders not yet delivered or cancelled.
    pub fn total_active(&self) -> i64 {
        FulfillmentStatus::ALL
            .into_iter()
            .filter(|status| !status.is_terminal())
            .map(|status| self.count(status))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest() -> GuestDetails {
        GuestDetails {
            customer_name: "Ada".to_string(),
            customer_phone: "555-0100".to_string(),
            customer_address: None,
            is_delivery: false,
            payment_method: Some("card".to_string()),
        }
    }

    #[test]
    fn valid_guest_passes() {
        assert_eq!(guest().validate(), Ok(()));
    }

    #[test]
    fn blank_name_is_rejected() {
        let details = GuestDetails {
            customer_name: "   ".to_string(),
            ..guest()
        };
        assert!(matches!(
            details.validate(),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn overlong_phone_is_rejected() {
        let details = GuestDetails {
            customer_phone: "1".repeat(MAX_CUSTOMER_PHONE_LEN + 1),
            ..guest()
        };
        assert!(matches!(
            details.validate(),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn page_clamps_out_of_range_values() {
        assert_eq!(Page::new(-5, 0), Page { skip: 0, limit: 1 });
        let capped = Page::new(10, 1_000);
        assert_eq!((capped.skip, capped.limit), (10, 100));
        assert_eq!(Page::default().limit, Page::MAX_LIMIT);
    }

    #[test]
    fn summary_counts_every_non_terminal_status_as_active() {
        let summary = OrdersSummary::from_counts([
            (FulfillmentStatus::Pending, 2),
            (FulfillmentStatus::Confirmed, 1),
            (FulfillmentStatus::OutForDelivery, 1),
            (FulfillmentStatus::Delivered, 5),
            (FulfillmentStatus::Cancelled, 3),
        ]);
        assert_eq!(summary.count(FulfillmentStatus::Pending), 2);
        assert_eq!(summary.count(FulfillmentStatus::Ready), 0);
        assert_eq!(summary.total_active(), 4);
    }
}
