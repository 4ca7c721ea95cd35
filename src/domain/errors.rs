use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    // ── Validation ───────────────────────────────────────────────────────────
    #[error("Quantity must be at least 1 for dish {0}")]
    InvalidQuantity(i32),
    #[error("An order needs at least one item")]
    EmptyOrder,
    #[error("Invalid status '{0}'")]
    InvalidStatus(String),
    #[error("Invalid payment status '{0}'")]
    InvalidPaymentStatus(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ── Not found ────────────────────────────────────────────────────────────
    #[error("Dish {0} not found")]
    DishUnavailable(i32),
    #[error("Order not found")]
    OrderNotFound,
    #[error("Promotion code not found")]
    PromotionNotFound,

    // ── Business rules ───────────────────────────────────────────────────────
    #[error("Promotion code has expired")]
    PromotionExpired,
    #[error("Promotion code usage limit reached")]
    PromotionLimitReached,
    #[error("Minimum order amount not met (required {required_cents} cents)")]
    MinimumOrderNotMet { required_cents: i64 },
    #[error("Promotion code '{0}' already exists")]
    DuplicatePromotionCode(String),

    // ── Storage ──────────────────────────────────────────────────────────────
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Storage error: {0}")]
    Storage(String),
}
