//! Promotion records and the discount rules applied to an order total.

use chrono::{DateTime, Utc};

use super::errors::DomainError;
use super::order::limit_len;

pub const MIN_CODE_LEN: usize = 3;
pub const MAX_CODE_LEN: usize = 20;
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Codes are matched case-insensitively by uppercasing before lookup.
pub fn normalize_code(code: &str) -> String {
    code.to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
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

/// Result of pricing an order total against a promotion. Producing a quote
/// never touches `times_used`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionQuote {
    pub promotion_code: String,
    pub discount_percent: i32,
    pub discount_cents: i64,
    pub original_total_cents: i64,
    pub final_total_cents: i64,
}

/// A quote that has been consumed against a specific order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redemption {
    pub promotion_id: i32,
    pub order_number: String,
    pub quote: PromotionQuote,
    pub redeemed_at: DateTime<Utc>,
}

impl Promotion {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }

    pub fn is_limit_reached(&self) -> bool {
        self.usage_limit
            .is_some_and(|limit| self.times_used >= limit)
    }

    /// Existence, expiry and usage checks, without looking at an order total.
    pub fn check_usable(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.is_active {
            return Err(DomainError::PromotionNotFound);
        }
        if self.is_expired(now) {
            return Err(DomainError::PromotionExpired);
        }
        if self.is_limit_reached() {
            return Err(DomainError::PromotionLimitReached);
        }
        Ok(())
    }

    /// Quote the discount for `order_total_cents`.
    ///
    /// The percentage discount is floored, then clamped to
    /// `max_discount_cents` when a cap is set.
    pub fn quote(
        &self,
        order_total_cents: i64,
        now: DateTime<Utc>,
    ) -> Result<PromotionQuote, DomainError> {
        self.check_usable(now)?;
        if order_total_cents < 0 {
            return Err(invalid("order_total_cents must not be negative"));
        }
        if order_total_cents < self.min_order_amount_cents {
            return Err(DomainError::MinimumOrderNotMet {
                required_cents: self.min_order_amount_cents,
            });
        }

        let percent = i64::from(self.discount_percent);
        let mut discount_cents = match order_total_cents.checked_mul(percent) {
            Some(scaled) => scaled / 100,
            None => return Err(invalid("order_total_cents is too large")),
        };
        if let Some(cap) = self.max_discount_cents {
            discount_cents = discount_cents.min(cap);
        }

        Ok(PromotionQuote {
            promotion_code: self.code.clone(),
            discount_percent: self.discount_percent,
            discount_cents,
            original_total_cents: order_total_cents,
            final_total_cents: order_total_cents - discount_cents,
        })
    }
}

// ── Administration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPromotion {
    pub code: String,
    pub description: Option<String>,
    pub discount_percent: i32,
    pub min_order_amount_cents: i64,
    pub max_discount_cents: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
}

impl NewPromotion {
    /// Validate the bounds and return the promotion with its code normalized.
    pub fn normalized(self) -> Result<Self, DomainError> {
        let code = normalize_code(&self.code);
        let code_len = code.chars().count();
        if !(MIN_CODE_LEN..=MAX_CODE_LEN).contains(&code_len) {
            return Err(DomainError::InvalidInput(format!(
                "code must be between {MIN_CODE_LEN} and {MAX_CODE_LEN} characters"
            )));
        }
        check_bounds(
            self.description.as_deref(),
            Some(self.discount_percent),
            Some(self.min_order_amount_cents),
            self.max_discount_cents,
            self.usage_limit,
        )?;
        Ok(Self { code, ..self })
    }
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionPatch {
    pub description: Option<String>,
    pub discount_percent: Option<i32>,
    pub min_order_amount_cents: Option<i64>,
    pub max_discount_cents: Option<i64>,
    pub is_active: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
}

impl PromotionPatch {
    pub fn deactivate() -> Self {
        Self {
            is_active: Some(false),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        check_bounds(
            self.description.as_deref(),
            self.discount_percent,
            self.min_order_amount_cents,
            self.max_discount_cents,
            self.usage_limit,
        )
    }
}

fn check_bounds(
    description: Option<&str>,
    discount_percent: Option<i32>,
    min_order_amount_cents: Option<i64>,
    max_discount_cents: Option<i64>,
    usage_limit: Option<i32>,
) -> Result<(), DomainError> {
    if let Some(description) = description {
        limit_len("description", description, MAX_DESCRIPTION_LEN)?;
    }
    if discount_percent.is_some_and(|p| !(1..=100).contains(&p)) {
        return Err(invalid("discount_percent must be between 1 and 100"));
    }
    if min_order_amount_cents.is_some_and(|m| m < 0) {
        return Err(invalid("min_order_amount_cents must not be negative"));
    }
    if max_discount_cents.is_some_and(|m| m < 0) {
        return Err(invalid("max_discount_cents must not be negative"));
    }
    if usage_limit.is_some_and(|l| l < 1) {
        return Err(invalid("usage_limit must be at least 1"));
    }
    Ok(())
}

fn invalid(msg: &str) -> DomainError {
    DomainError::InvalidInput(msg.to_string())
}
