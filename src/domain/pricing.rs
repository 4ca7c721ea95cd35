//! Server-side cart pricing. Prices always come from the catalog, never from
//! the client, and all arithmetic is exact integer cents.

use super::errors::DomainError;
use super::order::{CartItem, PricedCart, PricedLine};
use super::ports::CatalogLookup;

/// Current catalog entry for a dish, as seen by the pricing calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DishRef {
    pub dish_id: i32,
    pub unit_price_cents: i64,
    pub is_orderable: bool,
}

/// Price every cart item against the catalog and total the order.
///
/// Items are checked in cart order; the first invalid quantity or unavailable
/// dish aborts the whole computation.
pub fn compute_cart<C>(items: &[CartItem], catalog: &C) -> Result<PricedCart, DomainError>
where
    C: CatalogLookup + ?Sized,
{
    if items.is_empty() {
        return Err(DomainError::EmptyOrder);
    }

    let mut lines = Vec::with_capacity(items.len());
    let mut total_cents: i64 = 0;

    for item in items {
        if item.quantity < 1 {
            return Err(DomainError::InvalidQuantity(item.dish_id));
        }

        let dish = catalog
            .find_dish(item.dish_id)?
            .filter(|dish| dish.is_orderable)
            .ok_or(DomainError::DishUnavailable(item.dish_id))?;

        let line_total_cents = dish
            .unit_price_cents
            .checked_mul(i64::from(item.quantity))
            .ok_or_else(|| overflow(item.dish_id))?;
        total_cents = total_cents
            .checked_add(line_total_cents)
            .ok_or_else(|| overflow(item.dish_id))?;

        lines.push(PricedLine {
            dish_id: item.dish_id,
            quantity: item.quantity,
            unit_price_cents: dish.unit_price_cents,
            line_total_cents,
        });
    }

    Ok(PricedCart { lines, total_cents })
}

fn overflow(dish_id: i32) -> DomainError {
    DomainError::InvalidInput(format!("order total overflows at dish {dish_id}"))
}
