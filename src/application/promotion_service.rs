use chrono::Utc;

use crate::domain::errors::DomainError;
use crate::domain::order::Page;
use crate::domain::ports::{OrderRepository, PromotionRepository};
use crate::domain::promotion::{
    normalize_code, NewPromotion, Promotion, PromotionPatch, PromotionQuote, Redemption,
};

/// Quotes, redeems and administers promotion codes.
pub struct PromotionService<P, R> {
    promotions: P,
    orders: R,
}

impl<P: PromotionRepository, R: OrderRepository> PromotionService<P, R> {
    pub fn new(promotions: P, orders: R) -> Self {
        Self { promotions, orders }
    }

    fn find_active(&self, code: &str) -> Result<Promotion, DomainError> {
        self.promotions
            .find_active_by_code(&normalize_code(code))?
            .ok_or(DomainError::PromotionNotFound)
    }

    /// Quote a discount for `order_total_cents`. Usage counters are untouched,
    /// so repeating the call yields the same quote.
    pub fn apply(&self, code: &str, order_total_cents: i64) -> Result<PromotionQuote, DomainError> {
        let quote = self
            .find_active(code)?
            .quote(order_total_cents, Utc::now())?;
        log::debug!(
            "Quoted {} against {} cents: -{} cents",
            quote.promotion_code,
            order_total_cents,
            quote.discount_cents
        );
        Ok(quote)
    }

    /// Existence, expiry and usage-limit checks only. Storage failures still
    /// propagate; an unusable code is simply `false`.
    pub fn validate(&self, code: &str) -> Result<bool, DomainError> {
        match self.find_active(code) {
            Ok(promotion) => Ok(promotion.check_usable(Utc::now()).is_ok()),
            Err(DomainError::PromotionNotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Consume the promotion for a placed order. The order's stored total is
    /// the basis for the discount. Redeeming the same code for the same order
    /// again returns the original redemption without counting another use.
    pub fn redeem(&self, code: &str, order_number: &str) -> Result<Redemption, DomainError> {
        let order = self
            .orders
            .find_by_number(order_number)?
            .ok_or(DomainError::OrderNotFound)?;
        let promotion = self.find_active(code)?;

        let existing = self
            .promotions
            .find_redemption(promotion.id, order_number)?;
        if let Some(existing) = existing {
            return Ok(existing);
        }

        let quote = promotion.quote(order.total_cents, Utc::now())?;
        let redemption = self
            .promotions
            .record_redemption(promotion.id, order_number, &quote)?;
        log::info!(
            "Promotion {} redeemed for order {} ({} cents off)",
            promotion.code,
            order_number,
            redemption.quote.discount_cents
        );
        Ok(redemption)
    }

    // ── Administration ───────────────────────────────────────────────────────

    pub fn create(&self, promotion: NewPromotion) -> Result<Promotion, DomainError> {
        let created = self.promotions.create(promotion.normalized()?)?;
        log::info!("Created promotion {}", created.code);
        Ok(created)
    }

    pub fn list(&self, active_only: bool, page: Page) -> Result<Vec<Promotion>, DomainError> {
        self.promotions.list(active_only, page)
    }

    pub fn get(&self, id: i32) -> Result<Promotion, DomainError> {
        self.promotions
            .find_by_id(id)?
            .ok_or(DomainError::PromotionNotFound)
    }

    pub fn update(&self, id: i32, patch: PromotionPatch) -> Result<Promotion, DomainError> {
        patch.validate()?;
        self.promotions
            .update(id, patch)?
            .ok_or(DomainError::PromotionNotFound)
    }

    /// Soft delete: the record stays, but the code stops matching.
    pub fn deactivate(&self, id: i32) -> Result<Promotion, DomainError> {
        let promotion = self.update(id, PromotionPatch::deactivate())?;
        log::info!("Deactivated promotion {}", promotion.code);
        Ok(promotion)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::application::order_service::OrderService;
    use crate::domain::order::{CartItem, GuestDetails};
    use crate::infrastructure::memory::{
        InMemoryCatalog, InMemoryOrderRepository, InMemoryPromotionRepository,
    };

    struct Fixture {
        promotions: Arc<InMemoryPromotionRepository>,
        orders: OrderService<Arc<InMemoryOrderRepository>, InMemoryCatalog>,
        service: PromotionService<Arc<InMemoryPromotionRepository>, Arc<InMemoryOrderRepository>>,
    }

    fn fixture() -> Fixture {
        let promotions = Arc::new(InMemoryPromotionRepository::new());
        let order_repo = Arc::new(InMemoryOrderRepository::new());
        let catalog = InMemoryCatalog::new().with_dish(1, 1000, true);
        Fixture {
            service: PromotionService::new(promotions.clone(), order_repo.clone()),
            orders: OrderService::new(order_repo, catalog),
            promotions,
        }
    }

    fn new_promotion(code: &str) -> NewPromotion {
        NewPromotion {
            code: code.to_string(),
            description: None,
            discount_percent: 10,
            min_order_amount_cents: 0,
            max_discount_cents: None,
            expires_at: None,
            usage_limit: None,
        }
    }

    fn stored(code: &str) -> Promotion {
        Promotion {
            id: 50,
            code: code.to_string(),
            description: None,
            discount_percent: 10,
            min_order_amount_cents: 0,
            max_discount_cents: None,
            is_active: true,
            expires_at: None,
            usage_limit: None,
            times_used: 0,
            created_at: Utc::now(),
        }
    }

    fn place_order(fx: &Fixture, quantity: i32) -> String {
        fx.orders
            .create_guest_order(
                &[CartItem {
                    dish_id: 1,
                    quantity,
                }],
                GuestDetails {
                    customer_name: "Sam".to_string(),
                    customer_phone: "555-0123".to_string(),
                    customer_address: None,
                    is_delivery: false,
                    payment_method: None,
                },
            )
            .unwrap()
            .order_number
    }

    #[test]
    fn apply_matches_code_case_insensitively() {
        let fx = fixture();
        fx.service.create(new_promotion("Save10")).unwrap();

        let quote = fx.service.apply("save10", 1000).unwrap();

        assert_eq!(quote.promotion_code, "SAVE10");
        assert_eq!(quote.discount_cents, 100);
        assert_eq!(quote.final_total_cents, 900);
    }

    #[test]
    fn apply_is_a_pure_quote() {
        let fx = fixture();
        let created = fx
            .service
            .create(NewPromotion {
                usage_limit: Some(1),
                ..new_promotion("ONCE")
            })
            .unwrap();

        let first = fx.service.apply("ONCE", 2500).unwrap();
        let second = fx.service.apply("ONCE", 2500).unwrap();

        assert_eq!(first, second);
        assert_eq!(fx.service.get(created.id).unwrap().times_used, 0);
    }

    #[test]
    fn apply_unknown_code_is_not_found() {
        let fx = fixture();
        assert_eq!(
            fx.service.apply("NOPE", 1000),
            Err(DomainError::PromotionNotFound)
        );
    }

    #[test]
    fn apply_reports_each_rule() {
        let fx = fixture();
        fx.promotions.insert(Promotion {
            expires_at: Some(Utc::now() - Duration::hours(1)),
            ..stored("OLD")
        });
        fx.promotions.insert(Promotion {
            id: 51,
            usage_limit: Some(1),
            times_used: 1,
            ..stored("USEDUP")
        });
        fx.promotions.insert(Promotion {
            id: 52,
            min_order_amount_cents: 500,
            ..stored("BIGSPEND")
        });

        assert_eq!(
            fx.service.apply("OLD", 1000),
            Err(DomainError::PromotionExpired)
        );
        assert_eq!(
            fx.service.apply("USEDUP", 1000),
            Err(DomainError::PromotionLimitReached)
        );
        assert_eq!(
            fx.service.apply("BIGSPEND", 499),
            Err(DomainError::MinimumOrderNotMet {
                required_cents: 500,
            })
        );
        assert!(fx.service.apply("BIGSPEND", 500).is_ok());
    }

    #[test]
    fn validate_checks_existence_expiry_and_limit_only() {
        let fx = fixture();
        fx.promotions.insert(Promotion {
            min_order_amount_cents: 1_000_000,
            ..stored("VALID")
        });
        fx.promotions.insert(Promotion {
            id: 51,
            usage_limit: Some(2),
            times_used: 2,
            ..stored("SPENT")
        });

        assert_eq!(fx.service.validate("valid"), Ok(true));
        assert_eq!(fx.service.validate("SPENT"), Ok(false));
        assert_eq!(fx.service.validate("MISSING"), Ok(false));
    }

    #[test]
    fn deactivated_promotion_no_longer_applies() {
        let fx = fixture();
        let created = fx.service.create(new_promotion("BYE")).unwrap();

        let deactivated = fx.service.deactivate(created.id).unwrap();

        assert!(!deactivated.is_active);
        assert_eq!(
            fx.service.apply("BYE", 1000),
            Err(DomainError::PromotionNotFound)
        );
        assert_eq!(fx.service.validate("BYE"), Ok(false));
        assert_eq!(fx.service.list(true, Page::default()).unwrap(), vec![]);
        assert_eq!(fx.service.list(false, Page::default()).unwrap().len(), 1);
    }

    #[test]
    fn create_rejects_duplicates_and_bad_bounds() {
        let fx = fixture();
        fx.service.create(new_promotion("DUPE")).unwrap();

        assert_eq!(
            fx.service.create(new_promotion("dupe")),
            Err(DomainError::DuplicatePromotionCode("DUPE".to_string()))
        );
        assert!(matches!(
            fx.service.create(NewPromotion {
                discount_percent: 0,
                ..new_promotion("ZERO")
            }),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn update_validates_and_reports_missing() {
        let fx = fixture();
        let created = fx.service.create(new_promotion("EDIT")).unwrap();

        let updated = fx
            .service
            .update(
                created.id,
                PromotionPatch {
                    max_discount_cents: Some(50),
                    ..PromotionPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.max_discount_cents, Some(50));
        let capped = fx.service.apply("EDIT", 10_000).unwrap();
        assert_eq!(capped.discount_cents, 50);

        assert!(matches!(
            fx.service.update(
                created.id,
                PromotionPatch {
                    usage_limit: Some(0),
                    ..PromotionPatch::default()
                }
            ),
            Err(DomainError::InvalidInput(_))
        ));
        assert_eq!(
            fx.service.update(999, PromotionPatch::deactivate()),
            Err(DomainError::PromotionNotFound)
        );
        assert_eq!(fx.service.get(999), Err(DomainError::PromotionNotFound));
    }

    #[test]
    fn redeem_uses_stored_order_total_and_counts_once() {
        let fx = fixture();
        let created = fx
            .service
            .create(NewPromotion {
                usage_limit: Some(2),
                ..new_promotion("TWICE")
            })
            .unwrap();
        let order_number = place_order(&fx, 3);

        let first = fx.service.redeem("twice", &order_number).unwrap();
        let repeat = fx.service.redeem("TWICE", &order_number).unwrap();

        assert_eq!(first, repeat);
        assert_eq!(first.quote.original_total_cents, 3000);
        assert_eq!(first.quote.discount_cents, 300);
        assert_eq!(first.quote.final_total_cents, 2700);
        assert_eq!(fx.service.get(created.id).unwrap().times_used, 1);
    }

    #[test]
    fn redeem_stops_at_usage_limit() {
        let fx = fixture();
        fx.service
            .create(NewPromotion {
                usage_limit: Some(1),
                ..new_promotion("SINGLE")
            })
            .unwrap();
        let first_order = place_order(&fx, 1);
        let second_order = place_order(&fx, 1);

        fx.service.redeem("SINGLE", &first_order).unwrap();

        assert_eq!(
            fx.service.redeem("SINGLE", &second_order),
            Err(DomainError::PromotionLimitReached)
        );
        // The order that already redeemed it still gets its redemption back.
        assert!(fx.service.redeem("SINGLE", &first_order).is_ok());
        assert_eq!(fx.service.validate("SINGLE"), Ok(false));
    }

    #[test]
    fn redeem_requires_known_order_and_code() {
        let fx = fixture();
        fx.service.create(new_promotion("REAL")).unwrap();
        let order_number = place_order(&fx, 1);

        assert_eq!(
            fx.service.redeem("REAL", "missing"),
            Err(DomainError::OrderNotFound)
        );
        assert_eq!(
            fx.service.redeem("FAKE", &order_number),
            Err(DomainError::PromotionNotFound)
        );
    }
}
