use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::Page;
use crate::domain::ports::PromotionRepository;
use crate::domain::promotion::{NewPromotion, Promotion, PromotionPatch, PromotionQuote, Redemption};
use crate::schema::{promotion_redemptions, promotions};

use super::models::{
    NewPromotionRow, NewRedemptionRow, PromotionChangeset, PromotionRow, RedemptionRow,
};

pub struct DieselPromotionRepository {
    pool: DbPool,
}

impl DieselPromotionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn find_redemption_row(
    conn: &mut PgConnection,
    promotion_id: i32,
    order_number: &str,
) -> QueryResult<Option<RedemptionRow>> {
    promotion_redemptions::table
        .filter(promotion_redemptions::promotion_id.eq(promotion_id))
        .filter(promotion_redemptions::order_number.eq(order_number))
        .select(RedemptionRow::as_select())
        .first(conn)
        .optional()
}

impl PromotionRepository for DieselPromotionRepository {
    fn create(&self, promotion: NewPromotion) -> Result<Promotion, DomainError> {
        let mut conn = self.pool.get()?;
        let code = promotion.code.clone();

        diesel::insert_into(promotions::table)
            .values(&NewPromotionRow {
                code: promotion.code,
                description: promotion.description,
                discount_percent: promotion.discount_percent,
                min_order_amount_cents: promotion.min_order_amount_cents,
                max_discount_cents: promotion.max_discount_cents,
                expires_at: promotion.expires_at,
                usage_limit: promotion.usage_limit,
            })
            .returning(PromotionRow::as_returning())
            .get_result(&mut conn)
            .map(Promotion::from)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    DomainError::DuplicatePromotionCode(code)
                }
                other => other.into(),
            })
    }

    fn find_by_id(&self, id: i32) -> Result<Option<Promotion>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = promotions::table
            .find(id)
            .select(PromotionRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Promotion::from))
    }

    fn find_active_by_code(&self, code: &str) -> Result<Option<Promotion>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = promotions::table
            .filter(promotions::code.eq(code))
            .filter(promotions::is_active.eq(true))
            .select(PromotionRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Promotion::from))
    }

    fn list(&self, active_only: bool, page: Page) -> Result<Vec<Promotion>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = promotions::table
            .select(PromotionRow::as_select())
            .order(promotions::id.asc())
            .limit(page.limit)
            .offset(page.skip)
            .into_boxed();
        if active_only {
            query = query.filter(promotions::is_active.eq(true));
        }
        let rows: Vec<PromotionRow> = query.load(&mut conn)?;

        Ok(rows.into_iter().map(Promotion::from).collect())
    }

    fn update(&self, id: i32, patch: PromotionPatch) -> Result<Option<Promotion>, DomainError> {
        if patch.is_empty() {
            // Diesel refuses an empty changeset.
            return self.find_by_id(id);
        }
        let mut conn = self.pool.get()?;

        let row = diesel::update(promotions::table.find(id))
            .set(&PromotionChangeset::from(patch))
            .returning(PromotionRow::as_returning())
            .get_result(&mut conn)
            .optional()?;

        Ok(row.map(Promotion::from))
    }

    fn find_redemption(
        &self,
        promotion_id: i32,
        order_number: &str,
    ) -> Result<Option<Redemption>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = find_redemption_row(&mut conn, promotion_id, order_number)?;
        Ok(row.map(Redemption::from))
    }

    fn record_redemption(
        &self,
        promotion_id: i32,
        order_number: &str,
        quote: &PromotionQuote,
    ) -> Result<Redemption, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Claim the (promotion, order) pair
            let inserted = diesel::insert_into(promotion_redemptions::table)
                .values(&NewRedemptionRow::new(promotion_id, order_number, quote))
                .on_conflict((
                    promotion_redemptions::promotion_id,
                    promotion_redemptions::order_number,
                ))
                .do_nothing()
                .returning(RedemptionRow::as_returning())
                .get_result(conn)
                .optional()?;

            let Some(row) = inserted else {
                // A concurrent request already redeemed this order.
                return find_redemption_row(conn, promotion_id, order_number)?
                    .map(Redemption::from)
                    .ok_or_else(|| {
                        DomainError::Storage("redemption vanished after conflict".to_string())
                    });
            };

            // 2. Check-and-increment the usage counter in one statement
            let under_limit = promotions::usage_limit
                .is_null()
                .or(promotions::times_used.lt(promotions::usage_limit.assume_not_null()));
            let claimed = diesel::update(promotions::table.find(promotion_id).filter(under_limit))
                .set(promotions::times_used.eq(promotions::times_used + 1))
                .execute(conn)?;

            if claimed == 0 {
                return Err(DomainError::PromotionLimitReached);
            }

            Ok(Redemption::from(row))
        })
    }
}
