use chrono::Utc;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrdersSummary, Page};
use crate::domain::ports::OrderRepository;
use crate::domain::status::{FulfillmentStatus, PaymentStatus};
use crate::schema::{order_lines, orders};

use super::models::{NewOrderLineRow, NewOrderRow, OrderLineRow, OrderRow, PaymentChangeset};

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn load_lines(conn: &mut PgConnection, order: &OrderRow) -> QueryResult<Vec<OrderLineRow>> {
    OrderLineRow::belonging_to(order)
        .select(OrderLineRow::as_select())
        .order(order_lines::id.asc())
        .load(conn)
}

fn load_order(
    conn: &mut PgConnection,
    row: Option<OrderRow>,
) -> Result<Option<Order>, DomainError> {
    let Some(row) = row else {
        return Ok(None);
    };
    let lines = load_lines(conn, &row)?;
    row.into_order(lines).map(Some)
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Insert the order header
            let row = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    order_number: order.order_number,
                    customer_name: order.guest.customer_name,
                    customer_phone: order.guest.customer_phone,
                    customer_address: order.guest.customer_address,
                    is_delivery: order.guest.is_delivery,
                    status: FulfillmentStatus::Pending.as_str().to_string(),
                    payment_status: PaymentStatus::Pending.as_str().to_string(),
                    payment_method: order.guest.payment_method,
                    total_cents: order.total_cents,
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            // 2. Insert its lines; any failure rolls back the header too
            let new_lines: Vec<NewOrderLineRow> = order
                .lines
                .iter()
                .map(|l| NewOrderLineRow {
                    order_id: row.id,
                    dish_id: l.dish_id,
                    quantity: l.quantity,
                    unit_price_cents: l.unit_price_cents,
                    line_total_cents: l.line_total_cents,
                })
                .collect();
            let lines = diesel::insert_into(order_lines::table)
                .values(&new_lines)
                .returning(OrderLineRow::as_returning())
                .get_results(conn)?;

            row.into_order(lines)
        })
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = orders::table
            .filter(orders::order_number.eq(order_number))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        load_order(&mut conn, row)
    }

    fn update_status(
        &self,
        order_number: &str,
        status: FulfillmentStatus,
    ) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = diesel::update(orders::table.filter(orders::order_number.eq(order_number)))
                .set((
                    orders::status.eq(status.as_str()),
                    orders::updated_at.eq(Utc::now()),
                ))
                .returning(OrderRow::as_returning())
                .get_result(conn)
                .optional()?;

            load_order(conn, row)
        })
    }

    fn update_payment(
        &self,
        order_number: &str,
        status: PaymentStatus,
        method: Option<String>,
    ) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = diesel::update(orders::table.filter(orders::order_number.eq(order_number)))
                .set(&PaymentChangeset {
                    payment_status: status.as_str().to_string(),
                    payment_method: method,
                    updated_at: Utc::now(),
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)
                .optional()?;

            load_order(conn, row)
        })
    }

    fn list(
        &self,
        status: Option<FulfillmentStatus>,
        page: Page,
    ) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let mut query = orders::table
                .select(OrderRow::as_select())
                .order(orders::id.asc())
                .limit(page.limit)
                .offset(page.skip)
                .into_boxed();
            if let Some(status) = status {
                query = query.filter(orders::status.eq(status.as_str()));
            }
            let rows: Vec<OrderRow> = query.load(conn)?;

            let lines = OrderLineRow::belonging_to(&rows)
                .select(OrderLineRow::as_select())
                .order(order_lines::id.asc())
                .load(conn)?
                .grouped_by(&rows);

            rows.into_iter()
                .zip(lines)
                .map(|(row, lines)| row.into_order(lines))
                .collect()
        })
    }

    fn count_by_status(&self) -> Result<OrdersSummary, DomainError> {
        let mut conn = self.pool.get()?;

        let rows: Vec<(String, i64)> = orders::table
            .group_by(orders::status)
            .select((orders::status, diesel::dsl::count(orders::id)))
            .load(&mut conn)?;

        let mut counts = Vec::with_capacity(rows.len());
        for (token, count) in rows {
            let status = token.parse::<FulfillmentStatus>().map_err(|_| {
                DomainError::Storage(format!("unknown order status '{token}' in storage"))
            })?;
            counts.push((status, count));
        }
        Ok(OrdersSummary::from_counts(counts))
    }
}
