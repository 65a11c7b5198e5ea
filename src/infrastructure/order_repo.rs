use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::ports::OrderRepository;
use crate::schema::{order_items, orders};

use super::models::{NewOrderItemRow, NewOrderRow, OrderChangeset, OrderItemRow, OrderRow};

/// Loads the items of `rows` in one query and rebuilds each aggregate.
fn attach_items(conn: &mut PgConnection, rows: Vec<OrderRow>) -> Result<Vec<Order>, DomainError> {
    let items: Vec<OrderItemRow> = OrderItemRow::belonging_to(&rows)
        .select(OrderItemRow::as_select())
        .order(order_items::id.asc())
        .load(conn)?;

    let grouped = items.grouped_by(&rows);
    rows.into_iter()
        .zip(grouped)
        .map(|(row, items)| row.into_order(items))
        .collect()
}

fn load_order(conn: &mut PgConnection, id: i64) -> Result<Order, DomainError> {
    let row: OrderRow = orders::table
        .filter(orders::id.eq(id))
        .filter(orders::deleted_at.is_null())
        .select(OrderRow::as_select())
        .first(conn)
        .optional()?
        .ok_or(DomainError::OrderNotFound)?;

    let items = OrderItemRow::belonging_to(&row)
        .select(OrderItemRow::as_select())
        .order(order_items::id.asc())
        .load(conn)?;

    row.into_order(items)
}

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: Order) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Insert the order
            let row: OrderRow = diesel::insert_into(orders::table)
                .values(NewOrderRow::from(&order))
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            // 2. Insert its items
            let new_items: Vec<NewOrderItemRow> = order
                .items()
                .iter()
                .map(|item| NewOrderItemRow::for_order(row.id, item))
                .collect();
            let mut items: Vec<OrderItemRow> = diesel::insert_into(order_items::table)
                .values(&new_items)
                .returning(OrderItemRow::as_returning())
                .get_results(conn)?;
            items.sort_by_key(|item| item.id);

            row.into_order(items)
        })
    }

    fn get_by_id(&self, id: i64) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;
        load_order(&mut conn, id)
    }

    fn get_by_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let rows = orders::table
                .filter(orders::user_id.eq(user_id))
                .filter(orders::deleted_at.is_null())
                .select(OrderRow::as_select())
                .order(orders::id.asc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            attach_items(conn, rows)
        })
    }

    fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let rows = orders::table
                .filter(orders::deleted_at.is_null())
                .select(OrderRow::as_select())
                .order(orders::id.asc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            attach_items(conn, rows)
        })
    }

    fn update(&self, order: Order) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;
        let id = order.id();

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Order columns
            let affected = diesel::update(
                orders::table
                    .filter(orders::id.eq(id))
                    .filter(orders::deleted_at.is_null()),
            )
            .set(OrderChangeset::from(&order))
            .execute(conn)?;
            if affected == 0 {
                return Err(DomainError::OrderNotFound);
            }

            // 2. Drop items that are no longer part of the order
            let kept: Vec<i64> = order
                .items()
                .iter()
                .map(|item| item.id)
                .filter(|item_id| *item_id != 0)
                .collect();
            diesel::delete(
                order_items::table
                    .filter(order_items::order_id.eq(id))
                    .filter(order_items::id.ne_all(kept)),
            )
            .execute(conn)?;

            // 3. Insert items added since the last save
            let added: Vec<NewOrderItemRow> = order
                .items()
                .iter()
                .filter(|item| item.id == 0)
                .map(|item| NewOrderItemRow::for_order(id, item))
                .collect();
            if !added.is_empty() {
                diesel::insert_into(order_items::table)
                    .values(&added)
                    .execute(conn)?;
            }

            if order.is_deleted() {
                return Ok(order);
            }
            load_order(conn, id)
        })
    }

    fn delete(&self, id: i64) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let now = Utc::now();

        let affected = diesel::update(
            orders::table
                .filter(orders::id.eq(id))
                .filter(orders::deleted_at.is_null()),
        )
        .set((orders::deleted_at.eq(Some(now)), orders::updated_at.eq(now)))
        .execute(&mut conn)?;

        if affected == 0 {
            return Err(DomainError::OrderNotFound);
        }
        Ok(())
    }

    fn count(&self) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;

        Ok(orders::table
            .filter(orders::deleted_at.is_null())
            .count()
            .get_result(&mut conn)?)
    }
}
