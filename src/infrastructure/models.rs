use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderItem, OrderStatus};
use crate::domain::user::User;
use crate::schema::{order_items, orders, users};

// ── Users ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub password: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub struct UserChangeset<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub password: &'a str,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User::restore(
            row.id,
            row.email,
            row.name,
            row.password,
            row.created_at,
            row.updated_at,
            row.deleted_at,
        )
    }
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            email: user.email(),
            name: user.name(),
            password: user.password(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

impl<'a> From<&'a User> for UserChangeset<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            email: user.email(),
            name: user.name(),
            password: user.password(),
            updated_at: user.updated_at(),
            deleted_at: user.deleted_at(),
        }
    }
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: i64,
    pub user_id: i64,
    pub status: String,
    pub total_amount: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow<'a> {
    pub user_id: i64,
    pub status: &'a str,
    pub total_amount: &'a BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
#[diesel(treat_none_as_null = true)]
pub struct OrderChangeset<'a> {
    pub status: &'a str,
    pub total_amount: &'a BigDecimal,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow<'a> {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price: &'a BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            price: row.price,
            created_at: row.created_at,
        }
    }
}

impl<'a> NewOrderItemRow<'a> {
    pub fn for_order(order_id: i64, item: &'a OrderItem) -> Self {
        Self {
            order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            price: &item.price,
            created_at: item.created_at,
        }
    }
}

impl<'a> From<&'a Order> for NewOrderRow<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            user_id: order.user_id(),
            status: order.status().as_str(),
            total_amount: order.total_amount(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        }
    }
}

impl<'a> From<&'a Order> for OrderChangeset<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            status: order.status().as_str(),
            total_amount: order.total_amount(),
            updated_at: order.updated_at(),
            deleted_at: order.deleted_at(),
        }
    }
}

impl OrderRow {
    /// Rebuilds the aggregate. An unknown status string means the row was
    /// written by something other than this service.
    pub fn into_order(self, items: Vec<OrderItemRow>) -> Result<Order, DomainError> {
        let status = self
            .status
            .parse::<OrderStatus>()
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok(Order::restore(
            self.id,
            self.user_id,
            status,
            items.into_iter().map(OrderItem::from).collect(),
            self.created_at,
            self.updated_at,
            self.deleted_at,
        ))
    }
}
