use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Lifecycle of an order.
///
/// ```text
/// pending -> confirmed -> shipped -> delivered
///    \___________\____________\-----> cancelled
/// ```
///
/// `delivered` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status '{0}'")]
pub struct UnknownOrderStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(UnknownOrderStatus(other.to_string())),
        }
    }
}

/// A line of an order. Owned exclusively by its [`Order`].
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    /// `0` until persisted.
    pub id: i64,
    /// Back-reference to the owning order; `0` until persisted.
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    pub fn new(product_id: i64, quantity: i32, price: BigDecimal) -> Self {
        Self {
            id: 0,
            order_id: 0,
            product_id,
            quantity,
            price,
            created_at: Utc::now(),
        }
    }

    pub fn subtotal(&self) -> BigDecimal {
        &self.price * BigDecimal::from(self.quantity)
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.quantity <= 0 {
            return Err(DomainError::InvalidItemQuantity);
        }
        if self.price < BigDecimal::zero() {
            return Err(DomainError::InvalidItemPrice);
        }
        Ok(())
    }
}

/// Order aggregate root.
///
/// Fields are private so that `total_amount` can only change through item
/// mutations and `status` only along the transition graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: i64,
    user_id: i64,
    status: OrderStatus,
    items: Vec<OrderItem>,
    total_amount: BigDecimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Creates a `pending` order for `user_id`.
    pub fn new(user_id: i64, items: Vec<OrderItem>) -> Result<Self, DomainError> {
        if user_id <= 0 {
            return Err(DomainError::InvalidUserId);
        }
        if items.is_empty() {
            return Err(DomainError::EmptyOrder);
        }
        for item in &items {
            item.validate()?;
        }

        let now = Utc::now();
        let mut order = Self {
            id: 0,
            user_id,
            status: OrderStatus::Pending,
            items,
            total_amount: BigDecimal::zero(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        order.calculate_total();
        Ok(order)
    }

    /// Rebuilds an order from storage. The total is recomputed from `items`
    /// rather than trusted from the stored column.
    pub fn restore(
        id: i64,
        user_id: i64,
        status: OrderStatus,
        items: Vec<OrderItem>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        let mut order = Self {
            id,
            user_id,
            status,
            items,
            total_amount: BigDecimal::zero(),
            created_at,
            updated_at,
            deleted_at,
        };
        order.calculate_total();
        order
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total_amount(&self) -> &BigDecimal {
        &self.total_amount
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Assigns the storage identity to the order and back-references it
    /// from every item.
    pub(crate) fn assign_id(&mut self, id: i64) {
        self.id = id;
        for item in &mut self.items {
            item.order_id = id;
        }
    }

    pub(crate) fn items_mut(&mut self) -> &mut [OrderItem] {
        &mut self.items
    }

    pub fn add_item(
        &mut self,
        product_id: i64,
        quantity: i32,
        price: BigDecimal,
    ) -> Result<(), DomainError> {
        self.ensure_modifiable()?;

        let mut item = OrderItem::new(product_id, quantity, price);
        item.validate()?;
        item.order_id = self.id;

        self.items.push(item);
        self.calculate_total();
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn remove_item(&mut self, item_id: i64) -> Result<(), DomainError> {
        self.ensure_modifiable()?;

        let position = self
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or(DomainError::OrderItemNotFound)?;

        self.items.remove(position);
        self.calculate_total();
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn confirm(&mut self) -> Result<(), DomainError> {
        self.advance(OrderStatus::Pending, OrderStatus::Confirmed)
    }

    pub fn ship(&mut self) -> Result<(), DomainError> {
        self.advance(OrderStatus::Confirmed, OrderStatus::Shipped)
    }

    pub fn deliver(&mut self) -> Result<(), DomainError> {
        self.advance(OrderStatus::Shipped, OrderStatus::Delivered)
    }

    /// Cancels any order that has not been delivered yet. Cancelling a
    /// cancelled order succeeds again.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        if self.status == OrderStatus::Delivered {
            return Err(DomainError::CannotCancelDeliveredOrder);
        }
        self.status = OrderStatus::Cancelled;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn mark_as_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    fn advance(&mut self, from: OrderStatus, to: OrderStatus) -> Result<(), DomainError> {
        if self.status != from {
            return Err(DomainError::InvalidOrderStatusTransition);
        }
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn ensure_modifiable(&self) -> Result<(), DomainError> {
        if self.status != OrderStatus::Pending {
            return Err(DomainError::OrderNotModifiable);
        }
        Ok(())
    }

    fn calculate_total(&mut self) {
        self.total_amount = self.items.iter().map(OrderItem::subtotal).sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).expect("valid decimal")
    }

    fn item(product_id: i64, quantity: i32, unit_price: &str) -> OrderItem {
        OrderItem::new(product_id, quantity, price(unit_price))
    }

    fn pending_order() -> Order {
        Order::new(42, vec![item(7, 2, "10.0")]).expect("valid order")
    }

    fn expected_total(order: &Order) -> BigDecimal {
        order
            .items()
            .iter()
            .map(|i| &i.price * BigDecimal::from(i.quantity))
            .sum()
    }

    // ── Construction ─────────────────────────────────────────────────────────

    #[test]
    fn new_order_starts_pending_with_computed_total() {
        let order = Order::new(42, vec![item(7, 2, "10.0"), item(8, 3, "1.50")]).unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.user_id(), 42);
        assert_eq!(order.id(), 0);
        assert_eq!(order.total_amount(), &price("24.50"));
        assert_eq!(order.created_at(), order.updated_at());
        assert!(!order.is_deleted());
    }

    #[test]
    fn new_order_rejects_zero_user_id() {
        let err = Order::new(0, vec![item(7, 1, "1.00")]).unwrap_err();
        assert_eq!(err, DomainError::InvalidUserId);
    }

    #[test]
    fn new_order_rejects_negative_user_id() {
        let err = Order::new(-3, vec![item(7, 1, "1.00")]).unwrap_err();
        assert_eq!(err, DomainError::InvalidUserId);
    }

    #[test]
    fn new_order_rejects_empty_items() {
        let err = Order::new(42, vec![]).unwrap_err();
        assert_eq!(err, DomainError::EmptyOrder);
    }

    #[test]
    fn user_id_is_checked_before_items() {
        let err = Order::new(0, vec![]).unwrap_err();
        assert_eq!(err, DomainError::InvalidUserId);
    }

    #[test]
    fn new_order_rejects_non_positive_quantity() {
        let err = Order::new(42, vec![item(7, 0, "1.00")]).unwrap_err();
        assert_eq!(err, DomainError::InvalidItemQuantity);
    }

    #[test]
    fn new_order_rejects_negative_price() {
        let err = Order::new(42, vec![item(7, 1, "-0.01")]).unwrap_err();
        assert_eq!(err, DomainError::InvalidItemPrice);
    }

    #[test]
    fn zero_price_items_are_allowed() {
        let order = Order::new(42, vec![item(7, 4, "0")]).unwrap();
        assert_eq!(order.total_amount(), &BigDecimal::zero());
    }

    #[test]
    fn restore_recomputes_total_from_items() {
        let now = Utc::now();
        let mut stored = item(7, 3, "2.00");
        stored.id = 11;
        stored.order_id = 5;

        let order = Order::restore(5, 42, OrderStatus::Shipped, vec![stored], now, now, None);

        assert_eq!(order.id(), 5);
        assert_eq!(order.status(), OrderStatus::Shipped);
        assert_eq!(order.total_amount(), &price("6.00"));
    }

    // ── Item mutation ────────────────────────────────────────────────────────

    #[test]
    fn add_item_recomputes_total_and_bumps_updated_at() {
        let mut order = pending_order();
        let before = order.updated_at();

        order.add_item(9, 1, price("5.0")).unwrap();

        assert_eq!(order.items().len(), 2);
        assert_eq!(order.total_amount(), &price("25.0"));
        assert!(order.updated_at() >= before);
    }

    #[test]
    fn add_item_validates_the_new_item() {
        let mut order = pending_order();

        assert_eq!(
            order.add_item(9, -1, price("5.0")).unwrap_err(),
            DomainError::InvalidItemQuantity
        );
        assert_eq!(order.items().len(), 1);
        assert_eq!(order.total_amount(), &price("20.0"));
    }

    #[test]
    fn remove_item_recomputes_total() {
        let mut order = pending_order();
        order.add_item(9, 1, price("5.0")).unwrap();
        order.items_mut()[0].id = 100;
        order.items_mut()[1].id = 101;

        order.remove_item(100).unwrap();

        assert_eq!(order.items().len(), 1);
        assert_eq!(order.items()[0].id, 101);
        assert_eq!(order.total_amount(), &price("5.0"));
    }

    #[test]
    fn remove_unknown_item_leaves_order_untouched() {
        let mut order = pending_order();
        order.items_mut()[0].id = 100;
        let snapshot = order.clone();

        let err = order.remove_item(999).unwrap_err();

        assert_eq!(err, DomainError::OrderItemNotFound);
        assert_eq!(order, snapshot);
    }

    #[test]
    fn items_are_frozen_outside_pending() {
        let mut order = pending_order();
        order.items_mut()[0].id = 100;
        order.confirm().unwrap();

        assert_eq!(
            order.add_item(9, 1, price("5.0")).unwrap_err(),
            DomainError::OrderNotModifiable
        );
        assert_eq!(
            order.remove_item(100).unwrap_err(),
            DomainError::OrderNotModifiable
        );
        assert_eq!(order.items().len(), 1);
    }

    #[test]
    fn status_check_wins_over_item_validation() {
        let mut order = pending_order();
        order.cancel().unwrap();

        assert_eq!(
            order.add_item(9, 0, price("-1")).unwrap_err(),
            DomainError::OrderNotModifiable
        );
    }

    #[test]
    fn total_matches_items_after_every_mutation() {
        let mut order = pending_order();
        let steps: [(i64, i32, &str); 4] =
            [(1, 3, "0.99"), (2, 1, "120.00"), (3, 7, "3.333"), (4, 2, "0")];

        for (n, (product, qty, unit)) in steps.into_iter().enumerate() {
            order.add_item(product, qty, price(unit)).unwrap();
            order.items_mut()[n + 1].id = product;
            assert_eq!(order.total_amount(), &expected_total(&order));
        }
        for id in [2, 4, 1] {
            order.remove_item(id).unwrap();
            assert_eq!(order.total_amount(), &expected_total(&order));
        }
    }

    // ── Status transitions ───────────────────────────────────────────────────

    #[test]
    fn happy_path_walks_the_full_lifecycle() {
        let mut order = pending_order();
        order.confirm().unwrap();
        assert_eq!(order.status(), OrderStatus::Confirmed);
        order.ship().unwrap();
        assert_eq!(order.status(), OrderStatus::Shipped);
        order.deliver().unwrap();
        assert_eq!(order.status(), OrderStatus::Delivered);
        assert!(order.status().is_terminal());
    }

    #[test]
    fn ship_from_pending_is_rejected_and_status_unchanged() {
        let mut order = pending_order();

        assert_eq!(
            order.ship().unwrap_err(),
            DomainError::InvalidOrderStatusTransition
        );
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn deliver_requires_shipped() {
        let mut order = pending_order();
        assert_eq!(
            order.deliver().unwrap_err(),
            DomainError::InvalidOrderStatusTransition
        );
        order.confirm().unwrap();
        assert_eq!(
            order.deliver().unwrap_err(),
            DomainError::InvalidOrderStatusTransition
        );
        assert_eq!(order.status(), OrderStatus::Confirmed);
    }

    #[test]
    fn no_backward_moves() {
        let mut order = pending_order();
        order.confirm().unwrap();
        order.ship().unwrap();

        assert_eq!(
            order.confirm().unwrap_err(),
            DomainError::InvalidOrderStatusTransition
        );
        assert_eq!(order.status(), OrderStatus::Shipped);
    }

    #[test]
    fn cancel_is_allowed_before_delivery() {
        for advance in 0..3 {
            let mut order = pending_order();
            if advance >= 1 {
                order.confirm().unwrap();
            }
            if advance >= 2 {
                order.ship().unwrap();
            }

            order.cancel().unwrap();
            assert_eq!(order.status(), OrderStatus::Cancelled);
        }
    }

    #[test]
    fn cancel_after_delivery_is_rejected() {
        let mut order = pending_order();
        order.confirm().unwrap();
        order.ship().unwrap();
        order.deliver().unwrap();

        assert_eq!(
            order.cancel().unwrap_err(),
            DomainError::CannotCancelDeliveredOrder
        );
        assert_eq!(order.status(), OrderStatus::Delivered);
    }

    #[test]
    fn cancelled_only_accepts_cancel() {
        let mut order = pending_order();
        order.cancel().unwrap();

        for result in [order.confirm(), order.ship(), order.deliver()] {
            assert_eq!(result.unwrap_err(), DomainError::InvalidOrderStatusTransition);
        }
        let before = order.updated_at();
        order.cancel().unwrap();
        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert!(order.updated_at() >= before);
    }

    #[test]
    fn every_mutation_bumps_updated_at() {
        let mut order = pending_order();
        order.items_mut()[0].id = 100;

        let mut before = order.updated_at();
        order.add_item(9, 1, price("5.0")).unwrap();
        assert!(order.updated_at() >= before);

        before = order.updated_at();
        order.remove_item(100).unwrap();
        assert!(order.updated_at() >= before);

        let steps: [fn(&mut Order) -> Result<(), DomainError>; 4] =
            [Order::confirm, Order::ship, Order::deliver, Order::cancel];
        for (n, step) in steps.into_iter().enumerate() {
            before = order.updated_at();
            let result = step(&mut order);
            if n < 3 {
                result.unwrap();
                assert!(order.updated_at() >= before);
            } else {
                assert_eq!(result.unwrap_err(), DomainError::CannotCancelDeliveredOrder);
                assert_eq!(order.updated_at(), before);
            }
        }

        let mut cancelled = pending_order();
        before = cancelled.updated_at();
        cancelled.cancel().unwrap();
        assert!(cancelled.updated_at() >= before);

        before = cancelled.updated_at();
        cancelled.mark_as_deleted();
        assert!(cancelled.updated_at() >= before);
    }

    // ── Soft delete ──────────────────────────────────────────────────────────

    #[test]
    fn mark_as_deleted_sets_deleted_at() {
        let mut order = pending_order();
        order.mark_as_deleted();

        assert!(order.is_deleted());
        assert_eq!(order.deleted_at(), Some(order.updated_at()));
    }

    // ── Status parsing ───────────────────────────────────────────────────────

    #[test]
    fn status_string_form_is_lowercase() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert_eq!(
            serde_json::to_string(&OrderStatus::Confirmed).unwrap(),
            "\"confirmed\""
        );
    }

    #[test]
    fn unknown_status_fails_to_parse() {
        assert_eq!(
            "PENDING".parse::<OrderStatus>(),
            Err(UnknownOrderStatus("PENDING".to_string()))
        );
    }

    // ── Walkthrough ──────────────────────────────────────────────────────────

    #[test]
    fn order_walkthrough() {
        let mut order = Order::new(42, vec![item(7, 2, "10.0")]).unwrap();
        assert_eq!(order.total_amount(), &price("20.0"));
        assert_eq!(order.status().as_str(), "pending");

        order.add_item(9, 1, price("5.0")).unwrap();
        assert_eq!(order.total_amount(), &price("25.0"));

        order.confirm().unwrap();
        assert_eq!(order.status().as_str(), "confirmed");

        assert_eq!(
            order.add_item(11, 1, price("1.0")).unwrap_err(),
            DomainError::OrderNotModifiable
        );

        order.ship().unwrap();
        assert_eq!(order.status().as_str(), "shipped");

        order.cancel().unwrap();
        assert_eq!(order.status().as_str(), "cancelled");
    }
}
