use bigdecimal::BigDecimal;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderItem};
use crate::domain::ports::OrderRepository;

use super::queries::{ListOrdersQuery, Page};

#[derive(Debug, Clone)]
pub struct OrderItemInput {
    pub product_id: i64,
    pub quantity: i32,
    pub price: BigDecimal,
}

impl From<OrderItemInput> for OrderItem {
    fn from(input: OrderItemInput) -> Self {
        OrderItem::new(input.product_id, input.quantity, input.price)
    }
}

pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_order(
        &self,
        user_id: i64,
        items: Vec<OrderItemInput>,
    ) -> Result<Order, DomainError> {
        let order = Order::new(user_id, items.into_iter().map(OrderItem::from).collect())?;
        let order = self.repo.create(order)?;
        log::info!("Created order {} for user {}", order.id(), user_id);
        Ok(order)
    }

    pub fn get_order(&self, id: i64) -> Result<Order, DomainError> {
        self.repo.get_by_id(id)
    }

    pub fn list_orders(&self, query: ListOrdersQuery) -> Result<Vec<Order>, DomainError> {
        let page = Page::new(query.limit, query.offset);
        match query.user_id {
            Some(user_id) => self.repo.get_by_user(user_id, page.limit, page.offset),
            None => self.repo.get_all(page.limit, page.offset),
        }
    }

    pub fn get_order_items(&self, id: i64) -> Result<Vec<OrderItem>, DomainError> {
        Ok(self.repo.get_by_id(id)?.items().to_vec())
    }

    pub fn add_item(&self, id: i64, item: OrderItemInput) -> Result<Order, DomainError> {
        self.modify(id, |order| {
            order.add_item(item.product_id, item.quantity, item.price)
        })
    }

    pub fn remove_item(&self, id: i64, item_id: i64) -> Result<Order, DomainError> {
        self.modify(id, |order| order.remove_item(item_id))
    }

    pub fn confirm_order(&self, id: i64) -> Result<Order, DomainError> {
        self.transition(id, Order::confirm)
    }

    pub fn ship_order(&self, id: i64) -> Result<Order, DomainError> {
        self.transition(id, Order::ship)
    }

    pub fn deliver_order(&self, id: i64) -> Result<Order, DomainError> {
        self.transition(id, Order::deliver)
    }

    pub fn cancel_order(&self, id: i64) -> Result<Order, DomainError> {
        self.transition(id, Order::cancel)
    }

    pub fn delete_order(&self, id: i64) -> Result<(), DomainError> {
        self.repo.delete(id)?;
        log::info!("Soft-deleted order {}", id);
        Ok(())
    }

    pub fn count_orders(&self) -> Result<i64, DomainError> {
        self.repo.count()
    }

    fn transition(
        &self,
        id: i64,
        apply: fn(&mut Order) -> Result<(), DomainError>,
    ) -> Result<Order, DomainError> {
        let order = self.modify(id, apply)?;
        log::info!("Order {} is now {}", id, order.status());
        Ok(order)
    }

    /// Fetch, mutate, save. Storage is only touched when the entity accepts
    /// the change.
    fn modify<F>(&self, id: i64, change: F) -> Result<Order, DomainError>
    where
        F: FnOnce(&mut Order) -> Result<(), DomainError>,
    {
        let mut order = self.repo.get_by_id(id)?;
        change(&mut order)?;
        self.repo.update(order)
    }
}
