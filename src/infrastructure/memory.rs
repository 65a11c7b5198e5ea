use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::ports::{OrderRepository, UserRepository};
use crate::domain::user::User;

/// Process-local storage with the same semantics as the diesel adapters.
/// Rows are keyed by id, so iteration order is id ascending.
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, DomainError> {
    mutex
        .lock()
        .map_err(|_| DomainError::Internal("in-memory store lock poisoned".to_string()))
}

fn page<T>(rows: impl Iterator<Item = T>, limit: i64, offset: i64) -> Vec<T> {
    rows.skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

// ── Users ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryUserRepository {
    table: Mutex<Table<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn live(table: &Table<User>) -> impl Iterator<Item = &User> {
        table.rows.values().filter(|u| !u.is_deleted())
    }

    fn email_taken(table: &Table<User>, email: &str, except_id: i64) -> bool {
        Self::live(table).any(|u| u.email() == email && u.id() != except_id)
    }
}

impl UserRepository for InMemoryUserRepository {
    fn create(&self, mut user: User) -> Result<User, DomainError> {
        let mut table = lock(&self.table)?;
        if Self::email_taken(&table, user.email(), 0) {
            return Err(DomainError::EmailExists);
        }
        let id = table.allocate_id();
        user.assign_id(id);
        table.rows.insert(id, user.clone());
        Ok(user)
    }

    fn get_by_id(&self, id: i64) -> Result<User, DomainError> {
        let table = lock(&self.table)?;
        let user = Self::live(&table)
            .find(|u| u.id() == id)
            .cloned()
            .ok_or(DomainError::UserNotFound);
        user
    }

    fn get_by_email(&self, email: &str) -> Result<User, DomainError> {
        let table = lock(&self.table)?;
        let user = Self::live(&table)
            .find(|u| u.email() == email)
            .cloned()
            .ok_or(DomainError::UserNotFound);
        user
    }

    fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<User>, DomainError> {
        let table = lock(&self.table)?;
        Ok(page(Self::live(&table).cloned(), limit, offset))
    }

    fn update(&self, user: &User) -> Result<(), DomainError> {
        let mut table = lock(&self.table)?;
        match table.rows.get(&user.id()) {
            Some(stored) if !stored.is_deleted() => {}
            _ => return Err(DomainError::UserNotFound),
        }
        if !user.is_deleted() && Self::email_taken(&table, user.email(), user.id()) {
            return Err(DomainError::EmailExists);
        }
        table.rows.insert(user.id(), user.clone());
        Ok(())
    }

    fn delete(&self, id: i64) -> Result<(), DomainError> {
        let mut table = lock(&self.table)?;
        match table.rows.get_mut(&id) {
            Some(user) if !user.is_deleted() => {
                user.mark_as_deleted();
                Ok(())
            }
            _ => Err(DomainError::UserNotFound),
        }
    }

    fn count(&self) -> Result<i64, DomainError> {
        let table = lock(&self.table)?;
        Ok(Self::live(&table).count() as i64)
    }

    fn get_users_by_email_domain(&self, domain: &str) -> Result<Vec<User>, DomainError> {
        let suffix = format!("@{domain}");
        let table = lock(&self.table)?;
        Ok(Self::live(&table)
            .filter(|u| u.email().ends_with(&suffix))
            .cloned()
            .collect())
    }

    fn get_active_users(&self) -> Result<Vec<User>, DomainError> {
        let table = lock(&self.table)?;
        Ok(Self::live(&table).cloned().collect())
    }

    fn get_users_with_filters(
        &self,
        limit: i64,
        offset: i64,
        email: &str,
        name: &str,
    ) -> Result<Vec<User>, DomainError> {
        let table = lock(&self.table)?;
        let matches = Self::live(&table)
            .filter(|u| email.is_empty() || u.email().contains(email))
            .filter(|u| name.is_empty() || u.name().contains(name))
            .cloned();
        Ok(page(matches, limit, offset))
    }
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryOrderRepository {
    state: Mutex<OrderState>,
}

#[derive(Default)]
struct OrderState {
    orders: Table<Order>,
    next_item_id: i64,
}

impl OrderState {
    /// Gives every not-yet-persisted item an identity.
    fn assign_item_ids(&mut self, order: &mut Order) {
        let order_id = order.id();
        for item in order.items_mut() {
            item.order_id = order_id;
            if item.id == 0 {
                self.next_item_id += 1;
                item.id = self.next_item_id;
            }
        }
    }

    fn live(&self) -> impl Iterator<Item = &Order> {
        self.orders.rows.values().filter(|o| !o.is_deleted())
    }
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(&self, mut order: Order) -> Result<Order, DomainError> {
        let mut state = lock(&self.state)?;
        let id = state.orders.allocate_id();
        order.assign_id(id);
        state.assign_item_ids(&mut order);
        state.orders.rows.insert(id, order.clone());
        Ok(order)
    }

    fn get_by_id(&self, id: i64) -> Result<Order, DomainError> {
        let state = lock(&self.state)?;
        let order = state
            .live()
            .find(|o| o.id() == id)
            .cloned()
            .ok_or(DomainError::OrderNotFound);
        order
    }

    fn get_by_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, DomainError> {
        let state = lock(&self.state)?;
        let owned = state.live().filter(|o| o.user_id() == user_id).cloned();
        Ok(page(owned, limit, offset))
    }

    fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<Order>, DomainError> {
        let state = lock(&self.state)?;
        Ok(page(state.live().cloned(), limit, offset))
    }

    fn update(&self, mut order: Order) -> Result<Order, DomainError> {
        let mut state = lock(&self.state)?;
        match state.orders.rows.get(&order.id()) {
            Some(stored) if !stored.is_deleted() => {}
            _ => return Err(DomainError::OrderNotFound),
        }
        state.assign_item_ids(&mut order);
        state.orders.rows.insert(order.id(), order.clone());
        Ok(order)
    }

    fn delete(&self, id: i64) -> Result<(), DomainError> {
        let mut state = lock(&self.state)?;
        match state.orders.rows.get_mut(&id) {
            Some(order) if !order.is_deleted() => {
                order.mark_as_deleted();
                Ok(())
            }
            _ => Err(DomainError::OrderNotFound),
        }
    }

    fn count(&self) -> Result<i64, DomainError> {
        let state = lock(&self.state)?;
        Ok(state.live().count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::domain::order::OrderItem;

    fn user(email: &str) -> User {
        User::new(email, "Someone", "password123").unwrap()
    }

    fn order(user_id: i64) -> Order {
        let price = BigDecimal::from_str("2.50").unwrap();
        Order::new(user_id, vec![OrderItem::new(1, 2, price)]).unwrap()
    }

    #[test]
    fn soft_deleted_users_are_hidden_but_kept() {
        let repo = InMemoryUserRepository::new();
        let alice = repo.create(user("alice@example.com")).unwrap();
        repo.create(user("bob@example.com")).unwrap();

        repo.delete(alice.id()).unwrap();

        assert_eq!(
            repo.get_by_id(alice.id()).unwrap_err(),
            DomainError::UserNotFound
        );
        assert_eq!(repo.count().unwrap(), 1);
        assert_eq!(repo.delete(alice.id()).unwrap_err(), DomainError::UserNotFound);
        let table = repo.table.lock().unwrap();
        assert!(table.rows[&alice.id()].is_deleted());
    }

    #[test]
    fn email_is_unique_among_live_users() {
        let repo = InMemoryUserRepository::new();
        let first = repo.create(user("dup@example.com")).unwrap();

        assert_eq!(
            repo.create(user("dup@example.com")).unwrap_err(),
            DomainError::EmailExists
        );

        repo.delete(first.id()).unwrap();
        assert!(repo.create(user("dup@example.com")).is_ok());
    }

    #[test]
    fn domain_filter_matches_after_the_at_sign() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("a@example.com")).unwrap();
        repo.create(user("b@notexample.com")).unwrap();

        let found = repo.get_users_by_email_domain("example.com").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email(), "a@example.com");
    }

    #[test]
    fn order_ids_and_item_ids_are_assigned() {
        let repo = InMemoryOrderRepository::new();
        let created = repo.create(order(42)).unwrap();

        assert_eq!(created.id(), 1);
        assert_eq!(created.items()[0].id, 1);
        assert_eq!(created.items()[0].order_id, created.id());

        let mut fetched = repo.get_by_id(created.id()).unwrap();
        fetched
            .add_item(2, 1, BigDecimal::from_str("1.00").unwrap())
            .unwrap();
        let updated = repo.update(fetched).unwrap();
        assert_eq!(updated.items()[1].id, 2);
    }

    #[test]
    fn orders_are_paged_per_user() {
        let repo = InMemoryOrderRepository::new();
        for _ in 0..3 {
            repo.create(order(1)).unwrap();
        }
        repo.create(order(2)).unwrap();

        assert_eq!(repo.get_by_user(1, 2, 0).unwrap().len(), 2);
        assert_eq!(repo.get_by_user(1, 2, 2).unwrap().len(), 1);
        assert_eq!(repo.get_all(10, 0).unwrap().len(), 4);
    }

    #[test]
    fn updating_a_deleted_order_fails() {
        let repo = InMemoryOrderRepository::new();
        let created = repo.create(order(1)).unwrap();
        repo.delete(created.id()).unwrap();

        assert_eq!(repo.update(created).unwrap_err(), DomainError::OrderNotFound);
        assert_eq!(repo.count().unwrap(), 0);
    }
}
