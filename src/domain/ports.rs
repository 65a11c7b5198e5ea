use super::errors::DomainError;
use super::order::Order;
use super::user::User;

/// Storage contract for users. Standard lookups never return soft-deleted
/// users; "not found" is reported as [`DomainError::UserNotFound`].
pub trait UserRepository: Send + Sync + 'static {
    /// Persists a new user and returns it with its identity assigned.
    fn create(&self, user: User) -> Result<User, DomainError>;
    fn get_by_id(&self, id: i64) -> Result<User, DomainError>;
    fn get_by_email(&self, email: &str) -> Result<User, DomainError>;
    fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<User>, DomainError>;
    fn update(&self, user: &User) -> Result<(), DomainError>;
    /// Soft delete.
    fn delete(&self, id: i64) -> Result<(), DomainError>;
    fn count(&self) -> Result<i64, DomainError>;

    /// Users whose email ends in `@domain`.
    fn get_users_by_email_domain(&self, domain: &str) -> Result<Vec<User>, DomainError>;
    fn get_active_users(&self) -> Result<Vec<User>, DomainError>;
    /// Substring match on each non-empty filter.
    fn get_users_with_filters(
        &self,
        limit: i64,
        offset: i64,
        email: &str,
        name: &str,
    ) -> Result<Vec<User>, DomainError>;
}

/// Storage contract for orders. Standard lookups never return soft-deleted
/// orders; "not found" is reported as [`DomainError::OrderNotFound`].
pub trait OrderRepository: Send + Sync + 'static {
    /// Persists a new order with its items and returns it with every
    /// identity assigned.
    fn create(&self, order: Order) -> Result<Order, DomainError>;
    fn get_by_id(&self, id: i64) -> Result<Order, DomainError>;
    fn get_by_user(&self, user_id: i64, limit: i64, offset: i64)
        -> Result<Vec<Order>, DomainError>;
    fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<Order>, DomainError>;
    /// Saves status, timestamps and the item list, and returns the stored
    /// state (newly added items get their identities here).
    fn update(&self, order: Order) -> Result<Order, DomainError>;
    /// Soft delete.
    fn delete(&self, id: i64) -> Result<(), DomainError>;
    fn count(&self) -> Result<i64, DomainError>;
}

impl<T: UserRepository + ?Sized> UserRepository for Box<T> {
    fn create(&self, user: User) -> Result<User, DomainError> {
        (**self).create(user)
    }

    fn get_by_id(&self, id: i64) -> Result<User, DomainError> {
        (**self).get_by_id(id)
    }

    fn get_by_email(&self, email: &str) -> Result<User, DomainError> {
        (**self).get_by_email(email)
    }

    fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<User>, DomainError> {
        (**self).get_all(limit, offset)
    }

    fn update(&self, user: &User) -> Result<(), DomainError> {
        (**self).update(user)
    }

    fn delete(&self, id: i64) -> Result<(), DomainError> {
        (**self).delete(id)
    }

    fn count(&self) -> Result<i64, DomainError> {
        (**self).count()
    }

    fn get_users_by_email_domain(&self, domain: &str) -> Result<Vec<User>, DomainError> {
        (**self).get_users_by_email_domain(domain)
    }

    fn get_active_users(&self) -> Result<Vec<User>, DomainError> {
        (**self).get_active_users()
    }

    fn get_users_with_filters(
        &self,
        limit: i64,
        offset: i64,
        email: &str,
        name: &str,
    ) -> Result<Vec<User>, DomainError> {
        (**self).get_users_with_filters(limit, offset, email, name)
    }
}

impl<T: OrderRepository + ?Sized> OrderRepository for Box<T> {
    fn create(&self, order: Order) -> Result<Order, DomainError> {
        (**self).create(order)
    }

    fn get_by_id(&self, id: i64) -> Result<Order, DomainError> {
        (**self).get_by_id(id)
    }

    fn get_by_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, DomainError> {
        (**self).get_by_user(user_id, limit, offset)
    }

    fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<Order>, DomainError> {
        (**self).get_all(limit, offset)
    }

    fn update(&self, order: Order) -> Result<Order, DomainError> {
        (**self).update(order)
    }

    fn delete(&self, id: i64) -> Result<(), DomainError> {
        (**self).delete(id)
    }

    fn count(&self) -> Result<i64, DomainError> {
        (**self).count()
    }
}
