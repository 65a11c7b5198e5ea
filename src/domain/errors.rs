use thiserror::Error;

/// Expected business-rule failures shared by every aggregate.
///
/// Storage adapters report anything that is not a rule violation as
/// [`DomainError::Internal`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // Order
    #[error("invalid user ID")]
    InvalidUserId,
    #[error("order must contain at least one item")]
    EmptyOrder,
    #[error("order item quantity must be greater than zero")]
    InvalidItemQuantity,
    #[error("order item price must not be negative")]
    InvalidItemPrice,
    #[error("order cannot be modified in current status")]
    OrderNotModifiable,
    #[error("order item not found")]
    OrderItemNotFound,
    #[error("invalid order status transition")]
    InvalidOrderStatusTransition,
    #[error("cannot cancel delivered order")]
    CannotCancelDeliveredOrder,
    #[error("order not found")]
    OrderNotFound,

    // User
    #[error("email is required")]
    InvalidEmail,
    #[error("name is required")]
    InvalidName,
    #[error("password is required")]
    InvalidPassword,
    #[error("user not found")]
    UserNotFound,
    #[error("user with this email already exists")]
    EmailExists,

    #[error("Internal error: {0}")]
    Internal(String),
}
