pub mod errors;
pub mod order;
pub mod ports;
pub mod user;

pub use errors::DomainError;
pub use order::{Order, OrderItem, OrderStatus};
pub use ports::{OrderRepository, UserRepository};
pub use user::User;
