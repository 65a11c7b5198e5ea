pub mod commands;
pub mod order_service;
pub mod queries;
pub mod user_service;

pub use order_service::{OrderItemInput, OrderService};
pub use user_service::UserService;
