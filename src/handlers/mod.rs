pub mod health;
pub mod orders;
pub mod users;

use crate::application::{OrderService, UserService};
use crate::domain::ports::{OrderRepository, UserRepository};

/// User use-cases over whichever storage backend was selected at start-up.
pub type DynUserService = UserService<Box<dyn UserRepository>>;

/// Order use-cases over whichever storage backend was selected at start-up.
pub type DynOrderService = OrderService<Box<dyn OrderRepository>>;
