pub mod memory;
pub mod models;
pub mod order_repo;
pub mod user_repo;

#[cfg(test)]
mod test_support;

use crate::domain::errors::DomainError;

pub use memory::{InMemoryOrderRepository, InMemoryUserRepository};
pub use order_repo::DieselOrderRepository;
pub use user_repo::DieselUserRepository;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

/// Escapes `LIKE` wildcards so user input only ever matches literally.
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
