pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Normalised pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Non-positive limits fall back to [`DEFAULT_LIMIT`], large ones are
    /// capped at [`MAX_LIMIT`], negative offsets become zero.
    pub fn new(limit: i64, offset: i64) -> Self {
        let limit = if limit <= 0 {
            DEFAULT_LIMIT
        } else {
            limit.min(MAX_LIMIT)
        };
        Self {
            limit,
            offset: offset.max(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, 0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GetUserQuery {
    pub user_id: i64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GetUsersQuery {
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Default)]
pub struct SearchUsersQuery {
    pub email: String,
    pub name: String,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListOrdersQuery {
    /// Restricts the listing to one user's orders.
    pub user_id: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}
