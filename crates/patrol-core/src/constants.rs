/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";

pub const SYNC_ROUTE_COMPONENT: &str = "sync";

pub const USERS_ROUTE_COMPONENT: &str = "users";

pub const PROPERTIES_ROUTE_COMPONENT: &str = "properties";

/// Listing endpoints return at most this many rows per page.
pub const PAGE_SIZE: i64 = 25;
