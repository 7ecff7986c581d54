//! Query builder functions for users.

use diesel::prelude::*;

use crate::db::schema::users;

/// ## Summary
/// Returns a query to select all users.
#[must_use]
pub fn all() -> users::BoxedQuery<'static, diesel::pg::Pg> {
    users::table.into_boxed()
}

/// ## Summary
/// Returns a query to find a user by ID.
#[must_use]
pub fn by_id(id: uuid::Uuid) -> users::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(users::id.eq(id))
}

/// ## Summary
/// Returns a query to find a user by email.
#[must_use]
pub fn by_email(email: &str) -> users::BoxedQuery<'_, diesel::pg::Pg> {
    all().filter(users::email.eq(email))
}

/// ## Summary
/// Returns a listing query: case-insensitive substring match on name or
/// email when `search` is given, ordered by name.
#[must_use]
pub fn listing(search: Option<&str>, descending: bool) -> users::BoxedQuery<'_, diesel::pg::Pg> {
    let mut query = all();

    if let Some(term) = search {
        let pattern = format!("%{term}%");
        query = query.filter(
            users::name
                .ilike(pattern.clone())
                .or(users::email.ilike(pattern)),
        );
    }

    if descending {
        query.order(users::name.desc())
    } else {
        query.order(users::name.asc())
    }
}

/// ## Summary
/// Returns a query to find users updated strictly after `watermark`.
#[must_use]
pub fn updated_since(
    watermark: chrono::DateTime<chrono::Utc>,
) -> users::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(users::updated_at.gt(watermark))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_updated_since_is_strictly_greater() {
        let sql = diesel::debug_query::<diesel::pg::Pg, _>(&updated_since(chrono::Utc::now()))
            .to_string();

        assert!(sql.contains("\"users\".\"updated_at\" > "));
        assert!(!sql.contains(">="));
    }

    #[test_log::test]
    fn test_listing_searches_name_and_email() {
        let sql = diesel::debug_query::<diesel::pg::Pg, _>(&listing(Some("smith"), false))
            .to_string();

        assert!(sql.contains("ILIKE"));
        assert!(sql.contains("\"users\".\"name\""));
        assert!(sql.contains("\"users\".\"email\""));
        assert!(sql.contains("[\"%smith%\", \"%smith%\"]"));
    }
}
