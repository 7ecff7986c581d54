//! Query builder functions for properties.

use diesel::prelude::*;

use crate::db::schema::properties;

/// ## Summary
/// Returns a query to select all properties.
#[must_use]
pub fn all() -> properties::BoxedQuery<'static, diesel::pg::Pg> {
    properties::table.into_boxed()
}

/// ## Summary
/// Returns a query to find a property by ID.
#[must_use]
pub fn by_id(id: uuid::Uuid) -> properties::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(properties::id.eq(id))
}

/// ## Summary
/// Returns a query to find a property by its unique code.
#[must_use]
pub fn by_code(code: &str) -> properties::BoxedQuery<'_, diesel::pg::Pg> {
    all().filter(properties::code.eq(code))
}

/// ## Summary
/// Returns a listing query: case-insensitive substring match on code or
/// owner name when `search` is given, ordered by code.
#[must_use]
pub fn listing(
    search: Option<&str>,
    descending: bool,
) -> properties::BoxedQuery<'_, diesel::pg::Pg> {
    let mut query = all();

    if let Some(term) = search {
        let pattern = format!("%{term}%");
        query = query.filter(
            properties::code
                .ilike(pattern.clone())
                .or(properties::owner_name.ilike(pattern)),
        );
    }

    if descending {
        query.order(properties::code.desc())
    } else {
        query.order(properties::code.asc())
    }
}

/// ## Summary
/// Returns a query to find properties updated strictly after `watermark`.
#[must_use]
pub fn updated_since(
    watermark: chrono::DateTime<chrono::Utc>,
) -> properties::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(properties::updated_at.gt(watermark))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_updated_since_is_strictly_greater() {
        let sql = diesel::debug_query::<diesel::pg::Pg, _>(&updated_since(chrono::Utc::now()))
            .to_string();

        assert!(sql.contains("\"properties\".\"updated_at\" > "));
        assert!(!sql.contains(">="));
    }
}
