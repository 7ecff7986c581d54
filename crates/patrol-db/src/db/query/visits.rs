//! Query builder functions for visits.

use diesel::prelude::*;

use crate::db::schema::visits;

/// ## Summary
/// Returns a query to select all visits.
#[must_use]
pub fn all() -> visits::BoxedQuery<'static, diesel::pg::Pg> {
    visits::table.into_boxed()
}

/// ## Summary
/// Returns a query to find a visit by ID.
#[must_use]
pub fn by_id(id: uuid::Uuid) -> visits::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(visits::id.eq(id))
}

/// ## Summary
/// Returns a query to find visits for a property.
#[must_use]
pub fn for_property(property_id: uuid::Uuid) -> visits::BoxedQuery<'static, diesel::pg::Pg> {
    all()
        .filter(visits::fk_property_id.eq(property_id))
        .order(visits::scheduled_at.asc())
}

/// ## Summary
/// Returns a query to find visits updated strictly after `watermark`.
#[must_use]
pub fn updated_since(
    watermark: chrono::DateTime<chrono::Utc>,
) -> visits::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(visits::updated_at.gt(watermark))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_updated_since_is_strictly_greater() {
        let sql = diesel::debug_query::<diesel::pg::Pg, _>(&updated_since(chrono::Utc::now()))
            .to_string();

        assert!(sql.contains("\"visits\".\"updated_at\" > "));
        assert!(!sql.contains(">="));
    }
}
