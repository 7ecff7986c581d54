//! Query builder functions for property-vehicle rows.

use diesel::prelude::*;

use crate::db::schema::property_vehicles;

/// ## Summary
/// Returns a query to select all property-vehicle rows.
#[must_use]
pub fn all() -> property_vehicles::BoxedQuery<'static, diesel::pg::Pg> {
    property_vehicles::table.into_boxed()
}

/// ## Summary
/// Returns a query to find the vehicles registered at a property.
#[must_use]
pub fn for_property(
    property_id: uuid::Uuid,
) -> property_vehicles::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(property_vehicles::fk_property_id.eq(property_id))
}

/// ## Summary
/// Returns a query to find property-vehicle rows updated strictly after
/// `watermark`.
#[must_use]
pub fn updated_since(
    watermark: chrono::DateTime<chrono::Utc>,
) -> property_vehicles::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(property_vehicles::updated_at.gt(watermark))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_updated_since_is_strictly_greater() {
        let sql = diesel::debug_query::<diesel::pg::Pg, _>(&updated_since(chrono::Utc::now()))
            .to_string();

        assert!(sql.contains("\"property_vehicles\".\"updated_at\" > "));
        assert!(!sql.contains(">="));
    }
}
