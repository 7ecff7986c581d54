//! Query builder functions for user-visit join rows.

use diesel::prelude::*;

use crate::db::schema::user_visits;

/// ## Summary
/// Returns a query to select all user-visit rows.
#[must_use]
pub fn all() -> user_visits::BoxedQuery<'static, diesel::pg::Pg> {
    user_visits::table.into_boxed()
}

/// ## Summary
/// Returns a query to find the visits a user takes part in.
#[must_use]
pub fn for_user(user_id: uuid::Uuid) -> user_visits::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(user_visits::fk_user_id.eq(user_id))
}

/// ## Summary
/// Returns a query to find the garrison rows of a visit.
#[must_use]
pub fn for_visit(visit_id: uuid::Uuid) -> user_visits::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(user_visits::fk_visit_id.eq(visit_id))
}

/// ## Summary
/// Returns a query to find user-visit rows updated strictly after `watermark`.
#[must_use]
pub fn updated_since(
    watermark: chrono::DateTime<chrono::Utc>,
) -> user_visits::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(user_visits::updated_at.gt(watermark))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_updated_since_is_strictly_greater() {
        let sql = diesel::debug_query::<diesel::pg::Pg, _>(&updated_since(chrono::Utc::now()))
            .to_string();

        assert!(sql.contains("\"user_visits\".\"updated_at\" > "));
        assert!(!sql.contains(">="));
    }
}
