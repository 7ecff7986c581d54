//! Query builder and insert functions for the tombstone ledger.

use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;

use patrol_core::types::SyncTable;

use crate::db::connection::DbConnection;
use crate::db::schema::tombstones;
use crate::error::DbResult;
use crate::model::tombstone::{NewTombstone, Tombstone};

/// ## Summary
/// Returns a query to select all tombstones.
#[must_use]
pub fn all() -> tombstones::BoxedQuery<'static, diesel::pg::Pg> {
    tombstones::table.into_boxed()
}

/// ## Summary
/// Returns a query to find tombstones for a logical table.
#[must_use]
pub fn for_table(table: SyncTable) -> tombstones::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(tombstones::table_name.eq(table.as_str()))
}

/// ## Summary
/// Returns a query to find tombstones for `table` recorded strictly after
/// `watermark`.
#[must_use]
pub fn since(
    table: SyncTable,
    watermark: chrono::DateTime<chrono::Utc>,
) -> tombstones::BoxedQuery<'static, diesel::pg::Pg> {
    for_table(table).filter(tombstones::updated_at.gt(watermark))
}

/// ## Summary
/// Appends one tombstone naming the deleted row and returns it.
///
/// Timestamps come from the database clock, never from the client. Callers
/// must run this strictly before the matching record delete.
///
/// ## Errors
/// Returns a database error if the insert fails; the caller must then abort
/// the deletion it was about to perform.
pub async fn insert(
    conn: &mut DbConnection<'_>,
    table: SyncTable,
    deleted_id: uuid::Uuid,
) -> DbResult<Tombstone> {
    let new_tombstone = NewTombstone {
        id: uuid::Uuid::now_v7(),
        table_name: table.as_str(),
        deleted_id,
    };

    let tombstone = diesel::insert_into(tombstones::table)
        .values(&new_tombstone)
        .returning(Tombstone::as_select())
        .get_result::<Tombstone>(conn)
        .await?;

    Ok(tombstone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_since_filters_by_table_and_strict_watermark() {
        let watermark = chrono::Utc::now();
        let sql = diesel::debug_query::<diesel::pg::Pg, _>(&since(SyncTable::Users, watermark))
            .to_string();

        assert!(sql.contains("\"tombstones\".\"table_name\" = "));
        // Strict inequality: the watermark row itself is never re-sent.
        assert!(sql.contains("\"tombstones\".\"updated_at\" > "));
        assert!(!sql.contains(">="));
    }

    #[test_log::test]
    fn test_for_table_names_the_logical_collection() {
        let sql =
            diesel::debug_query::<diesel::pg::Pg, _>(&for_table(SyncTable::UserVisits)).to_string();

        assert!(sql.contains("table_name"));
        assert!(sql.ends_with("[\"user_visits\"]"));
    }
}
