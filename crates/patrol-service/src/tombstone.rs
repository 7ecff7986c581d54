//! Tombstone ledger: durable deletion records for differential sync.
//!
//! Every hard delete of a syncable row is mirrored by exactly one ledger
//! entry, written strictly before the row is removed. A client that last
//! synced before the deletion discovers it through the ledger instead of
//! diffing full snapshots. A crash after the ledger write but before the
//! delete strands a tombstone for a row that still exists, which consumers
//! handle as a no-op retraction; the reverse window (row gone, no tombstone)
//! must never occur.

use patrol_core::types::SyncTable;
use patrol_db::db::connection::DbConnection;
use patrol_db::db::query::tombstones;
use patrol_db::model::tombstone::Tombstone;

use crate::error::ServiceResult;

/// ## Summary
/// Records one deletion in the ledger and returns the new entry.
///
/// Call this before deleting the row it names, inside the same transaction
/// as the delete. Recording the same deletion twice produces two entries;
/// consumers treat tombstones as idempotent signals, not a count.
///
/// ## Errors
/// Returns a database error if the insert fails. The caller must then abort
/// the deletion, otherwise the row would vanish without a trace for sync
/// clients.
#[tracing::instrument(skip(conn))]
pub async fn record_deletion(
    conn: &mut DbConnection<'_>,
    table: SyncTable,
    deleted_id: uuid::Uuid,
) -> ServiceResult<Tombstone> {
    let tombstone = tombstones::insert(conn, table, deleted_id).await?;

    tracing::debug!(
        tombstone_id = %tombstone.id,
        table = %table,
        deleted_id = %deleted_id,
        "Recorded deletion in tombstone ledger"
    );

    Ok(tombstone)
}

/// ## Summary
/// Records one ledger entry per id, all against the same logical table.
///
/// Used by cascading deletes: every dependent row gets its own tombstone
/// named with the dependent's table, written before any of the rows are
/// removed. The parent's tombstone does not substitute for these.
///
/// ## Errors
/// Returns the first database error encountered; earlier inserts stay
/// pending in the enclosing transaction and roll back with it.
#[tracing::instrument(skip(conn, deleted_ids))]
pub async fn record_deletions(
    conn: &mut DbConnection<'_>,
    table: SyncTable,
    deleted_ids: &[uuid::Uuid],
) -> ServiceResult<Vec<Tombstone>> {
    let mut recorded = Vec::with_capacity(deleted_ids.len());

    for deleted_id in deleted_ids {
        recorded.push(tombstones::insert(conn, table, *deleted_id).await?);
    }

    Ok(recorded)
}
