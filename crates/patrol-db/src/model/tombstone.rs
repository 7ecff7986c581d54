use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

/// One deletion event in the append-only ledger.
///
/// Rows are created by deletion code paths, never updated and never deleted,
/// so the ledger grows without bound; no retention policy exists. Duplicate
/// (`table_name`, `deleted_id`) pairs are allowed, and sync consumers must
/// treat tombstones as idempotent retraction signals rather than a count.
#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::tombstones)]
#[diesel(check_for_backend(Pg))]
pub struct Tombstone {
    pub id: uuid::Uuid,
    pub table_name: String,
    pub deleted_id: uuid::Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::tombstones)]
pub struct NewTombstone<'a> {
    pub id: uuid::Uuid,
    pub table_name: &'a str,
    pub deleted_id: uuid::Uuid,
}
