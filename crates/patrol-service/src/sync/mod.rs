//! Differential sync: answer "what changed since watermark T" per table.
//!
//! The server holds no cursor state; the watermark lives entirely on the
//! client, which stores the greatest `updated_at` it has seen and sends it
//! back verbatim. Comparisons are strict (`>`), so a write landing at the
//! exact watermark instant can be missed once; inclusive semantics would
//! instead resend the boundary row forever. The whole delta ships in one
//! response with no pagination, a known scalability ceiling.

use chrono::{DateTime, Utc};
use diesel::{QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use serde::Serialize;

use patrol_core::types::SyncTable;
use patrol_db::db::connection::DbConnection;
use patrol_db::db::query;
use patrol_db::model::property::Property;
use patrol_db::model::property_vehicle::PropertyVehicle;
use patrol_db::model::tombstone::Tombstone;
use patrol_db::model::user::User;
use patrol_db::model::user_visit::UserVisit;
use patrol_db::model::visit::Visit;

use crate::error::ServiceResult;

pub mod watermark;

pub use watermark::parse_watermark;

/// Everything a client needs to catch up on one table: rows changed after
/// the watermark plus tombstones for rows deleted after it.
#[derive(Debug, Serialize)]
pub struct SyncDelta {
    pub changed: Vec<serde_json::Value>,
    pub deleted: Vec<Tombstone>,
}

/// ## Summary
/// Pulls the delta for `table` since `watermark`.
///
/// Without a watermark this is a full snapshot: every current row in
/// `changed` and an empty `deleted` list, since a client with no prior state
/// has nothing to retract. With a watermark, both lists are filtered by
/// strict `updated_at > watermark`. The lists are returned as-is, without
/// deduplication; the client reconciles.
///
/// ## Errors
/// Returns a database error if either query fails.
#[tracing::instrument(skip(conn))]
pub async fn pull_delta(
    conn: &mut DbConnection<'_>,
    table: SyncTable,
    watermark: Option<DateTime<Utc>>,
) -> ServiceResult<SyncDelta> {
    let changed = match table {
        SyncTable::Users => {
            let query = watermark.map_or_else(query::users::all, query::users::updated_since);
            to_values(query.select(User::as_select()).load::<User>(conn).await?)?
        }
        SyncTable::Properties => {
            let query =
                watermark.map_or_else(query::properties::all, query::properties::updated_since);
            to_values(
                query
                    .select(Property::as_select())
                    .load::<Property>(conn)
                    .await?,
            )?
        }
        SyncTable::Visits => {
            let query = watermark.map_or_else(query::visits::all, query::visits::updated_since);
            to_values(query.select(Visit::as_select()).load::<Visit>(conn).await?)?
        }
        SyncTable::UserVisits => {
            let query =
                watermark.map_or_else(query::user_visits::all, query::user_visits::updated_since);
            to_values(
                query
                    .select(UserVisit::as_select())
                    .load::<UserVisit>(conn)
                    .await?,
            )?
        }
        SyncTable::PropertyVehicles => {
            let query = watermark.map_or_else(
                query::property_vehicles::all,
                query::property_vehicles::updated_since,
            );
            to_values(
                query
                    .select(PropertyVehicle::as_select())
                    .load::<PropertyVehicle>(conn)
                    .await?,
            )?
        }
    };

    let deleted = match watermark {
        Some(watermark) => {
            query::tombstones::since(table, watermark)
                .select(Tombstone::as_select())
                .load::<Tombstone>(conn)
                .await?
        }
        None => Vec::new(),
    };

    tracing::debug!(
        table = %table,
        changed = changed.len(),
        deleted = deleted.len(),
        "Assembled sync delta"
    );

    Ok(SyncDelta { changed, deleted })
}

/// ## Summary
/// Acknowledges a pushed batch of records by echoing it back unchanged.
///
/// The push path is a bulk-upsert acknowledgment contract and does not touch
/// the tombstone ledger; it is deliberately separate from [`pull_delta`].
#[must_use]
pub fn push_batch(records: Vec<serde_json::Value>) -> Vec<serde_json::Value> {
    records
}

fn to_values<T: Serialize>(rows: Vec<T>) -> ServiceResult<Vec<serde_json::Value>> {
    rows.iter()
        .map(|row| serde_json::to_value(row).map_err(Into::into))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test_log::test]
    fn test_push_batch_echoes_input_unchanged() {
        let batch = vec![
            json!({"id": "0198c7b2", "name": "Ana"}),
            json!({"id": "0198c7b3", "name": "Bruno"}),
        ];

        assert_eq!(push_batch(batch.clone()), batch);
        assert!(push_batch(Vec::new()).is_empty());
    }

    #[test_log::test]
    fn test_delta_serializes_with_both_lists() {
        let delta = SyncDelta {
            changed: vec![json!({"id": "abc"})],
            deleted: Vec::new(),
        };

        let value = serde_json::to_value(&delta).expect("serializable");
        assert_eq!(value["changed"][0]["id"], "abc");
        assert!(value["deleted"].as_array().expect("array").is_empty());
    }
}
