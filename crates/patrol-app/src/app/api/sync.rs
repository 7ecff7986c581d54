//! Differential sync endpoints.
//!
//! One logical endpoint, two explicit operations dispatched by method:
//! `GET /api/sync/{table}` pulls the delta since the client's `last_date`
//! watermark, `POST /api/sync/{table}` acknowledges a pushed batch. Both
//! cases of the pull (with and without watermark) use the same
//! `{ changed, deleted }` envelope.

use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use tracing::error;

use patrol_core::constants::SYNC_ROUTE_COMPONENT;
use patrol_core::types::SyncTable;
use patrol_service::sync::{parse_watermark, pull_delta, push_batch};

use super::{ErrorResponse, render_service_error};
use crate::db_handler::get_db_from_depot;

/// ## Summary
/// GET /`api/sync/{table`} - Pull the delta since `last_date`
///
/// Without `last_date` the response is a full snapshot: every current row in
/// `changed` and an empty `deleted` list. With it, both lists contain only
/// entries with `updated_at` strictly greater than the watermark. Clients
/// resend the greatest `updated_at` they have seen, verbatim.
///
/// ## Errors
/// Returns HTTP 400 for an unknown table or unparseable `last_date`
/// Returns HTTP 500 if database operations fail
#[handler]
async fn pull_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(table) = parse_table_param(req, res) else {
        return;
    };

    let watermark = match req.query::<String>("last_date") {
        Some(raw) => match parse_watermark(&raw) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                res.status_code(StatusCode::BAD_REQUEST);
                res.render(Json(ErrorResponse {
                    error: e.to_string(),
                }));
                return;
            }
        },
        None => None,
    };

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
            return;
        }
    };

    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse {
                error: "Database unavailable".to_string(),
            }));
            return;
        }
    };

    match pull_delta(&mut conn, table, watermark).await {
        Ok(delta) => res.render(Json(delta)),
        Err(e) => render_service_error(res, &e),
    }
}

/// ## Summary
/// POST /`api/sync/{table`} - Acknowledge a pushed batch
///
/// The body is echoed back unchanged as the acknowledgment; this path does
/// not touch the tombstone ledger.
///
/// ## Errors
/// Returns HTTP 400 for an unknown table or a body that is not a JSON array
#[handler]
async fn push_handler(req: &mut Request, res: &mut Response) {
    if parse_table_param(req, res).is_none() {
        return;
    }

    let records: Vec<serde_json::Value> = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse pushed batch");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse {
                error: "Invalid request body".to_string(),
            }));
            return;
        }
    };

    res.render(Json(push_batch(records)));
}

fn parse_table_param(req: &Request, res: &mut Response) -> Option<SyncTable> {
    let Some(table_str) = req.param::<String>("table") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse {
            error: "Sync table required".to_string(),
        }));
        return None;
    };

    match table_str.parse::<SyncTable>() {
        Ok(table) => Some(table),
        Err(e) => {
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse {
                error: e.to_string(),
            }));
            None
        }
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(const_str::concat!(SYNC_ROUTE_COMPONENT, "/<table>"))
        .get(pull_handler)
        .post(push_handler)
}
