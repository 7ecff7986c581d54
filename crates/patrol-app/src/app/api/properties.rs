use diesel::{OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::Serialize;
use tracing::error;

use patrol_core::constants::{PAGE_SIZE, PROPERTIES_ROUTE_COMPONENT};
use patrol_db::db::query;
use patrol_db::model::property::Property;
use patrol_db::model::property_vehicle::PropertyVehicle;
use patrol_service::property::{PropertyDeleteOutcome, PropertyInput, PropertyUpdateOutcome};

use super::{ErrorResponse, last_page, page_offset, render_service_error};
use crate::db_handler::get_db_from_depot;

/// ## Summary
/// Paginated property listing response
#[derive(Debug, Serialize)]
pub struct PropertyIndexResponse {
    pub properties: Vec<Property>,
    pub total: i64,
    pub page: i64,
    pub last_page: i64,
    pub search: Option<String>,
}

/// ## Summary
/// Single-property response payload
#[derive(Debug, Serialize)]
pub struct PropertyEnvelope {
    pub property: Property,
}

/// ## Summary
/// Property with its registered vehicles, for the show endpoint
#[derive(Debug, Serialize)]
pub struct PropertyShowResponse {
    pub property: Property,
    pub vehicles: Vec<PropertyVehicle>,
}

/// ## Summary
/// GET /api/properties - Paginated listing with search and sort
///
/// `search` filters by case-insensitive substring on code or owner name,
/// `sort` is `asc` (default) or `desc` on code, `page` is 1-based with 25
/// rows per page.
///
/// ## Errors
/// Returns HTTP 500 if database operations fail
#[handler]
async fn index_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let search = req.query::<String>("search");
    let descending = req
        .query::<String>("sort")
        .is_some_and(|sort| sort.eq_ignore_ascii_case("desc"));
    let page = req.query::<i64>("page").unwrap_or(1).max(1);

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

    let total = match query::properties::listing(search.as_deref(), descending)
        .count()
        .get_result::<i64>(&mut conn)
        .await
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = ?e, "Failed to count properties");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
            return;
        }
    };

    let properties = match query::properties::listing(search.as_deref(), descending)
        .select(Property::as_select())
        .offset(page_offset(page))
        .limit(PAGE_SIZE)
        .load::<Property>(&mut conn)
        .await
    {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to list properties");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
            return;
        }
    };

    res.render(Json(PropertyIndexResponse {
        properties,
        total,
        page,
        last_page: last_page(total),
        search,
    }));
}

/// ## Summary
/// POST /api/properties - Create a new property
///
/// ## Errors
/// Returns HTTP 400 for an invalid body, failed validation, or a code
/// already in use
/// Returns HTTP 500 if database operations fail
#[handler]
async fn store_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let input: PropertyInput = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse create property request");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse {
                error: "Invalid request body".to_string(),
            }));
            return;
        }
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

    match patrol_service::property::create_property(&mut conn, &input).await {
        Ok(property) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(PropertyEnvelope { property }));
        }
        Err(e) => render_service_error(res, &e),
    }
}

/// ## Summary
/// GET /`api/properties/{id`} - Property details with registered vehicles
///
/// ## Errors
/// Returns HTTP 400 for a malformed id
/// Returns HTTP 404 if the property does not exist
/// Returns HTTP 500 if database operations fail
#[handler]
async fn show_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(id) = parse_id_param(req, res) else {
        return;
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

    let property = match query::properties::by_id(id)
        .select(Property::as_select())
        .first::<Property>(&mut conn)
        .await
        .optional()
    {
        Ok(Some(p)) => p,
        Ok(None) => {
            res.status_code(StatusCode::NOT_FOUND);
            res.render(Json(ErrorResponse {
                error: "Property not found".to_string(),
            }));
            return;
        }
        Err(e) => {
            error!(error = ?e, "Failed to query property");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
            return;
        }
    };

    match query::property_vehicles::for_property(id)
        .select(PropertyVehicle::as_select())
        .load::<PropertyVehicle>(&mut conn)
        .await
    {
        Ok(vehicles) => res.render(Json(PropertyShowResponse { property, vehicles })),
        Err(e) => {
            error!(error = ?e, "Failed to query property vehicles");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
        }
    }
}

/// ## Summary
/// PUT /`api/properties/{id`} - Update a property
///
/// ## Errors
/// Returns HTTP 400 for a malformed id or body, failed validation, or a
/// code owned by another property
/// Returns HTTP 404 if the property does not exist
/// Returns HTTP 500 if database operations fail
#[handler]
async fn update_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(id) = parse_id_param(req, res) else {
        return;
    };

    let input: PropertyInput = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse update property request");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse {
                error: "Invalid request body".to_string(),
            }));
            return;
        }
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

    match patrol_service::property::update_property(&mut conn, id, &input).await {
        Ok(PropertyUpdateOutcome::Updated(property)) => {
            res.render(Json(PropertyEnvelope { property }));
        }
        Ok(PropertyUpdateOutcome::NotFound) => {
            res.status_code(StatusCode::NOT_FOUND);
            res.render(Json(ErrorResponse {
                error: "Property not found".to_string(),
            }));
        }
        Err(e) => render_service_error(res, &e),
    }
}

/// ## Summary
/// DELETE /`api/properties/{id`} - Delete a property and its vehicle links
///
/// Every removed row is mirrored in the tombstone ledger before it is
/// deleted. Properties that still have recorded visits are refused with a
/// conflict.
///
/// ## Errors
/// Returns HTTP 400 for a malformed id
/// Returns HTTP 404 if the property does not exist
/// Returns HTTP 409 if the property still has visits
/// Returns HTTP 500 if database operations fail
#[handler]
async fn destroy_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(id) = parse_id_param(req, res) else {
        return;
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

    match patrol_service::property::delete_property(&mut conn, id).await {
        Ok(PropertyDeleteOutcome::Deleted) => {
            res.status_code(StatusCode::NO_CONTENT);
        }
        Ok(PropertyDeleteOutcome::NotFound) => {
            res.status_code(StatusCode::NOT_FOUND);
            res.render(Json(ErrorResponse {
                error: "Property not found".to_string(),
            }));
        }
        Ok(PropertyDeleteOutcome::HasVisits) => {
            res.status_code(StatusCode::CONFLICT);
            res.render(Json(ErrorResponse {
                error: "Property still has recorded visits".to_string(),
            }));
        }
        Err(e) => render_service_error(res, &e),
    }
}

fn parse_id_param(req: &Request, res: &mut Response) -> Option<uuid::Uuid> {
    let Some(id_str) = req.param::<String>("id") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse {
            error: "Property ID required".to_string(),
        }));
        return None;
    };

    match uuid::Uuid::parse_str(&id_str) {
        Ok(id) => Some(id),
        Err(_) => {
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse {
                error: "Invalid property ID format".to_string(),
            }));
            None
        }
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(PROPERTIES_ROUTE_COMPONENT)
        .get(index_handler)
        .post(store_handler)
        .push(
            Router::with_path("<id>")
                .get(show_handler)
                .put(update_handler)
                .delete(destroy_handler),
        )
}
