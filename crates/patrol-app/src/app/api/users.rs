use diesel::{OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::Serialize;
use tracing::error;

use patrol_core::constants::{PAGE_SIZE, USERS_ROUTE_COMPONENT};
use patrol_db::db::query;
use patrol_db::model::user::User;
use patrol_service::user::{
    UserDeleteOutcome, UserInput, UserName, UserUpdateOutcome, VisitSummary,
};

use super::{ErrorResponse, last_page, page_offset, render_service_error};
use crate::db_handler::get_db_from_depot;

/// ## Summary
/// Paginated user listing response
#[derive(Debug, Serialize)]
pub struct UserIndexResponse {
    pub users: Vec<User>,
    pub total: i64,
    pub page: i64,
    pub last_page: i64,
    pub search: Option<String>,
}

/// ## Summary
/// Single-user response payload
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: User,
}

/// ## Summary
/// User with its visit summaries, for the show endpoint
#[derive(Debug, Serialize)]
pub struct UserShowResponse {
    pub user: User,
    pub visits: Vec<VisitSummary>,
}

/// ## Summary
/// Names listing response
#[derive(Debug, Serialize)]
pub struct UserNamesResponse {
    pub users: Vec<UserName>,
}

/// ## Summary
/// GET /api/users - Paginated listing with search and sort
///
/// `search` filters by case-insensitive substring on name or email, `sort`
/// is `asc` (default) or `desc` on name, `page` is 1-based with 25 rows per
/// page.
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

    let total = match query::users::listing(search.as_deref(), descending)
        .count()
        .get_result::<i64>(&mut conn)
        .await
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = ?e, "Failed to count users");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
            return;
        }
    };

    let users = match query::users::listing(search.as_deref(), descending)
        .select(User::as_select())
        .offset(page_offset(page))
        .limit(PAGE_SIZE)
        .load::<User>(&mut conn)
        .await
    {
        Ok(u) => u,
        Err(e) => {
            error!(error = ?e, "Failed to list users");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
            return;
        }
    };

    res.render(Json(UserIndexResponse {
        users,
        total,
        page,
        last_page: last_page(total),
        search,
    }));
}

/// ## Summary
/// POST /api/users - Create a new user
///
/// ## Errors
/// Returns HTTP 400 for an invalid body, failed validation, or an email
/// already in use
/// Returns HTTP 500 if database operations fail
#[handler]
async fn store_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let input: UserInput = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse create user request");
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

    match patrol_service::user::create_user(&mut conn, &input).await {
        Ok(user) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(UserEnvelope { user }));
        }
        Err(e) => render_service_error(res, &e),
    }
}

/// ## Summary
/// GET /`api/users/{id`} - User details with visit summaries
///
/// ## Errors
/// Returns HTTP 400 for a malformed id
/// Returns HTTP 404 if the user does not exist
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

    // Missing rows become an explicit 404 branch, never a fault.
    let user = match query::users::by_id(id)
        .select(User::as_select())
        .first::<User>(&mut conn)
        .await
        .optional()
    {
        Ok(Some(u)) => u,
        Ok(None) => {
            res.status_code(StatusCode::NOT_FOUND);
            res.render(Json(ErrorResponse {
                error: "User not found".to_string(),
            }));
            return;
        }
        Err(e) => {
            error!(error = ?e, "Failed to query user");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
            return;
        }
    };

    match patrol_service::user::visit_summaries(&mut conn, id).await {
        Ok(visits) => res.render(Json(UserShowResponse { user, visits })),
        Err(e) => render_service_error(res, &e),
    }
}

/// ## Summary
/// PUT /`api/users/{id`} - Update a user
///
/// ## Errors
/// Returns HTTP 400 for a malformed id or body, failed validation, or an
/// email owned by another user
/// Returns HTTP 404 if the user does not exist
/// Returns HTTP 500 if database operations fail
#[handler]
async fn update_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(id) = parse_id_param(req, res) else {
        return;
    };

    let input: UserInput = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse update user request");
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

    match patrol_service::user::update_user(&mut conn, id, &input).await {
        Ok(UserUpdateOutcome::Updated(user)) => {
            res.render(Json(UserEnvelope { user }));
        }
        Ok(UserUpdateOutcome::NotFound) => {
            res.status_code(StatusCode::NOT_FOUND);
            res.render(Json(ErrorResponse {
                error: "User not found".to_string(),
            }));
        }
        Err(e) => render_service_error(res, &e),
    }
}

/// ## Summary
/// DELETE /`api/users/{id`} - Delete a user and its visit memberships
///
/// Every removed row is mirrored in the tombstone ledger before it is
/// deleted, so sync clients can retract their cached copies.
///
/// ## Errors
/// Returns HTTP 400 for a malformed id
/// Returns HTTP 404 if the user does not exist
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

    match patrol_service::user::delete_user(&mut conn, id).await {
        Ok(UserDeleteOutcome::Deleted) => {
            res.status_code(StatusCode::NO_CONTENT);
        }
        Ok(UserDeleteOutcome::NotFound) => {
            res.status_code(StatusCode::NOT_FOUND);
            res.render(Json(ErrorResponse {
                error: "User not found".to_string(),
            }));
        }
        Err(e) => render_service_error(res, &e),
    }
}

/// ## Summary
/// GET /api/users/names - Id and name of every user
///
/// ## Errors
/// Returns HTTP 500 if database operations fail
#[handler]
async fn names_handler(depot: &mut Depot, res: &mut Response) {
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

    match patrol_service::user::names(&mut conn).await {
        Ok(users) => res.render(Json(UserNamesResponse { users })),
        Err(e) => render_service_error(res, &e),
    }
}

fn parse_id_param(req: &Request, res: &mut Response) -> Option<uuid::Uuid> {
    let Some(id_str) = req.param::<String>("id") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse {
            error: "User ID required".to_string(),
        }));
        return None;
    };

    match uuid::Uuid::parse_str(&id_str) {
        Ok(id) => Some(id),
        Err(_) => {
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse {
                error: "Invalid user ID format".to_string(),
            }));
            None
        }
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(USERS_ROUTE_COMPONENT)
        .get(index_handler)
        .post(store_handler)
        .push(Router::with_path("names").get(names_handler))
        .push(
            Router::with_path("<id>")
                .get(show_handler)
                .put(update_handler)
                .delete(destroy_handler),
        )
}
