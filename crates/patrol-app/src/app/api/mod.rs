mod healthcheck;
mod properties;
mod sync;
mod users;

use salvo::Router;
use salvo::http::StatusCode;
use salvo::writing::Json;
use serde::Serialize;

use patrol_core::constants::{API_ROUTE_COMPONENT, PAGE_SIZE};
use patrol_core::error::CoreError;
use patrol_service::error::ServiceError;

/// ## Summary
/// Error response payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// ## Summary
/// Constructs the main API router.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .push(healthcheck::routes())
        .push(sync::routes())
        .push(users::routes())
        .push(properties::routes())
}

/// ## Summary
/// Row offset of a 1-based listing page.
///
/// Saturating so an absurd client-supplied page number cannot wrap the
/// multiplication.
pub(crate) fn page_offset(page: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(PAGE_SIZE)
}

/// ## Summary
/// Index of the last listing page for `total` rows.
pub(crate) fn last_page(total: i64) -> i64 {
    // `i64::div_ceil` is unstable (`int_roundings`); this is the same
    // round-toward-positive-infinity division.
    let quotient = total / PAGE_SIZE;
    let remainder = total % PAGE_SIZE;
    if remainder != 0 && (remainder > 0) == (PAGE_SIZE > 0) {
        quotient + 1
    } else {
        quotient
    }
}

/// ## Summary
/// Renders a service error as the JSON error envelope.
///
/// Client input problems map to 400, missing records to 404, refusals to
/// 409; everything else is a 500 with minimal detail. Nothing escapes to the
/// transport layer as an unhandled fault.
pub(crate) fn render_service_error(res: &mut salvo::Response, err: &ServiceError) {
    let (status, message) = match err {
        ServiceError::ValidationError(msg) | ServiceError::ParseError(msg) => {
            (StatusCode::BAD_REQUEST, msg.clone())
        }
        ServiceError::CoreError(CoreError::ParseError(msg) | CoreError::ValidationError(msg)) => {
            (StatusCode::BAD_REQUEST, msg.clone())
        }
        ServiceError::NotFound(msg) | ServiceError::CoreError(CoreError::NotFound(msg)) => {
            (StatusCode::NOT_FOUND, msg.clone())
        }
        ServiceError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        _ => {
            tracing::error!(error = %err, "Request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    };

    res.status_code(status);
    res.render(Json(ErrorResponse { error: message }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_page_offset_is_zero_based_in_rows() {
        assert_eq!(page_offset(1), 0);
        assert_eq!(page_offset(2), PAGE_SIZE);
        assert_eq!(page_offset(5), 4 * PAGE_SIZE);
    }

    #[test_log::test]
    fn test_page_offset_saturates_instead_of_wrapping() {
        assert_eq!(page_offset(i64::MAX), i64::MAX);
    }

    #[test_log::test]
    fn test_last_page_rounds_up() {
        assert_eq!(last_page(0), 0);
        assert_eq!(last_page(1), 1);
        assert_eq!(last_page(PAGE_SIZE), 1);
        assert_eq!(last_page(PAGE_SIZE + 1), 2);
        assert_eq!(last_page(3 * PAGE_SIZE - 1), 3);
    }
}
