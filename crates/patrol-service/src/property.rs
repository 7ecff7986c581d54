//! Property lifecycle: validation, creation, updates, and cascading
//! deletion over the property's vehicle links.

use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde::Deserialize;

use patrol_core::types::SyncTable;
use patrol_db::db::connection::DbConnection;
use patrol_db::db::{query, schema};
use patrol_db::model::property::{NewProperty, Property, PropertyChangeset};
use patrol_db::model::property_vehicle::PropertyVehicle;

use crate::error::{ServiceError, ServiceResult};
use crate::tombstone;

pub const MAX_CODE_LENGTH: usize = 64;
pub const MAX_OWNER_LENGTH: usize = 255;

/// Request payload for creating or updating a property.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyInput {
    pub code: String,
    pub owner_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Result of a property update.
#[derive(Debug)]
pub enum PropertyUpdateOutcome {
    Updated(Property),
    NotFound,
}

/// Result of a property deletion.
#[derive(Debug, PartialEq, Eq)]
pub enum PropertyDeleteOutcome {
    Deleted,
    NotFound,
    /// The property still has recorded visits; deleting it would orphan the
    /// visit history, so the caller gets a conflict instead of a cascade.
    HasVisits,
}

/// ## Summary
/// Validates a property payload against the field rules.
///
/// ## Errors
/// Returns a validation error naming the first failing field.
pub fn validate(input: &PropertyInput) -> ServiceResult<()> {
    if input.code.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "The code field is required".to_string(),
        ));
    }
    if input.code.len() > MAX_CODE_LENGTH {
        return Err(ServiceError::ValidationError(format!(
            "The code field must have at most {MAX_CODE_LENGTH} characters"
        )));
    }

    if input.owner_name.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "The owner name field is required".to_string(),
        ));
    }
    if input.owner_name.len() > MAX_OWNER_LENGTH {
        return Err(ServiceError::ValidationError(format!(
            "The owner name field must have at most {MAX_OWNER_LENGTH} characters"
        )));
    }

    if !(-90.0..=90.0).contains(&input.latitude) {
        return Err(ServiceError::ValidationError(
            "Latitude must be between -90 and 90".to_string(),
        ));
    }
    if !(-180.0..=180.0).contains(&input.longitude) {
        return Err(ServiceError::ValidationError(
            "Longitude must be between -180 and 180".to_string(),
        ));
    }

    Ok(())
}

/// ## Summary
/// Validates the payload and inserts a new property.
///
/// ## Errors
/// Returns a validation error for bad input or an already-registered code,
/// or a database error if the insert fails.
#[tracing::instrument(skip(conn, input), fields(code = %input.code))]
pub async fn create_property(
    conn: &mut DbConnection<'_>,
    input: &PropertyInput,
) -> ServiceResult<Property> {
    validate(input)?;

    let existing = query::properties::by_code(&input.code)
        .select(Property::as_select())
        .first::<Property>(conn)
        .await
        .optional()?;

    if existing.is_some() {
        return Err(ServiceError::ValidationError(
            "This property code is already in use".to_string(),
        ));
    }

    let new_property = NewProperty {
        id: uuid::Uuid::now_v7(),
        code: &input.code,
        owner_name: &input.owner_name,
        latitude: input.latitude,
        longitude: input.longitude,
    };

    let property = diesel::insert_into(schema::properties::table)
        .values(&new_property)
        .returning(Property::as_select())
        .get_result::<Property>(conn)
        .await?;

    tracing::info!(property_id = %property.id, "Property created");

    Ok(property)
}

/// ## Summary
/// Validates the payload and updates an existing property, bumping
/// `updated_at` so the row surfaces in the next sync delta.
///
/// ## Errors
/// Returns a validation error for bad input or a code owned by another
/// property, or a database error if the update fails.
#[tracing::instrument(skip(conn, input), fields(property_id = %id))]
pub async fn update_property(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    input: &PropertyInput,
) -> ServiceResult<PropertyUpdateOutcome> {
    validate(input)?;

    let holder = query::properties::by_code(&input.code)
        .select(Property::as_select())
        .first::<Property>(conn)
        .await
        .optional()?;

    if let Some(holder) = holder
        && holder.id != id
    {
        return Err(ServiceError::ValidationError(
            "This property code is already in use".to_string(),
        ));
    }

    let existing = query::properties::by_id(id)
        .select(Property::as_select())
        .first::<Property>(conn)
        .await
        .optional()?;

    if existing.is_none() {
        return Ok(PropertyUpdateOutcome::NotFound);
    }

    let changeset = PropertyChangeset {
        code: &input.code,
        owner_name: &input.owner_name,
        latitude: input.latitude,
        longitude: input.longitude,
        updated_at: chrono::Utc::now(),
    };

    let property = diesel::update(schema::properties::table.find(id))
        .set(&changeset)
        .returning(Property::as_select())
        .get_result::<Property>(conn)
        .await?;

    tracing::info!(property_id = %property.id, "Property updated");

    Ok(PropertyUpdateOutcome::Updated(property))
}

/// ## Summary
/// Deletes a property and its vehicle links, mirroring every removal in the
/// tombstone ledger.
///
/// Runs in one transaction with the same ordering as user deletion: all
/// ledger entries first, then the deletes. Properties with recorded visits
/// are refused rather than cascaded.
///
/// ## Errors
/// Returns a database error if any step fails; the transaction rolls back.
#[tracing::instrument(skip(conn), fields(property_id = %id))]
pub async fn delete_property(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> ServiceResult<PropertyDeleteOutcome> {
    conn.transaction::<_, ServiceError, _>(move |tx| {
        async move {
            let property = query::properties::by_id(id)
                .select(Property::as_select())
                .first::<Property>(tx)
                .await
                .optional()?;

            if property.is_none() {
                return Ok(PropertyDeleteOutcome::NotFound);
            }

            let visit_count: i64 = query::visits::for_property(id)
                .count()
                .get_result::<i64>(tx)
                .await?;

            if visit_count > 0 {
                return Ok(PropertyDeleteOutcome::HasVisits);
            }

            let vehicles = query::property_vehicles::for_property(id)
                .select(PropertyVehicle::as_select())
                .load::<PropertyVehicle>(tx)
                .await?;
            let vehicle_ids: Vec<uuid::Uuid> = vehicles.iter().map(|v| v.id).collect();

            // Ledger first, deletes after.
            tombstone::record_deletion(tx, SyncTable::Properties, id).await?;
            tombstone::record_deletions(tx, SyncTable::PropertyVehicles, &vehicle_ids).await?;

            diesel::delete(
                schema::property_vehicles::table
                    .filter(schema::property_vehicles::fk_property_id.eq(id)),
            )
            .execute(tx)
            .await?;

            diesel::delete(schema::properties::table.find(id))
                .execute(tx)
                .await?;

            tracing::info!(
                dependents = vehicle_ids.len(),
                "Property and vehicle links deleted"
            );

            Ok(PropertyDeleteOutcome::Deleted)
        }
        .scope_boxed()
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(code: &str, owner: &str, lat: f64, lon: f64) -> PropertyInput {
        PropertyInput {
            code: code.to_string(),
            owner_name: owner.to_string(),
            latitude: lat,
            longitude: lon,
        }
    }

    #[test_log::test]
    fn test_valid_input_passes() {
        assert!(validate(&input("FAZ-0042", "Carlos Lima", -21.78, -48.17)).is_ok());
    }

    #[test_log::test]
    fn test_code_is_required() {
        assert!(validate(&input("", "Carlos Lima", 0.0, 0.0)).is_err());
    }

    #[test_log::test]
    fn test_coordinates_are_bounded() {
        assert!(validate(&input("FAZ-0042", "Carlos", 90.5, 0.0)).is_err());
        assert!(validate(&input("FAZ-0042", "Carlos", 0.0, -180.5)).is_err());
        assert!(validate(&input("FAZ-0042", "Carlos", -90.0, 180.0)).is_ok());
    }
}
