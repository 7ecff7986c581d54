//! User lifecycle: validation, creation, updates, cascading deletion, and
//! the visit summaries served by the show endpoint.

use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};

use patrol_core::types::SyncTable;
use patrol_db::db::connection::DbConnection;
use patrol_db::db::{query, schema};
use patrol_db::model::property::PropertyLocation;
use patrol_db::model::user::{NewUser, User, UserChangeset};
use patrol_db::model::user_visit::UserVisit;
use patrol_db::model::visit::Visit;

use crate::error::{ServiceError, ServiceResult};
use crate::tombstone;

pub mod password;

pub const MAX_FIELD_LENGTH: usize = 255;
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Request payload for creating or updating a user.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Result of a user update.
#[derive(Debug)]
pub enum UserUpdateOutcome {
    Updated(User),
    NotFound,
}

/// Result of a user deletion.
#[derive(Debug, PartialEq, Eq)]
pub enum UserDeleteOutcome {
    Deleted,
    NotFound,
}

/// One row of the show endpoint's visit listing: who went and where.
#[derive(Debug, Serialize)]
pub struct VisitSummary {
    pub garrison: Vec<String>,
    pub property: PropertyLocation,
}

/// Id/name pair for the names listing.
#[derive(Debug, Serialize)]
pub struct UserName {
    pub id: uuid::Uuid,
    pub name: String,
}

/// ## Summary
/// Validates a user payload against the field rules.
///
/// ## Errors
/// Returns a validation error naming the first failing field.
pub fn validate(input: &UserInput) -> ServiceResult<()> {
    if input.name.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "The name field is required".to_string(),
        ));
    }
    if input.name.len() > MAX_FIELD_LENGTH {
        return Err(ServiceError::ValidationError(format!(
            "The name field must have at most {MAX_FIELD_LENGTH} characters"
        )));
    }

    if input.email.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "The e-mail field is required".to_string(),
        ));
    }
    if input.email.len() > MAX_FIELD_LENGTH {
        return Err(ServiceError::ValidationError(format!(
            "The e-mail field must have at most {MAX_FIELD_LENGTH} characters"
        )));
    }
    if !is_valid_email(&input.email) {
        return Err(ServiceError::ValidationError(
            "This e-mail format is invalid".to_string(),
        ));
    }

    if input.password.len() < MIN_PASSWORD_LENGTH || input.password.len() > MAX_FIELD_LENGTH {
        return Err(ServiceError::ValidationError(format!(
            "The password must have between {MIN_PASSWORD_LENGTH} and {MAX_FIELD_LENGTH} characters"
        )));
    }

    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// ## Summary
/// Validates the payload, hashes the password, and inserts a new user.
///
/// ## Errors
/// Returns a validation error for bad input or an already-registered email,
/// or a database error if the insert fails.
#[tracing::instrument(skip(conn, input), fields(email = %input.email))]
pub async fn create_user(conn: &mut DbConnection<'_>, input: &UserInput) -> ServiceResult<User> {
    validate(input)?;

    let existing = query::users::by_email(&input.email)
        .select(User::as_select())
        .first::<User>(conn)
        .await
        .optional()?;

    if existing.is_some() {
        return Err(ServiceError::ValidationError(
            "This e-mail is already in use".to_string(),
        ));
    }

    let password_hash = password::hash_password(&input.password)?;

    let new_user = NewUser {
        id: uuid::Uuid::now_v7(),
        name: &input.name,
        email: &input.email,
        password_hash: &password_hash,
    };

    let user = diesel::insert_into(schema::users::table)
        .values(&new_user)
        .returning(User::as_select())
        .get_result::<User>(conn)
        .await?;

    tracing::info!(user_id = %user.id, "User created");

    Ok(user)
}

/// ## Summary
/// Validates the payload and updates an existing user, bumping `updated_at`
/// so the row surfaces in the next sync delta.
///
/// Email uniqueness excludes the user itself, so resubmitting the current
/// email is fine.
///
/// ## Errors
/// Returns a validation error for bad input or an email owned by another
/// user, or a database error if the update fails.
#[tracing::instrument(skip(conn, input), fields(user_id = %id))]
pub async fn update_user(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
    input: &UserInput,
) -> ServiceResult<UserUpdateOutcome> {
    validate(input)?;

    let holder = query::users::by_email(&input.email)
        .select(User::as_select())
        .first::<User>(conn)
        .await
        .optional()?;

    if let Some(holder) = holder
        && holder.id != id
    {
        return Err(ServiceError::ValidationError(
            "This e-mail is already in use".to_string(),
        ));
    }

    let existing = query::users::by_id(id)
        .select(User::as_select())
        .first::<User>(conn)
        .await
        .optional()?;

    if existing.is_none() {
        return Ok(UserUpdateOutcome::NotFound);
    }

    let password_hash = password::hash_password(&input.password)?;

    let changeset = UserChangeset {
        name: &input.name,
        email: &input.email,
        password_hash: &password_hash,
        updated_at: chrono::Utc::now(),
    };

    let user = diesel::update(schema::users::table.find(id))
        .set(&changeset)
        .returning(User::as_select())
        .get_result::<User>(conn)
        .await?;

    tracing::info!(user_id = %user.id, "User updated");

    Ok(UserUpdateOutcome::Updated(user))
}

/// ## Summary
/// Deletes a user and its visit-participation rows, mirroring every removal
/// in the tombstone ledger.
///
/// Runs in one transaction. Ledger entries for the user and for each
/// dependent `user_visits` row are written before any row is deleted, so a
/// failure at any point leaves either everything in place or nothing
/// observable; a sync client can never see a row vanish without a tombstone.
///
/// ## Errors
/// Returns a database error if any step fails; the transaction rolls back.
#[tracing::instrument(skip(conn), fields(user_id = %id))]
pub async fn delete_user(
    conn: &mut DbConnection<'_>,
    id: uuid::Uuid,
) -> ServiceResult<UserDeleteOutcome> {
    conn.transaction::<_, ServiceError, _>(move |tx| {
        async move {
            let user = query::users::by_id(id)
                .select(User::as_select())
                .first::<User>(tx)
                .await
                .optional()?;

            let Some(user) = user else {
                return Ok(UserDeleteOutcome::NotFound);
            };

            let memberships = query::user_visits::for_user(id)
                .select(UserVisit::as_select())
                .load::<UserVisit>(tx)
                .await?;
            let membership_ids: Vec<uuid::Uuid> = memberships.iter().map(|m| m.id).collect();

            // Ledger first: the parent and every dependent, before any row
            // is removed.
            tombstone::record_deletion(tx, SyncTable::Users, user.id).await?;
            tombstone::record_deletions(tx, SyncTable::UserVisits, &membership_ids).await?;

            diesel::delete(schema::user_visits::table.filter(schema::user_visits::fk_user_id.eq(id)))
                .execute(tx)
                .await?;

            diesel::delete(schema::users::table.find(id))
                .execute(tx)
                .await?;

            tracing::info!(
                dependents = membership_ids.len(),
                "User and visit memberships deleted"
            );

            Ok(UserDeleteOutcome::Deleted)
        }
        .scope_boxed()
    })
    .await
}

/// ## Summary
/// Assembles the visit summaries for a user: for each visit the user took
/// part in, the garrison names and the property location.
///
/// Visits or properties that disappeared under a racing delete are skipped
/// rather than treated as a fault.
///
/// ## Errors
/// Returns a database error if any lookup fails.
#[tracing::instrument(skip(conn))]
pub async fn visit_summaries(
    conn: &mut DbConnection<'_>,
    user_id: uuid::Uuid,
) -> ServiceResult<Vec<VisitSummary>> {
    let memberships = query::user_visits::for_user(user_id)
        .select(UserVisit::as_select())
        .load::<UserVisit>(conn)
        .await?;

    let mut summaries = Vec::with_capacity(memberships.len());

    for membership in memberships {
        let visit = query::visits::by_id(membership.fk_visit_id)
            .select(Visit::as_select())
            .first::<Visit>(conn)
            .await
            .optional()?;

        let Some(visit) = visit else {
            tracing::warn!(visit_id = %membership.fk_visit_id, "Visit row missing, skipping");
            continue;
        };

        let garrison_rows = query::user_visits::for_visit(visit.id)
            .select(UserVisit::as_select())
            .load::<UserVisit>(conn)
            .await?;

        let mut garrison = Vec::with_capacity(garrison_rows.len());
        for row in garrison_rows {
            let name = query::users::by_id(row.fk_user_id)
                .select(schema::users::name)
                .first::<String>(conn)
                .await
                .optional()?;

            if let Some(name) = name {
                garrison.push(name);
            }
        }

        let property = query::properties::by_id(visit.fk_property_id)
            .select(PropertyLocation::as_select())
            .first::<PropertyLocation>(conn)
            .await
            .optional()?;

        let Some(property) = property else {
            tracing::warn!(property_id = %visit.fk_property_id, "Property row missing, skipping");
            continue;
        };

        summaries.push(VisitSummary { garrison, property });
    }

    Ok(summaries)
}

/// ## Summary
/// Returns the id and name of every user.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn names(conn: &mut DbConnection<'_>) -> ServiceResult<Vec<UserName>> {
    let rows = schema::users::table
        .select((schema::users::id, schema::users::name))
        .order(schema::users::name.asc())
        .load::<(uuid::Uuid, String)>(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name)| UserName { id, name })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, email: &str, password: &str) -> UserInput {
        UserInput {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test_log::test]
    fn test_valid_input_passes() {
        assert!(validate(&input("Ana Souza", "ana@example.com", "long-enough")).is_ok());
    }

    #[test_log::test]
    fn test_name_is_required() {
        let err = validate(&input("  ", "ana@example.com", "long-enough"));
        assert!(matches!(err, Err(ServiceError::ValidationError(msg)) if msg.contains("name")));
    }

    #[test_log::test]
    fn test_name_length_cap() {
        let long = "x".repeat(MAX_FIELD_LENGTH + 1);
        assert!(validate(&input(&long, "ana@example.com", "long-enough")).is_err());
        let at_cap = "x".repeat(MAX_FIELD_LENGTH);
        assert!(validate(&input(&at_cap, "ana@example.com", "long-enough")).is_ok());
    }

    #[test_log::test]
    fn test_email_format() {
        for bad in ["not-an-email", "@example.com", "ana@", "ana@nodot", "a b@example.com"] {
            assert!(
                validate(&input("Ana", bad, "long-enough")).is_err(),
                "accepted {bad:?}"
            );
        }
        assert!(validate(&input("Ana", "ana.souza@mail.example.com", "long-enough")).is_ok());
    }

    #[test_log::test]
    fn test_password_bounds() {
        assert!(validate(&input("Ana", "ana@example.com", "short")).is_err());
        assert!(validate(&input("Ana", "ana@example.com", "12345678")).is_ok());
        let long = "x".repeat(MAX_FIELD_LENGTH + 1);
        assert!(validate(&input("Ana", "ana@example.com", &long)).is_err());
    }
}
