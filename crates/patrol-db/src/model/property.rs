use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

#[derive(Debug, Clone, PartialEq, Identifiable, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = schema::properties)]
#[diesel(check_for_backend(Pg))]
pub struct Property {
    pub id: uuid::Uuid,
    pub code: String,
    pub owner_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::properties)]
pub struct NewProperty<'a> {
    pub id: uuid::Uuid,
    pub code: &'a str,
    pub owner_name: &'a str,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::properties)]
pub struct PropertyChangeset<'a> {
    pub code: &'a str,
    pub owner_name: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Trimmed view of a property for visit summaries.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = schema::properties)]
#[diesel(check_for_backend(Pg))]
pub struct PropertyLocation {
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
}
