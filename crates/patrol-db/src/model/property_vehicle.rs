use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

/// Vehicle registered at a property.
#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::property_vehicles)]
#[diesel(check_for_backend(Pg))]
pub struct PropertyVehicle {
    pub id: uuid::Uuid,
    pub fk_property_id: uuid::Uuid,
    pub color: String,
    pub plate: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
