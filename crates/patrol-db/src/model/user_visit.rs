use diesel::{pg::Pg, prelude::*};
use serde::{Deserialize, Serialize};

use crate::db::schema;

/// Join row tying a user into a visit's garrison.
#[derive(
    Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable, Serialize, Deserialize,
)]
#[diesel(table_name = schema::user_visits)]
#[diesel(check_for_backend(Pg))]
pub struct UserVisit {
    pub id: uuid::Uuid,
    pub fk_user_id: uuid::Uuid,
    pub fk_visit_id: uuid::Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
