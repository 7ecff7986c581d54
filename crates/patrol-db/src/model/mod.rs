pub mod property;
pub mod property_vehicle;
pub mod tombstone;
pub mod user;
pub mod user_visit;
pub mod visit;
