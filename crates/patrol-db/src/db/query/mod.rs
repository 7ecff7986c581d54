pub mod properties;
pub mod property_vehicles;
pub mod tombstones;
pub mod user_visits;
pub mod users;
pub mod visits;
