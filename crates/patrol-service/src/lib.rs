pub mod error;
pub mod property;
pub mod sync;
pub mod tombstone;
pub mod user;
