use thiserror::Error;

/// Application-level errors (HTTP layer)
///
/// Service errors never reach this type; handlers render them straight into
/// the JSON error envelope. What remains is depot wiring faults.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    CoreError(#[from] patrol_core::error::CoreError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
