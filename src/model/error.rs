use crate::solver::{DataError, SettingsError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type for misuse of the model API
pub enum ModelError {
    /// An expression with this name already exists
    #[error("Duplicate expression name \"{0}\"")]
    DuplicateExpression(String),
    /// No variable has this index
    #[error("Unknown variable index {0}")]
    UnknownVariable(usize),
    /// No expression has this name
    #[error("Unknown expression \"{0}\"")]
    UnknownExpression(String),
    /// None of the configured solver integrations can handle the model
    #[error("No solver integration is capable of solving this model")]
    NoCapableIntegration,
    /// A starting point does not have one value per variable
    #[error("Starting point has {found} values, expected {expected}")]
    StartingPointLength { expected: usize, found: usize },
    /// The solver has released its data
    #[error("Solver has been disposed")]
    Disposed,
    /// Building numeric solver data failed
    #[error("Solver data error: {0}")]
    Data(#[from] DataError),
    /// Invalid solver settings
    #[error("Solver settings error: {0}")]
    Settings(#[from] SettingsError),
}
