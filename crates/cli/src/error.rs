use portfolio_analyzer_core::errors::CoreError;
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Core(CoreError::InvalidDate(_) | CoreError::ValidationError(_)) => 2,
            Self::Core(_) => 3,
            Self::Io(_) => 10,
        }
    }
}
