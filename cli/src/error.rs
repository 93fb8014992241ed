use std::io;
use thiserror::Error;

use domain::error::DomainError;
use tile_overlay_application::error::AppError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No template matches '{0}'")]
    UnknownTemplate(String),

    #[error("'{query}' matches {count} templates, use the list position or id")]
    AmbiguousTemplate { query: String, count: usize },
}

impl From<DomainError> for CliError {
    fn from(error: DomainError) -> Self {
        Self::App(error.into())
    }
}

pub type CliResult<T> = Result<T, CliError>;
