use std::io;
use thiserror::Error;

use domain::{color::ColorKey, error::DomainError, template::TemplateId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Template not found: {id}")]
    TemplateNotFound { id: TemplateId },

    #[error("Template {id} has no color {color}")]
    UnknownColor { id: TemplateId, color: ColorKey },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Codec error: {message}")]
    CodecError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

pub type AppResult<T> = Result<T, AppError>;
