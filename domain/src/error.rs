use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Template out of bounds: {0}")]
    OutOfBounds(String),

    #[error("Coordinate out of range: {0}")]
    Range(String),

    #[error("Scale factor conflict: template {template} uses {found}, tile is drawn at {expected}")]
    ScaleFactorConflict {
        template: String,
        expected: u32,
        found: u32,
    },

    #[error("Invalid chunk key: {0}")]
    InvalidChunkKey(String),

    #[error("Invalid color key: {0}")]
    InvalidColorKey(String),

    #[error("Codec error: {0}")]
    CodecError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
