use crate::error::AppResult;
use std::sync::Arc;

/// Opaque home for the exported templates document. The core never interprets the medium.
pub trait TemplateStoragePort: Send + Sync {
    fn load(&self) -> AppResult<Option<String>>;
    fn save(&self, document: &str) -> AppResult<()>;
}

pub type DynTemplateStoragePort = Arc<dyn TemplateStoragePort>;
