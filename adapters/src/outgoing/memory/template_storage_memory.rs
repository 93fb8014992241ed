use std::sync::{PoisonError, RwLock};

use tile_overlay_application::{
    error::AppResult, ports::outgoing::template_storage::TemplateStoragePort,
};

/// Storage that lives as long as the process. Useful for dry runs and tests.
#[derive(Default)]
pub struct MemoryTemplateStorageAdapter {
    document: RwLock<Option<String>>,
}

impl MemoryTemplateStorageAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: RwLock::new(Some(document.into())),
        }
    }
}

impl TemplateStoragePort for MemoryTemplateStorageAdapter {
    fn load(&self) -> AppResult<Option<String>> {
        Ok(self
            .document
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, document: &str) -> AppResult<()> {
        *self
            .document
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(document.to_string());
        Ok(())
    }
}
