use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use tile_overlay_application::{
    error::{AppError, AppResult},
    ports::outgoing::template_storage::TemplateStoragePort,
};

/// Keeps the templates document in a single JSON file.
///
/// Saves go through a sibling temp file and a rename, so a crash mid-write
/// leaves the previous document in place.
pub struct FileTemplateStorageAdapter {
    path: PathBuf,
}

impl FileTemplateStorageAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(ToOwned::to_owned)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TemplateStoragePort for FileTemplateStorageAdapter {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> AppResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(document) => {
                debug!("Loaded {} bytes of templates", document.len());
                Ok(Some(document))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::StorageError {
                message: format!("Failed to read {}: {e}", self.path.display()),
            }),
        }
    }

    #[instrument(skip(self, document), fields(path = %self.path.display(), bytes = document.len()))]
    fn save(&self, document: &str) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        fs::write(&temp, document).map_err(|e| AppError::StorageError {
            message: format!("Failed to write {}: {e}", temp.display()),
        })?;
        fs::rename(&temp, &self.path).map_err(|e| AppError::StorageError {
            message: format!("Failed to replace {}: {e}", self.path.display()),
        })?;

        debug!("Saved templates document");
        Ok(())
    }
}
