use std::sync::Arc;

use domain::{
    color::ColorKey,
    coords::{Anchor, TileCoord},
    template::{Template, TemplateId},
};

use crate::{
    error::AppResult,
    templates::{
        service::{CreateTemplate, ImportSummary, PixelTarget},
        snapshot::{OverlappingChunk, TemplateSnapshot},
    },
};

/// Store mutations. Every successful call has already been persisted.
pub trait TemplateManagementUseCase: Send + Sync {
    fn create_template(&mut self, request: CreateTemplate) -> AppResult<Arc<Template>>;
    fn set_should_be_drawn(&mut self, id: TemplateId, enabled: bool) -> AppResult<()>;
    fn set_color_enabled(
        &mut self,
        id: TemplateId,
        color: ColorKey,
        enabled: bool,
    ) -> AppResult<()>;
    fn remove_template(&mut self, id: TemplateId) -> AppResult<Arc<Template>>;
    fn import_json(&mut self, json: &str) -> AppResult<ImportSummary>;
    fn load_from_storage(&mut self) -> AppResult<ImportSummary>;
}

pub trait TemplateQueryUseCase: Send + Sync {
    fn templates(&self) -> &[Arc<Template>];
    fn get(&self, id: TemplateId) -> Option<&Arc<Template>>;
    fn snapshot(&self) -> TemplateSnapshot;
    fn find_overlapping(&self, tile: TileCoord) -> Vec<OverlappingChunk<'_>>;
    fn color_at(&self, anchor: Anchor) -> Option<PixelTarget>;
    fn export_json(&self) -> AppResult<String>;
}

/// Both halves of the store behind one handle.
pub trait TemplateUseCase: TemplateManagementUseCase + TemplateQueryUseCase {}

impl<T: TemplateManagementUseCase + TemplateQueryUseCase> TemplateUseCase for T {}

pub type DynTemplateUseCase = Box<dyn TemplateUseCase>;
