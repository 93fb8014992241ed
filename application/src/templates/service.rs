use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use domain::{
    bitmap::RgbaBitmap,
    color::ColorKey,
    coords::{Anchor, TileCoord},
    error::DomainError,
    template::{ChunkMap, ColorPalette, Template, TemplateId, TemplateWarning},
};

use crate::{
    config::TileSettings,
    error::{AppError, AppResult},
    ports::{
        incoming::templates::{TemplateManagementUseCase, TemplateQueryUseCase},
        outgoing::{image_codec::DynImageCodecPort, template_storage::DynTemplateStoragePort},
    },
};

use super::{
    chunker::{self, PaletteFilter},
    persistence::{
        StoredTemplate, TemplatesDocument, decode_data_url, encode_data_url, palette_from_stored,
        palette_to_stored,
    },
    snapshot::{OverlappingChunk, TemplateSnapshot, overlapping_chunks},
};

pub enum TemplateImage {
    /// Encoded file contents (PNG, WebP, ...).
    Encoded(Vec<u8>),
    Bitmap(RgbaBitmap),
}

pub struct CreateTemplate {
    pub name: String,
    pub anchor: Anchor,
    pub image: TemplateImage,
    pub scale_factor: Option<u32>,
    pub filter: Option<PaletteFilter>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub inert: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelTarget {
    pub template: TemplateId,
    pub color: ColorKey,
}

pub struct TemplateServiceDeps {
    pub codec_port: DynImageCodecPort,
    pub storage_port: DynTemplateStoragePort,
}

/// Owns the active templates in insertion order.
///
/// Mutations build the next list, persist it, and only then swap it in, so a
/// failed chunk or save leaves the store as it was.
pub struct TemplateService {
    settings: Arc<TileSettings>,
    codec_port: DynImageCodecPort,
    storage_port: DynTemplateStoragePort,
    templates: Vec<Arc<Template>>,
    source_urls: HashMap<TemplateId, String>,
}

impl TemplateService {
    pub fn new(settings: &Arc<TileSettings>, deps: TemplateServiceDeps) -> Self {
        Self {
            settings: Arc::clone(settings),
            codec_port: deps.codec_port,
            storage_port: deps.storage_port,
            templates: Vec::new(),
            source_urls: HashMap::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &TileSettings {
        &self.settings
    }

    #[must_use]
    pub fn templates(&self) -> &[Arc<Template>] {
        &self.templates
    }

    #[must_use]
    pub fn get(&self, id: TemplateId) -> Option<&Arc<Template>> {
        self.templates.iter().find(|template| template.id == id)
    }

    #[must_use]
    pub fn snapshot(&self) -> TemplateSnapshot {
        TemplateSnapshot::new(self.templates.clone())
    }

    #[instrument(skip(self, request), fields(name = %request.name, anchor = %request.anchor))]
    pub fn create_template(&mut self, request: CreateTemplate) -> AppResult<Arc<Template>> {
        if request.name.trim().is_empty() {
            return Err(AppError::ValidationError {
                message: "Template name cannot be empty".to_string(),
            });
        }

        let source = match request.image {
            TemplateImage::Encoded(bytes) => self.codec_port.decode(&bytes).map_err(|e| {
                DomainError::InvalidTemplate(format!("Source image could not be decoded: {e}"))
            })?,
            TemplateImage::Bitmap(bitmap) => bitmap,
        };

        let scale_factor = request.scale_factor.unwrap_or(self.settings.scale_factor);
        let filter = request
            .filter
            .unwrap_or_else(|| self.settings.default_filter());
        let output = chunker::chunk(
            &source,
            request.anchor,
            &self.settings.chunk_settings(scale_factor, filter),
        )?;

        let id = TemplateId::derive(&request.name, &request.anchor);
        for warning in &output.warnings {
            warn!("Template {} ({}): {}", request.name, id, warning);
        }

        let source_url = encode_data_url(&self.codec_port.encode_png(&source)?);
        let template = Arc::new(Template {
            id,
            name: request.name,
            anchor: request.anchor,
            scale_factor,
            source: Some(Arc::new(source)),
            chunks: Arc::new(output.chunks),
            color_palette: output.color_palette,
            should_be_drawn: true,
            warnings: output.warnings,
        });

        let mut next = self.templates.clone();
        upsert(&mut next, Arc::clone(&template));
        self.commit(next, Some((id, source_url)))?;

        info!(
            "Created template {} '{}' at {} with {} chunks",
            template.id,
            template.name,
            template.anchor,
            template.chunks.len()
        );
        Ok(template)
    }

    pub fn set_should_be_drawn(&mut self, id: TemplateId, enabled: bool) -> AppResult<()> {
        self.update_template(id, |template| {
            template.should_be_drawn = enabled;
            Ok(())
        })?;
        debug!("Template {} drawing set to {}", id, enabled);
        Ok(())
    }

    pub fn set_color_enabled(
        &mut self,
        id: TemplateId,
        color: ColorKey,
        enabled: bool,
    ) -> AppResult<()> {
        self.update_template(id, |template| {
            if template.color_palette.set_enabled(&color, enabled) {
                Ok(())
            } else {
                Err(AppError::UnknownColor { id, color })
            }
        })?;
        debug!("Template {} color {} set to {}", id, color, enabled);
        Ok(())
    }

    pub fn remove_template(&mut self, id: TemplateId) -> AppResult<Arc<Template>> {
        let index = self.position(id)?;
        let mut next = self.templates.clone();
        let removed = next.remove(index);
        self.commit(next, None)?;
        info!("Removed template {} '{}'", removed.id, removed.name);
        Ok(removed)
    }

    #[must_use]
    pub fn find_overlapping(&self, tile: TileCoord) -> Vec<OverlappingChunk<'_>> {
        overlapping_chunks(&self.templates, tile).collect()
    }

    /// Template color expected at `anchor`, taken from the top-most drawn template.
    #[must_use]
    pub fn color_at(&self, anchor: Anchor) -> Option<PixelTarget> {
        self.templates
            .iter()
            .rev()
            .filter(|template| template.should_be_drawn)
            .find_map(|template| {
                template.chunks_for_tile(anchor.tile).find_map(|chunk| {
                    let local = chunk.local_offset();
                    let x = anchor.pixel.x.checked_sub(local.x)?;
                    let y = anchor.pixel.y.checked_sub(local.y)?;
                    chunk.source_key(x, y).map(|color| PixelTarget {
                        template: template.id,
                        color,
                    })
                })
            })
    }

    pub fn export_json(&self) -> AppResult<String> {
        self.document_for(&self.templates, |_| None)?.to_json()
    }

    /// Replaces the store with the document's templates and persists the result.
    #[instrument(skip(self, json), fields(bytes = json.len()))]
    pub fn import_json(&mut self, json: &str) -> AppResult<ImportSummary> {
        let document = TemplatesDocument::parse(json)?;
        let (templates, urls, summary) = self.restore_document(document);
        let document = self.document_for(&templates, |id| urls.get(&id).cloned())?;
        self.storage_port.save(&document.to_json()?)?;
        self.templates = templates;
        self.source_urls = urls;
        info!(
            "Imported {} templates ({} inert, {} warnings)",
            summary.imported, summary.inert, summary.warnings
        );
        Ok(summary)
    }

    /// Restores whatever the storage port holds without writing it back.
    #[instrument(skip(self))]
    pub fn load_from_storage(&mut self) -> AppResult<ImportSummary> {
        let Some(json) = self.storage_port.load()? else {
            debug!("No stored templates");
            return Ok(ImportSummary::default());
        };
        let document = TemplatesDocument::parse(&json)?;
        let (templates, urls, summary) = self.restore_document(document);
        self.templates = templates;
        self.source_urls = urls;
        info!(
            "Loaded {} templates ({} inert, {} warnings)",
            summary.imported, summary.inert, summary.warnings
        );
        Ok(summary)
    }

    fn position(&self, id: TemplateId) -> AppResult<usize> {
        self.templates
            .iter()
            .position(|template| template.id == id)
            .ok_or(AppError::TemplateNotFound { id })
    }

    fn update_template(
        &mut self,
        id: TemplateId,
        apply: impl FnOnce(&mut Template) -> AppResult<()>,
    ) -> AppResult<()> {
        let index = self.position(id)?;
        let mut next = self.templates.clone();
        if let Some(slot) = next.get_mut(index) {
            apply(Arc::make_mut(slot))?;
        }
        self.commit(next, None)
    }

    fn commit(
        &mut self,
        next: Vec<Arc<Template>>,
        new_source: Option<(TemplateId, String)>,
    ) -> AppResult<()> {
        let document = self.document_for(&next, |id| {
            new_source
                .as_ref()
                .filter(|(new_id, _)| *new_id == id)
                .map(|(_, url)| url.clone())
        })?;
        self.storage_port.save(&document.to_json()?)?;

        self.templates = next;
        if let Some((id, url)) = new_source {
            self.source_urls.insert(id, url);
        }
        let live: BTreeSet<TemplateId> = self.templates.iter().map(|t| t.id).collect();
        self.source_urls.retain(|id, _| live.contains(id));
        Ok(())
    }

    /// `known_url` supplies source data URLs that are not cached yet.
    fn document_for(
        &self,
        templates: &[Arc<Template>],
        known_url: impl Fn(TemplateId) -> Option<String>,
    ) -> AppResult<TemplatesDocument> {
        let mut document = TemplatesDocument::default();
        for template in templates {
            let url = match known_url(template.id) {
                Some(url) => Some(url),
                None => self.source_url(template)?,
            };
            document.push(template.id, stored_template(template, url));
        }
        Ok(document)
    }

    fn source_url(&self, template: &Template) -> AppResult<Option<String>> {
        if let Some(url) = self.source_urls.get(&template.id) {
            return Ok(Some(url.clone()));
        }
        template
            .source
            .as_deref()
            .map(|source| self.codec_port.encode_png(source).map(|png| encode_data_url(&png)))
            .transpose()
    }

    fn restore_document(
        &self,
        document: TemplatesDocument,
    ) -> (
        Vec<Arc<Template>>,
        HashMap<TemplateId, String>,
        ImportSummary,
    ) {
        let mut templates = Vec::new();
        let mut urls = HashMap::new();
        let mut summary = ImportSummary::default();

        for stored in document.into_ordered() {
            let url = stored.source_image_data_url.clone();
            let template = self.restore(stored);

            summary.imported += 1;
            summary.warnings += template.warnings.len();
            if template.is_inert() {
                summary.inert += 1;
            }
            if let Some(url) = url {
                urls.insert(template.id, url);
            }
            upsert(&mut templates, Arc::new(template));
        }

        (templates, urls, summary)
    }

    fn restore(&self, stored: StoredTemplate) -> Template {
        let id = TemplateId::derive(&stored.name, &stored.anchor);
        let scale_factor = stored.scale_factor.unwrap_or(self.settings.scale_factor);
        let mut warnings = Vec::new();

        let source = match stored.source_image_data_url.as_deref() {
            Some(url) => match decode_data_url(url).and_then(|png| self.codec_port.decode(&png)) {
                Ok(bitmap) => Some(Arc::new(bitmap)),
                Err(e) => {
                    warnings.push(TemplateWarning::CorruptedState {
                        detail: format!("source image unreadable: {e}"),
                    });
                    None
                }
            },
            None => {
                warnings.push(TemplateWarning::CorruptedState {
                    detail: "no source image stored".to_string(),
                });
                None
            }
        };

        let stored_palette = stored.palette.as_ref().map(|raw| {
            let (palette, palette_warnings) = palette_from_stored(raw);
            warnings.extend(palette_warnings);
            palette
        });

        let (chunks, color_palette) = match source.as_deref() {
            Some(bitmap) => {
                let settings = self
                    .settings
                    .chunk_settings(scale_factor, self.settings.default_filter());
                match chunker::chunk(bitmap, stored.anchor, &settings) {
                    Ok(output) => {
                        warnings.extend(output.warnings);
                        let palette = match stored_palette {
                            Some(palette) => {
                                warnings.extend(missing_palette_keys(&output.chunks, &palette));
                                palette
                            }
                            None => output.color_palette,
                        };
                        (output.chunks, palette)
                    }
                    Err(e) => {
                        warnings.push(TemplateWarning::CorruptedState {
                            detail: format!("re-chunking failed: {e}"),
                        });
                        (ChunkMap::new(), stored_palette.unwrap_or_default())
                    }
                }
            }
            None => (ChunkMap::new(), stored_palette.unwrap_or_default()),
        };

        for warning in &warnings {
            warn!("Template {} ({}): {}", stored.name, id, warning);
        }

        Template {
            id,
            name: stored.name,
            anchor: stored.anchor,
            scale_factor,
            source,
            chunks: Arc::new(chunks),
            color_palette,
            should_be_drawn: stored.enabled.unwrap_or(true),
            warnings,
        }
    }
}

/// A template with an existing id is replaced where it stands.
fn upsert(templates: &mut Vec<Arc<Template>>, template: Arc<Template>) {
    match templates.iter_mut().find(|existing| existing.id == template.id) {
        Some(slot) => *slot = template,
        None => templates.push(template),
    }
}

fn stored_template(template: &Template, source_image_data_url: Option<String>) -> StoredTemplate {
    StoredTemplate {
        name: template.name.clone(),
        anchor: template.anchor,
        scale_factor: Some(template.scale_factor),
        enabled: Some(template.should_be_drawn),
        palette: (!template.color_palette.is_empty())
            .then(|| palette_to_stored(&template.color_palette)),
        source_image_data_url,
    }
}

fn missing_palette_keys(chunks: &ChunkMap, palette: &ColorPalette) -> Vec<TemplateWarning> {
    let missing: BTreeSet<ColorKey> = chunks
        .values()
        .flat_map(|chunk| chunk.provenance.iter().flatten())
        .filter(|key| !palette.contains(key))
        .copied()
        .collect();

    missing
        .into_iter()
        .map(|key| TemplateWarning::CorruptedState {
            detail: format!("color {key} is used by the image but missing from the stored palette"),
        })
        .collect()
}

impl TemplateManagementUseCase for TemplateService {
    fn create_template(&mut self, request: CreateTemplate) -> AppResult<Arc<Template>> {
        self.create_template(request)
    }

    fn set_should_be_drawn(&mut self, id: TemplateId, enabled: bool) -> AppResult<()> {
        self.set_should_be_drawn(id, enabled)
    }

    fn set_color_enabled(
        &mut self,
        id: TemplateId,
        color: ColorKey,
        enabled: bool,
    ) -> AppResult<()> {
        self.set_color_enabled(id, color, enabled)
    }

    fn remove_template(&mut self, id: TemplateId) -> AppResult<Arc<Template>> {
        self.remove_template(id)
    }

    fn import_json(&mut self, json: &str) -> AppResult<ImportSummary> {
        self.import_json(json)
    }

    fn load_from_storage(&mut self) -> AppResult<ImportSummary> {
        self.load_from_storage()
    }
}

impl TemplateQueryUseCase for TemplateService {
    fn templates(&self) -> &[Arc<Template>] {
        self.templates()
    }

    fn get(&self, id: TemplateId) -> Option<&Arc<Template>> {
        self.get(id)
    }

    fn snapshot(&self) -> TemplateSnapshot {
        self.snapshot()
    }

    fn find_overlapping(&self, tile: TileCoord) -> Vec<OverlappingChunk<'_>> {
        self.find_overlapping(tile)
    }

    fn color_at(&self, anchor: Anchor) -> Option<PixelTarget> {
        self.color_at(anchor)
    }

    fn export_json(&self) -> AppResult<String> {
        self.export_json()
    }
}
