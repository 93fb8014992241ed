use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use domain::{color::ColorKey, coords::Anchor, palette};
use tile_overlay_application::{
    ports::incoming::templates::{TemplateManagementUseCase, TemplateQueryUseCase},
    templates::{
        chunker::PaletteFilter,
        service::{CreateTemplate, TemplateImage},
    },
};

use super::{Output, color_label, resolve_template};
use crate::{
    bootstrap::state::AppState,
    error::{CliError, CliResult},
};

pub struct AddArgs {
    pub image: PathBuf,
    pub anchor: Anchor,
    pub name: Option<String>,
    pub scale: Option<u32>,
    pub no_premium: bool,
    pub disabled: Vec<ColorKey>,
}

pub fn add(state: &mut AppState, args: AddArgs, out: Output<'_>) -> CliResult<()> {
    let bytes = fs::read(&args.image)?;
    let name = match args.name {
        Some(name) => name,
        None => args
            .image
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| CliError::InvalidArgument("template needs a name".to_string()))?,
    };

    let filter = PaletteFilter {
        allow_premium: state.settings.allow_premium && !args.no_premium,
        disabled: args.disabled.into_iter().collect(),
    };

    let template = state.templates.create_template(CreateTemplate {
        name,
        anchor: args.anchor,
        image: TemplateImage::Encoded(bytes),
        scale_factor: args.scale,
        filter: Some(filter),
    })?;

    writeln!(
        out,
        "Added {} '{}' at {}: {} chunks, {} pixels to paint",
        template.id,
        template.name,
        template.anchor,
        template.chunks.len(),
        template.color_palette.paintable_pixels()
    )?;
    for warning in &template.warnings {
        writeln!(out, "  warning: {warning}")?;
    }
    Ok(())
}

pub fn list(state: &AppState, colors: bool, out: Output<'_>) -> CliResult<()> {
    let templates = state.templates.templates();
    if templates.is_empty() {
        writeln!(out, "No templates")?;
        return Ok(());
    }

    for (position, template) in templates.iter().enumerate() {
        writeln!(
            out,
            "{:>3}  {}  {}  at {}  x{}  {}  {} pixels",
            position + 1,
            template.id,
            template.name,
            template.anchor,
            template.scale_factor,
            if template.should_be_drawn { "on" } else { "off" },
            template.color_palette.paintable_pixels()
        )?;

        if template.is_inert() {
            writeln!(out, "       inert: nothing to draw")?;
        }
        for warning in &template.warnings {
            writeln!(out, "       warning: {warning}")?;
        }

        if colors {
            for (key, stat) in template.color_palette.ranked() {
                writeln!(
                    out,
                    "       {:>8}  {:<12} {:<20} {}",
                    stat.count,
                    key.to_string(),
                    color_label(&key),
                    if stat.enabled { "on" } else { "off" }
                )?;
            }
        }
    }
    Ok(())
}

pub fn toggle(state: &mut AppState, query: &str, enabled: bool, out: Output<'_>) -> CliResult<()> {
    let id = resolve_template(state.templates.templates(), query)?;
    state.templates.set_should_be_drawn(id, enabled)?;
    writeln!(out, "Template {id} {}", if enabled { "on" } else { "off" })?;
    Ok(())
}

pub fn set_color(
    state: &mut AppState,
    query: &str,
    color: ColorKey,
    enabled: bool,
    out: Output<'_>,
) -> CliResult<()> {
    let id = resolve_template(state.templates.templates(), query)?;
    state.templates.set_color_enabled(id, color, enabled)?;
    writeln!(
        out,
        "Template {id}: {} ({color}) {}",
        color_label(&color),
        if enabled { "on" } else { "off" }
    )?;
    Ok(())
}

pub fn remove(state: &mut AppState, query: &str, out: Output<'_>) -> CliResult<()> {
    let id = resolve_template(state.templates.templates(), query)?;
    let removed = state.templates.remove_template(id)?;
    writeln!(out, "Removed {} '{}'", removed.id, removed.name)?;
    Ok(())
}

pub fn export(state: &AppState, output: Option<&Path>, out: Output<'_>) -> CliResult<()> {
    let json = state.templates.export_json()?;
    match output {
        Some(path) => {
            fs::write(path, json)?;
            writeln!(
                out,
                "Exported {} templates to {}",
                state.templates.templates().len(),
                path.display()
            )?;
        }
        None => writeln!(out, "{json}")?,
    }
    Ok(())
}

pub fn import(state: &mut AppState, input: &Path, out: Output<'_>) -> CliResult<()> {
    let json = fs::read_to_string(input)?;
    let summary = state.templates.import_json(&json)?;
    writeln!(
        out,
        "Imported {} templates ({} inert, {} warnings)",
        summary.imported, summary.inert, summary.warnings
    )?;
    Ok(())
}

pub fn palette(out: Output<'_>) -> CliResult<()> {
    for entry in palette::entries() {
        writeln!(
            out,
            "{:>3}  {:<20} {:<12} {}",
            entry.id,
            entry.name,
            entry.rgb.to_string(),
            if entry.premium { "premium" } else { "free" }
        )?;
    }
    Ok(())
}
