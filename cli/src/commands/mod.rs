pub mod pick;
pub mod render;
pub mod templates;

use std::io::Write;
use std::sync::Arc;

use domain::{
    color::ColorKey,
    palette,
    template::{Template, TemplateId},
};

use crate::{
    args::Command,
    bootstrap::{pointer::FixedCoordinate, state::AppState},
    error::{CliError, CliResult},
};

pub type Output<'a> = &'a mut (dyn Write + Send);

pub async fn run(command: Command, state: &mut AppState, out: Output<'_>) -> CliResult<()> {
    match command {
        Command::Add {
            image,
            anchor,
            name,
            scale,
            no_premium,
            disabled,
        } => templates::add(
            state,
            templates::AddArgs {
                image,
                anchor,
                name,
                scale,
                no_premium,
                disabled,
            },
            out,
        ),
        Command::List { colors } => templates::list(state, colors, out),
        Command::Toggle { template, state: on } => {
            templates::toggle(state, &template, on.is_on(), out)
        }
        Command::Color {
            template,
            color,
            state: on,
        } => templates::set_color(state, &template, color, on.is_on(), out),
        Command::Remove { template } => templates::remove(state, &template, out),
        Command::Export { output } => templates::export(state, output.as_deref(), out),
        Command::Import { input } => templates::import(state, &input, out),
        Command::Palette => templates::palette(out),
        Command::Render {
            tile,
            input,
            output,
        } => render::render(state, tile, &input, &output, out),
        Command::RenderDir { input, output } => {
            render::render_dir(state, &input, &output, out).await
        }
        Command::Pick { anchor } => pick::pick(state, &FixedCoordinate::new(anchor), out),
    }
}

/// Resolves a 1-based list position, an exact name, or an id prefix.
pub fn resolve_template(templates: &[Arc<Template>], query: &str) -> CliResult<TemplateId> {
    if let Ok(position) = query.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| templates.get(index))
            .map(|template| template.id)
            .ok_or_else(|| CliError::UnknownTemplate(query.to_string()));
    }

    let matches: Vec<TemplateId> = templates
        .iter()
        .filter(|t| t.name == query || t.id.to_string().starts_with(query))
        .map(|t| t.id)
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(CliError::UnknownTemplate(query.to_string())),
        many => Err(CliError::AmbiguousTemplate {
            query: query.to_string(),
            count: many.len(),
        }),
    }
}

pub fn color_label(key: &ColorKey) -> String {
    match key {
        ColorKey::Rgb(rgb) => palette::lookup_exact(*rgb)
            .map_or_else(|| format!("unlisted {rgb}"), |entry| entry.name.to_string()),
        ColorKey::Sentinel => "transparent marker".to_string(),
        ColorKey::Other => "off-palette".to_string(),
    }
}
