use std::io::Write;

use tile_overlay_application::ports::{
    incoming::templates::TemplateQueryUseCase, outgoing::hovered_coordinate::HoveredCoordinatePort,
};

use super::{Output, color_label};
use crate::{bootstrap::state::AppState, error::CliResult};

pub fn pick(
    state: &AppState,
    pointer: &dyn HoveredCoordinatePort,
    out: Output<'_>,
) -> CliResult<()> {
    let Some(anchor) = pointer.try_get_hovered_coordinate() else {
        writeln!(out, "No coordinate to pick")?;
        return Ok(());
    };
    anchor.validate(state.settings.tile_size, state.settings.tiles_per_axis)?;

    match state.templates.color_at(anchor) {
        Some(target) => {
            let name = state
                .templates
                .get(target.template)
                .map_or("?", |template| template.name.as_str());
            writeln!(
                out,
                "{anchor}: {} ({}) from '{name}'",
                color_label(&target.color),
                target.color
            )?;
        }
        None => writeln!(out, "{anchor}: no template pixel")?,
    }
    Ok(())
}
