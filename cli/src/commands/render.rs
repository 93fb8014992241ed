use futures::future::join_all;
use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use domain::coords::TileCoord;
use tile_overlay_adapters::incoming::interceptor::correlation::BlobId;
use tile_overlay_application::ports::incoming::templates::TemplateQueryUseCase;

use super::Output;
use crate::{bootstrap::state::AppState, error::CliResult};

pub fn render(
    state: &AppState,
    tile: TileCoord,
    input: &Path,
    output: &Path,
    out: Output<'_>,
) -> CliResult<()> {
    tile.validate_bounds(state.settings.tiles_per_axis)?;
    let raw = fs::read(input)?;
    let snapshot = state.templates.snapshot();

    let composited = state.compositor.composite_tile(tile, &raw, &snapshot);
    let changed = matches!(composited, Cow::Owned(_));
    write_creating_dirs(output, &composited)?;

    writeln!(
        out,
        "{} tile {} -> {}",
        if changed { "Composited" } else { "Copied" },
        tile,
        output.display()
    )?;
    Ok(())
}

/// Feeds `{input}/{tx}/{ty}.png` through the tile interceptor, all at once and in
/// no particular order, and writes results to the same layout under `output`.
pub async fn render_dir(
    state: &AppState,
    input: &Path,
    output: &Path,
    out: Output<'_>,
) -> CliResult<()> {
    let interceptor = state.interceptor();
    let snapshot = state.templates.snapshot();

    let mut pending: Vec<(BlobId, Arc<[u8]>)> = Vec::new();
    for path in candidate_tiles(input)? {
        let blob = BlobId::new(path.display().to_string());
        let Ok(relative) = path.strip_prefix(input) else {
            continue;
        };
        let url = format!("tiles/{}", relative.to_string_lossy().replace('\\', "/"));
        if interceptor.register_request(blob.clone(), &url).is_none() {
            debug!("Skipping {}", path.display());
            continue;
        }
        match fs::read(&path) {
            Ok(body) => pending.push((blob, Arc::from(body))),
            Err(e) => {
                interceptor.abandon_request(&blob);
                warn!("Skipping unreadable tile {}: {}", path.display(), e);
            }
        }
    }

    let results = join_all(
        pending
            .iter()
            .map(|(blob, body)| interceptor.handle_response(blob, Arc::clone(body), &snapshot)),
    )
    .await;

    let mut composited = 0usize;
    for result in &results {
        let Some(tile) = result.tile else {
            continue;
        };
        let target = output
            .join(tile.x.to_string())
            .join(format!("{}.png", tile.y));
        write_creating_dirs(&target, &result.body)?;
        if result.composited {
            composited += 1;
        }
    }

    info!(
        "Rendered {} tiles from {}, {} composited",
        results.len(),
        input.display(),
        composited
    );
    writeln!(
        out,
        "Rendered {} tiles into {} ({} composited)",
        results.len(),
        output.display(),
        composited
    )?;
    Ok(())
}

/// Every file exactly two levels below `input`.
fn candidate_tiles(input: &Path) -> CliResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for column in fs::read_dir(input)? {
        let column = column?.path();
        if !column.is_dir() {
            continue;
        }
        for entry in fs::read_dir(&column)? {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn write_creating_dirs(path: &Path, bytes: &[u8]) -> CliResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}
