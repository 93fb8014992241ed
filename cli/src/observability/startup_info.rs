use tile_overlay_application::infrastructure_config::{Config, TemplateConfig, TileConfig};
use tracing::debug;

pub fn log_startup_info(config: &Config) {
    print_tile_configuration(&config.tiles);
    print_template_configuration(&config.templates);
    debug!("  Storage: {}", config.storage.path);
}

fn print_tile_configuration(tiles: &TileConfig) {
    debug!(
        "  Tiles: {}x{} pixels, {} per axis",
        tiles.tile_size, tiles.tile_size, tiles.tiles_per_axis
    );
    debug!(
        "  Raw tile cache: {} tiles, composite timeout {}ms",
        tiles.raw_cache_capacity, tiles.composite_timeout_ms
    );
}

fn print_template_configuration(templates: &TemplateConfig) {
    debug!(
        "  Templates: scale {}, alpha threshold {}, {:?} matching, premium colors {}",
        templates.scale_factor,
        templates.alpha_threshold,
        templates.color_matching,
        if templates.allow_premium {
            "allowed"
        } else {
            "filtered"
        }
    );
}
