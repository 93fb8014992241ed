use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use std::path::Path;
use tile_overlay_application::error::{AppError, AppResult};
use tile_overlay_application::infrastructure_config::Config;

pub const ENV_PREFIX: &str = "TILE_OVERLAY_";
pub const TOML_FILE: &str = "overlay.toml";
pub const JSON_FILE: &str = "overlay.json";

/// Defaults, then `overlay.toml`, then `overlay.json` from `base_dir`, then
/// `TILE_OVERLAY_*` variables (`__` separates nested keys).
pub fn figment(base_dir: &Path) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    let toml_path = base_dir.join(TOML_FILE);
    if toml_path.exists() {
        figment = figment.merge(Toml::file(toml_path));
    }

    let json_path = base_dir.join(JSON_FILE);
    if json_path.exists() {
        figment = figment.merge(Json::file(json_path));
    }

    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

pub fn load_config(base_dir: &Path) -> AppResult<Config> {
    let config: Config = figment(base_dir)
        .extract()
        .map_err(|e| AppError::ConfigError {
            message: format!("Failed to load configuration: {e}"),
        })?;

    config.validate()?;
    Ok(config)
}
