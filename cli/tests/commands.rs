use std::fs;
use std::path::Path;

use domain::{
    bitmap::RgbaBitmap,
    color::{ColorKey, RgbColor, TRANSPARENT_RGBA},
    coords::Anchor,
};
use tempfile::{TempDir, tempdir};
use tile_overlay_adapters::outgoing::image_rs::png_codec_image::ImagePngAdapter;
use tile_overlay_application::{
    infrastructure_config::Config,
    ports::{incoming::templates::TemplateQueryUseCase, outgoing::image_codec::ImageCodecPort},
};
use tile_overlay_cli::{
    args::{Command, Switch},
    bootstrap::state::AppState,
    commands,
};

const BLACK: RgbColor = RgbColor::new(0, 0, 0);
const RED: RgbColor = RgbColor::new(237, 28, 36);

fn config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.tiles.tile_size = 10;
    config.storage.path = dir.join("templates.json").display().to_string();
    config
}

fn write_png(path: &Path, bitmap: &RgbaBitmap) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, ImagePngAdapter::default().encode_png(bitmap).unwrap()).unwrap();
}

async fn run(state: &mut AppState, command: Command) -> String {
    let mut out = Vec::new();
    commands::run(command, state, &mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

async fn state_with_template() -> (TempDir, AppState) {
    let dir = tempdir().unwrap();
    let image = dir.path().join("flag.png");
    let pixels = vec![BLACK.to_rgba_u32(), RED.to_rgba_u32()];
    write_png(&image, &RgbaBitmap::from_pixels(2, 1, pixels).unwrap());

    let mut state = AppState::new(config(dir.path())).unwrap();
    let added = run(
        &mut state,
        Command::Add {
            image,
            anchor: Anchor::new(0, 0, 9, 0),
            name: None,
            scale: Some(3),
            no_premium: false,
            disabled: Vec::new(),
        },
    )
    .await;
    assert!(added.contains("'flag'"));
    (dir, state)
}

#[tokio::test]
async fn add_list_and_reload() {
    let (dir, mut state) = state_with_template().await;

    let listing = run(&mut state, Command::List { colors: true }).await;
    assert!(listing.contains("flag"));
    assert!(listing.contains("Black"));
    assert!(listing.contains("Red"));

    let reloaded = AppState::new(config(dir.path())).unwrap();
    assert_eq!(reloaded.templates.templates().len(), 1);
}

#[tokio::test]
async fn toggle_color_and_pick() {
    let (_dir, mut state) = state_with_template().await;

    let picked = run(
        &mut state,
        Command::Pick {
            anchor: Anchor::new(1, 0, 0, 0),
        },
    )
    .await;
    assert!(picked.contains("Red"), "{picked}");

    run(
        &mut state,
        Command::Color {
            template: "flag".to_string(),
            color: ColorKey::Rgb(RED),
            state: Switch::Off,
        },
    )
    .await;
    let stat = *state
        .templates
        .templates()
        .first()
        .unwrap()
        .color_palette
        .get(&ColorKey::Rgb(RED))
        .unwrap();
    assert!(!stat.enabled);
    assert_eq!(stat.count, 1);

    run(
        &mut state,
        Command::Toggle {
            template: "1".to_string(),
            state: Switch::Off,
        },
    )
    .await;
    let hidden = run(
        &mut state,
        Command::Pick {
            anchor: Anchor::new(1, 0, 0, 0),
        },
    )
    .await;
    assert!(hidden.contains("no template pixel"));
}

#[tokio::test]
async fn render_dir_composites_matching_tiles() {
    let (dir, mut state) = state_with_template().await;
    let raw = RgbaBitmap::transparent(10, 10);
    let input = dir.path().join("raw");
    write_png(&input.join("0").join("0.png"), &raw);
    write_png(&input.join("1").join("0.png"), &raw);
    write_png(&input.join("5").join("5.png"), &raw);
    fs::write(input.join("0").join("notes.txt"), "skip me").unwrap();

    let output = dir.path().join("out");
    let summary = run(
        &mut state,
        Command::RenderDir {
            input,
            output: output.clone(),
        },
    )
    .await;
    assert!(summary.contains("Rendered 3 tiles"), "{summary}");
    assert!(summary.contains("2 composited"), "{summary}");

    let codec = ImagePngAdapter::default();
    let left = codec
        .decode(&fs::read(output.join("0").join("0.png")).unwrap())
        .unwrap();
    assert_eq!(left.get(28, 1), Some(BLACK.to_rgba_u32()));
    assert_eq!(left.get(27, 1), Some(TRANSPARENT_RGBA));

    let right = codec
        .decode(&fs::read(output.join("1").join("0.png")).unwrap())
        .unwrap();
    assert_eq!(right.get(1, 1), Some(RED.to_rgba_u32()));

    let untouched = codec
        .decode(&fs::read(output.join("5").join("5.png")).unwrap())
        .unwrap();
    assert_eq!(untouched, raw);
}

#[tokio::test]
async fn export_import_and_remove() {
    let (dir, mut state) = state_with_template().await;
    let exported = dir.path().join("export.json");
    run(
        &mut state,
        Command::Export {
            output: Some(exported.clone()),
        },
    )
    .await;

    let document: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&exported).unwrap()).unwrap();
    let templates = document.get("templates").and_then(|t| t.as_object()).unwrap();
    assert_eq!(templates.len(), 1);

    let removed = run(
        &mut state,
        Command::Remove {
            template: "flag".to_string(),
        },
    )
    .await;
    assert!(removed.starts_with("Removed"));
    assert!(state.templates.templates().is_empty());

    let imported = run(&mut state, Command::Import { input: exported }).await;
    assert!(imported.contains("Imported 1 templates"));
    assert_eq!(state.templates.templates().len(), 1);
}

#[tokio::test]
async fn unknown_templates_are_errors() {
    let (_dir, mut state) = state_with_template().await;
    let mut out = Vec::new();
    let result = commands::run(
        Command::Remove {
            template: "nope".to_string(),
        },
        &mut state,
        &mut out,
    )
    .await;
    assert!(result.is_err());
}
