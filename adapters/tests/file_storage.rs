use std::sync::Arc;

use domain::{bitmap::RgbaBitmap, color::RgbColor, coords::Anchor};
use tempfile::tempdir;
use tile_overlay_adapters::outgoing::{
    image_rs::png_codec_image::ImagePngAdapter,
    json_file::template_storage_file::FileTemplateStorageAdapter,
};
use tile_overlay_application::{
    config::TileSettings,
    ports::outgoing::template_storage::TemplateStoragePort,
    templates::service::{CreateTemplate, TemplateImage, TemplateService, TemplateServiceDeps},
};

fn service(storage: Arc<FileTemplateStorageAdapter>) -> TemplateService {
    TemplateService::new(
        &Arc::new(TileSettings::default()),
        TemplateServiceDeps {
            codec_port: Arc::new(ImagePngAdapter::default()),
            storage_port: storage,
        },
    )
}

#[test]
fn missing_file_loads_as_empty() {
    let dir = tempdir().unwrap();
    let storage = FileTemplateStorageAdapter::new(dir.path().join("templates.json"));
    assert!(storage.load().unwrap().is_none());
}

#[test]
fn save_creates_parent_directories_and_overwrites() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("state").join("templates.json");
    let storage = FileTemplateStorageAdapter::new(&path);

    storage.save("{\"templates\":{}}").unwrap();
    storage.save("{}").unwrap();

    assert_eq!(storage.load().unwrap().as_deref(), Some("{}"));
    assert!(!path.with_file_name("templates.json.tmp").exists());
}

#[test]
fn templates_survive_a_restart() {
    let dir = tempdir().unwrap();
    let storage = Arc::new(FileTemplateStorageAdapter::new(
        dir.path().join("templates.json"),
    ));

    let mut first = service(Arc::clone(&storage));
    let pixels = vec![
        RgbColor::new(0, 0, 0).to_rgba_u32(),
        RgbColor::new(237, 28, 36).to_rgba_u32(),
    ];
    let created = first
        .create_template(CreateTemplate {
            name: "flag".to_string(),
            anchor: Anchor::new(12, 34, 999, 0),
            image: TemplateImage::Bitmap(RgbaBitmap::from_pixels(2, 1, pixels).unwrap()),
            scale_factor: None,
            filter: None,
        })
        .unwrap();

    let mut second = service(storage);
    let summary = second.load_from_storage().unwrap();
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.inert, 0);

    let restored = second.get(created.id).unwrap();
    assert_eq!(restored.chunks, created.chunks);
    assert_eq!(restored.color_palette, created.color_palette);
    assert_eq!(second.export_json().unwrap(), first.export_json().unwrap());
}
