pub mod hovered_coordinate;
pub mod image_codec;
pub mod template_storage;
pub mod tile_cache;
