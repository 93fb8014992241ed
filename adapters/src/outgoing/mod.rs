pub mod image_rs;
pub mod json_file;
pub mod memory;
pub mod tile_cache_lru;
