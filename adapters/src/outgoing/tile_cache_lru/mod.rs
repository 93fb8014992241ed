pub mod tile_cache_memory;
