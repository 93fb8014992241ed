pub mod correlation;
pub mod tile_interceptor;
pub mod tile_url;
