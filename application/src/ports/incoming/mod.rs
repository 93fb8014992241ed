pub mod templates;
pub mod tiles;
