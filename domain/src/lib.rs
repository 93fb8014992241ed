pub mod bitmap;
pub mod chunk_key;
pub mod color;
pub mod coords;
pub mod error;
pub mod palette;
pub mod template;
