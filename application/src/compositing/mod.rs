pub mod compositor;
pub mod service;
