pub mod chunker;
pub mod persistence;
pub mod service;
pub mod snapshot;
