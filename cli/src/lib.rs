pub mod args;
pub mod bootstrap;
pub mod commands;
pub mod config_loader;
pub mod error;
pub mod observability;
