//! CLI subcommand implementations.

pub mod health;
pub mod images;
pub mod scan;
pub mod task;
pub mod upload;
