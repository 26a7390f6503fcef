pub mod cache;
pub mod card;
pub mod commands;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod palette;
pub mod session;
pub mod srs;
pub mod stats;
pub mod tui;
pub mod utils;
