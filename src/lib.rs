pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod embeddings;
pub mod errors;
pub mod knowledge;
pub mod llm;
pub mod logging;
pub mod models;
pub mod retry;
pub mod support;

/// Booking link used when none is configured
pub const DEFAULT_BOOKING_URL: &str = "https://bikehero.sg/goifnmnf";


pub use config::AppConfig;
pub use errors::*;
