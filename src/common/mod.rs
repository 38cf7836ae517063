pub mod config;
pub mod errors;
pub mod format;
pub mod logging;

pub use config::{Config, OutputFormat};
pub use errors::CleanerError;
