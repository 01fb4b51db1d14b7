pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod service;

pub use config::{AppConfig, MatchConfig};
pub use error::{ReconError, Result};
pub use service::{MatcherService, ReconcileService, SourceIndex};
