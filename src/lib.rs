pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod http;
pub mod utils;

pub use adapters::local_store::LocalMetricsStore;
pub use config::{CliArgs, CorsPolicy, ServerConfig};
pub use core::{MetricsFile, MetricsStore, ProjectId};
pub use http::{build_router, AppState};
pub use utils::error::{MetricsError, Result};
