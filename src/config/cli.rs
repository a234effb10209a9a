use crate::config::ServerConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "perf-metrics-api")]
#[command(about = "Read-only HTTP API serving pre-generated performance metrics CSV files")]
pub struct CliArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// `.env` file loaded before reading the environment
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,

    /// Address to bind (overrides HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory holding one subdirectory per project (overrides DATA_DIR)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Route prefix for the metrics endpoints (overrides API_PREFIX)
    #[arg(long)]
    pub prefix: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliArgs {
    pub fn apply_to(&self, config: &mut ServerConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.api_prefix = prefix.clone();
        }
    }
}
