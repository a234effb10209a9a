pub mod cli;
pub mod dotenv;
pub mod toml_config;

use crate::core::catalog::DEFAULT_ITERATIONS;
use crate::utils::error::{MetricsError, Result};
use crate::utils::validation::{self, Validate};
use std::path::PathBuf;

pub use cli::CliArgs;
pub use toml_config::TomlConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_API_PREFIX: &str = "/metrics";

/// Resolved server configuration. Built once at startup and handed to the
/// router; nothing reads the environment after that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub api_prefix: String,
    pub allowed_origins: Vec<String>,
    pub debug: bool,
    pub default_iterations: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            allowed_origins: Vec::new(),
            debug: true,
            default_iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Which origins receive CORS headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    AnyOrigin,
    Origins(Vec<String>),
}

impl CorsPolicy {
    /// `Access-Control-Allow-Origin` value for a request origin, if allowed.
    pub fn allow_origin<'a>(&'a self, origin: &'a str) -> Option<&'a str> {
        match self {
            CorsPolicy::AnyOrigin => Some("*"),
            CorsPolicy::Origins(origins) => origins
                .iter()
                .any(|allowed| allowed == origin)
                .then_some(origin),
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            CorsPolicy::AnyOrigin => true,
            CorsPolicy::Origins(origins) => !origins.is_empty(),
        }
    }
}

impl ServerConfig {
    /// Defaults, then `.env`, then the TOML file, then the process
    /// environment, then command-line flags.
    pub fn load(args: &CliArgs) -> Result<Self> {
        dotenv::load_dotenv_if_present(&args.env_file);
        let mut config = Self::default();

        if let Some(path) = &args.config {
            TomlConfig::from_file(path)?.apply_to(&mut config);
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        args.apply_to(&mut config);
        Ok(config)
    }

    /// Overrides fields from `HOST`, `PORT`, `ALLOWED_ORIGINS`, `DEBUG`,
    /// `DATA_DIR`, `API_PREFIX` and `DEFAULT_ITERATIONS`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = parse_env_value("PORT", &port)?;
        }
        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            self.allowed_origins = split_origins(&origins);
        }
        if let Some(debug) = lookup("DEBUG") {
            self.debug = debug.trim().eq_ignore_ascii_case("true");
        }
        if let Some(dir) = lookup("DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = lookup("API_PREFIX") {
            self.api_prefix = prefix;
        }
        if let Some(iterations) = lookup("DEFAULT_ITERATIONS") {
            self.default_iterations = parse_env_value("DEFAULT_ITERATIONS", &iterations)?;
        }
        Ok(())
    }

    /// 除錯模式且未設定來源時允許任何來源，否則只允許設定的清單
    pub fn cors_policy(&self) -> CorsPolicy {
        if self.allowed_origins.iter().any(|o| o == "*") {
            return CorsPolicy::AnyOrigin;
        }
        if self.debug && self.allowed_origins.is_empty() {
            CorsPolicy::AnyOrigin
        } else {
            CorsPolicy::Origins(self.allowed_origins.clone())
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("host", &self.host)?;
        validation::validate_positive_number("port", u64::from(self.port), 1)?;
        validation::validate_path("data_dir", &self.data_dir.to_string_lossy())?;
        validation::validate_route_prefix("api_prefix", &self.api_prefix)?;
        for origin in &self.allowed_origins {
            validation::validate_origin("allowed_origins", origin)?;
        }
        Ok(())
    }
}

fn parse_env_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| MetricsError::InvalidConfigValueError {
            field: key.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

pub fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.api_prefix, "/metrics");
        assert_eq!(config.default_iterations, 10_000);
        assert!(config.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_env_overrides() {
        let mut config = ServerConfig::default();
        config
            .apply_env(env_of(&[
                ("HOST", "127.0.0.1"),
                ("PORT", "9000"),
                ("ALLOWED_ORIGINS", "http://localhost:5173, https://perf.example.com,"),
                ("DEBUG", "False"),
                ("DATA_DIR", "/srv/metrics"),
            ]))
            .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:5173", "https://perf.example.com"]
        );
        assert!(!config.debug);
        assert_eq!(config.data_dir, PathBuf::from("/srv/metrics"));
    }

    #[test]
    fn test_debug_flag_only_true_enables() {
        for (raw, expected) in [("true", true), ("TRUE", true), ("1", false), ("yes", false)] {
            let mut config = ServerConfig::default();
            config.apply_env(env_of(&[("DEBUG", raw)])).unwrap();
            assert_eq!(config.debug, expected, "DEBUG={raw}");
        }
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let mut config = ServerConfig::default();
        let err = config.apply_env(env_of(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(
            err,
            MetricsError::InvalidConfigValueError { ref field, .. } if field == "PORT"
        ));
    }

    #[test]
    fn test_cors_policy_resolution() {
        let mut config = ServerConfig::default();
        assert_eq!(config.cors_policy(), CorsPolicy::AnyOrigin);

        config.debug = false;
        assert_eq!(config.cors_policy(), CorsPolicy::Origins(vec![]));
        assert!(!config.cors_policy().is_enabled());

        config.allowed_origins = vec!["http://localhost:5173".to_string()];
        config.debug = true;
        let policy = config.cors_policy();
        assert_eq!(policy.allow_origin("http://localhost:5173"), Some("http://localhost:5173"));
        assert_eq!(policy.allow_origin("http://evil.example"), None);

        config.allowed_origins = vec!["*".to_string()];
        config.debug = false;
        assert_eq!(config.cors_policy(), CorsPolicy::AnyOrigin);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ServerConfig::default();
        config.api_prefix = "metrics/".to_string();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.port = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.allowed_origins = vec!["not a url".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_outside_async_runtime() {
        use clap::Parser;

        let dir = tempfile::TempDir::new().unwrap();
        let env_file = dir.path().join("server.env");
        std::fs::write(&env_file, "PERF_METRICS_API_LOAD_MARKER=1\n").unwrap();

        let args = CliArgs::parse_from([
            "perf-metrics-api",
            "--env-file",
            env_file.to_str().unwrap(),
            "--port",
            "9123",
            "--data-dir",
            "/srv/metrics",
        ]);
        let config = ServerConfig::load(&args).unwrap();

        assert_eq!(config.port, 9123);
        assert_eq!(config.data_dir, PathBuf::from("/srv/metrics"));
        assert_eq!(
            std::env::var("PERF_METRICS_API_LOAD_MARKER").as_deref(),
            Ok("1")
        );
    }
}
