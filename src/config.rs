use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "bundle-api.toml";

/// Main configuration structure for the bundle API
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BundleApiConfig {
    /// Service behaviour and paging limits
    pub service: ServiceConfig,
    /// Datasets Service connection settings
    pub datasets: DatasetsConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Page size used when a caller asks for limit 0
    pub default_page_limit: usize,
    /// Upper bound applied to every requested limit
    pub max_page_limit: usize,
    /// Address the HTTP transport binds to
    pub bind_addr: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatasetsConfig {
    pub api_url: String,
    /// Service token sent with outbound calls (can be set via env var)
    pub service_auth_token: Option<String>,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level, overridden by RUST_LOG when set
    pub log_level: String,
    /// Emit JSON lines instead of plain text
    pub json_logs: bool,
}

impl Default for BundleApiConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                default_page_limit: 20,
                max_page_limit: 1000,
                bind_addr: "0.0.0.0:29800".to_string(),
            },
            datasets: DatasetsConfig {
                api_url: "http://localhost:22000".to_string(),
                service_auth_token: None,
                request_timeout_seconds: 10,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: true,
            },
        }
    }
}

impl ServiceConfig {
    /// Resolve a requested page size against the configured default and maximum
    pub fn page_limit(&self, requested: usize) -> usize {
        match requested {
            0 => self.default_page_limit.min(self.max_page_limit),
            n => n.min(self.max_page_limit),
        }
    }
}

impl BundleApiConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (bundle-api.toml)
    /// 3. Environment variables (BUNDLE_API_SERVICE__MAX_PAGE_LIMIT and so on)
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("BUNDLE_API")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: BundleApiConfig = builder.build()?.try_deserialize()?;
        if config.service.max_page_limit == 0 {
            anyhow::bail!("service.max_page_limit must be greater than zero");
        }
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
