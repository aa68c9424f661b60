use anyhow::Result;
use std::path::PathBuf;

use super::{print_json, Command};
use crate::config::BundleApiConfig;

pub struct ConfigCommand {
    config: BundleApiConfig,
    write: Option<PathBuf>,
}

impl ConfigCommand {
    pub fn new(config: BundleApiConfig) -> Self {
        Self {
            config,
            write: None,
        }
    }

    pub fn with_output(mut self, write: Option<PathBuf>) -> Self {
        self.write = write;
        self
    }
}

impl Command for ConfigCommand {
    async fn execute(&self) -> Result<()> {
        match &self.write {
            Some(path) => {
                self.config.save_to_file(path)?;
                tracing::info!(path = %path.display(), "Configuration written");
                println!("Configuration written to {}", path.display());
                Ok(())
            }
            None => print_json(&self.config),
        }
    }
}
