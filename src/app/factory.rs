use crate::{
    app::service::IntentService,
    config::Config,
};
use anyhow::{Context, Result};
use homedir::my_home;
use std::path::PathBuf;

const BASE_PATH_ENV: &str = "INTENTSIM_BASE_PATH";

/// Application factory for creating and configuring application components
pub struct AppFactory;

impl AppFactory {
    /// Create the intent service from the on-disk config.
    ///
    /// `model` overrides the configured embedding model for this run only.
    pub fn create_service(paths: &AppPaths, model: Option<String>) -> Result<IntentService> {
        let mut config = Self::create_config(paths)?;

        if let Some(model) = model {
            log::debug!("Overriding configured model '{}' with '{}'", config.model, model);
            config.model = model;
        }

        Ok(IntentService::new(config))
    }

    /// Load the config, creating a default one on first run.
    pub fn create_config(paths: &AppPaths) -> Result<Config> {
        Config::load_with(&paths.base_path).with_context(|| {
            format!(
                "Failed to load config from {}",
                paths.base_path.display()
            )
        })
    }

    /// Get application paths with validation
    pub fn get_paths() -> Result<AppPaths> {
        let base_path = Self::get_base_path()?;

        std::fs::create_dir_all(&base_path)
            .context("Failed to create application base directory")?;

        Ok(AppPaths { base_path })
    }

    /// Get the base path for the application
    fn get_base_path() -> Result<PathBuf> {
        if let Ok(base_path) = std::env::var(BASE_PATH_ENV) {
            return Ok(PathBuf::from(base_path));
        }

        let home = my_home()
            .context("Could not determine home directory")?
            .context("Home directory path is empty")?;

        Ok(home.join(".local/share/intentsim"))
    }
}

/// Application paths structure
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub base_path: PathBuf,
}
