//! Runtime settings: ledger location, service endpoints and the intent
//! catalog, resolved from CLI overrides, then environment, then defaults.

use crate::catalog::{Catalog, IntentCatalog, IntentEvidence};
use crate::ledger::ledger_path_from_env;
use crate::route::{Service, ServiceRegistry};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "DOCFLOW_CONFIG";

/// Shape of the optional YAML configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    services: BTreeMap<String, String>,
    #[serde(default)]
    intents: Option<Vec<IntentEvidence>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Read { path: PathBuf, error: String },
    Parse { path: PathBuf, error: String },
    UnknownService(String),
    InvalidCatalog(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, error } => {
                write!(f, "failed to read config '{}': {error}", path.display())
            }
            ConfigError::Parse { path, error } => {
                write!(f, "invalid config '{}': {error}", path.display())
            }
            ConfigError::UnknownService(name) => {
                write!(f, "config names unknown service '{name}'")
            }
            ConfigError::InvalidCatalog(error) => write!(f, "invalid intent catalog: {error}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Settings {
    pub ledger_path: PathBuf,
    pub registry: ServiceRegistry,
    pub catalog: Catalog,
}

impl Settings {
    pub fn load(ledger: Option<&Path>, config: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(ledger, config, |key| std::env::var(key).ok())
    }

    pub fn load_with_env<F>(
        ledger: Option<&Path>,
        config: Option<&Path>,
        get_env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ledger_path = match ledger {
            Some(path) => path.to_path_buf(),
            None => ledger_path_from_env(&get_env),
        };

        let config_path = config.map(Path::to_path_buf).or_else(|| {
            get_env(CONFIG_ENV)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        });

        let file = match &config_path {
            Some(path) => read_config(path)?,
            None => ConfigFile::default(),
        };

        let (registry, catalog) = apply(file)?;
        Ok(Self {
            ledger_path,
            registry,
            catalog,
        })
    }
}

fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|error| ConfigError::Read {
        path: path.to_path_buf(),
        error: error.to_string(),
    })?;
    serde_yaml::from_str(&raw).map_err(|error| ConfigError::Parse {
        path: path.to_path_buf(),
        error: error.to_string(),
    })
}

fn apply(file: ConfigFile) -> Result<(ServiceRegistry, Catalog), ConfigError> {
    let mut registry = ServiceRegistry::default();
    for (name, endpoint) in file.services {
        let service: Service = name
            .parse()
            .map_err(|_| ConfigError::UnknownService(name.clone()))?;
        registry = registry.with_endpoint(service, endpoint);
    }

    let mut catalog = Catalog::builtin();
    if let Some(categories) = file.intents {
        let intents = IntentCatalog::new(categories).map_err(ConfigError::InvalidCatalog)?;
        catalog = catalog.with_intents(intents);
    }

    Ok((registry, catalog))
}
