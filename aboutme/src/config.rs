//! This module defines the configuration file.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{error::Result, k8s::consts};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Label selector picking the namespaces searched before the fallback.
    pub selector: String,
    /// The namespace that is always searched last.
    pub fallback_namespace: String,
    /// The interface inspected for the local IP address.
    pub interface: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            selector: consts::DEFAULT_SELECTOR.to_string(),
            fallback_namespace: consts::DEFAULT_NAMESPACE.to_string(),
            interface: consts::DEFAULT_INTERFACE.to_string(),
        }
    }
}

impl Config {
    pub fn from_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_file(file_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(file_path)?;
        Self::from_str(&config_content)
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            selector: self.selector.clone(),
            fallback_namespace: self.fallback_namespace.clone(),
        }
    }
}

/// Where to look for the pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub selector: String,
    pub fallback_namespace: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Config::default().search_options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load() {
        let config = Config::from_str(
            r#"
            selector: "name=workers,tier in (batch)"
            fallbackNamespace: apps
            interface: ens5
        "#,
        )
        .unwrap();

        assert_eq!(config.selector, "name=workers,tier in (batch)");
        assert_eq!(config.fallback_namespace, "apps");
        assert_eq!(config.interface, "ens5");
        assert_eq!(
            config.search_options(),
            SearchOptions {
                selector: "name=workers,tier in (batch)".to_string(),
                fallback_namespace: "apps".to_string(),
            }
        );
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_str("interface: ens5").unwrap();

        assert_eq!(config.selector, "name=deis");
        assert_eq!(config.fallback_namespace, "default");
        assert_eq!(config.interface, "ens5");
        assert_eq!(SearchOptions::default(), Config::default().search_options());
    }

    #[test]
    fn test_config_invalid() {
        let err = Config::from_str("selector: [not, a, string]").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
