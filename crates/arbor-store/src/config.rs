use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// A database to register at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub name: String,
}

impl DatabaseConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Store bootstrap configuration.
///
/// ```toml
/// snapshot = "store.json"
///
/// [[databases]]
/// name = "master"
///
/// [[databases]]
/// name = "web"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Databases in registration order.
    #[serde(default = "default_databases")]
    pub databases: Vec<DatabaseConfig>,
    /// JSON snapshot loaded at startup and written back after mutations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,
}

fn default_databases() -> Vec<DatabaseConfig> {
    ["core", "master", "web"]
        .into_iter()
        .map(DatabaseConfig::new)
        .collect()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            databases: default_databases(),
            snapshot: None,
        }
    }
}

impl StoreConfig {
    /// Read and validate a TOML configuration file.
    ///
    /// A relative `snapshot` path is resolved against the file's directory.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&text)?;
        if let (Some(snapshot), Some(dir)) = (config.snapshot.as_ref(), path.parent()) {
            if snapshot.is_relative() {
                config.snapshot = Some(dir.join(snapshot));
            }
        }
        Ok(config)
    }

    /// Parse and validate a TOML configuration string.
    pub fn from_toml_str(text: &str) -> StoreResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject empty or duplicate (case-insensitive) database names.
    pub fn validate(&self) -> StoreResult<()> {
        if self.databases.is_empty() {
            return Err(StoreError::Config("at least one database is required".into()));
        }
        let mut seen = HashSet::new();
        for db in &self.databases {
            let name = db.name.trim();
            if name.is_empty() {
                return Err(StoreError::Config("database name cannot be empty".into()));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(StoreError::Config(format!("duplicate database name: {name}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StoreConfig::default();
        let names: Vec<&str> = config.databases.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["core", "master", "web"]);
        assert!(config.snapshot.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn parses_databases_in_order() {
        let config = StoreConfig::from_toml_str(
            r#"
            [[databases]]
            name = "web"

            [[databases]]
            name = "master"
            "#,
        )
        .unwrap();
        assert_eq!(config.databases[0].name, "web");
        assert_eq!(config.databases[1].name, "master");
    }

    #[test]
    fn missing_databases_use_defaults() {
        let config = StoreConfig::from_toml_str(r#"snapshot = "data.json""#).unwrap();
        assert_eq!(config.databases.len(), 3);
        assert_eq!(config.snapshot, Some(PathBuf::from("data.json")));
    }

    #[test]
    fn rejects_duplicates_and_empty_names() {
        let dup = StoreConfig::from_toml_str(
            r#"
            [[databases]]
            name = "master"
            [[databases]]
            name = "Master"
            "#,
        );
        assert!(matches!(dup, Err(StoreError::Config(_))));

        let empty = StoreConfig::from_toml_str(
            r#"
            [[databases]]
            name = " "
            "#,
        );
        assert!(matches!(empty, Err(StoreError::Config(_))));

        let none = StoreConfig::from_toml_str("databases = []");
        assert!(matches!(none, Err(StoreError::Config(_))));
    }

    #[test]
    fn load_resolves_relative_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arbor.toml");
        std::fs::write(&path, "snapshot = \"store.json\"\n").unwrap();
        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.snapshot, Some(dir.path().join("store.json")));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = StoreConfig::from_toml_str("databases = 5").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }
}
