//! Connection settings loaded from a YAML file.
//!
//! ```yaml
//! neo4j:
//!   uri: bolt://localhost:7687
//!   user: neo4j
//!   password: password
//!   database: neo4j   # optional
//! ```

use arrest_neo4j_sink::ConnectionSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Not valid YAML, or a required key is missing
    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required key is present but blank
    #[error("Config key neo4j.{key} must not be empty")]
    EmptyValue { key: &'static str },

    /// Settings could not be rendered as YAML
    #[error("Failed to serialize config for {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The file could not be written
    #[error("Failed to write config file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct ConfigFile {
    neo4j: Neo4jSection,
}

#[derive(Debug, Serialize, Deserialize)]
struct Neo4jSection {
    uri: String,
    user: String,
    password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database: Option<String>,
}

/// Read connection settings from a YAML config file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<ConnectionSettings, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    from_yaml(&content).map_err(|e| match e {
        ParseFailure::Yaml(source) => ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        },
        ParseFailure::Empty(key) => ConfigError::EmptyValue { key },
    })
}

enum ParseFailure {
    Yaml(serde_yaml::Error),
    Empty(&'static str),
}

fn from_yaml(content: &str) -> Result<ConnectionSettings, ParseFailure> {
    let file: ConfigFile = serde_yaml::from_str(content).map_err(ParseFailure::Yaml)?;
    let section = file.neo4j;
    for (key, value) in [
        ("uri", &section.uri),
        ("user", &section.user),
        ("password", &section.password),
    ] {
        if value.trim().is_empty() {
            return Err(ParseFailure::Empty(key));
        }
    }

    Ok(ConnectionSettings {
        graph_uri: section.uri,
        username: section.user,
        password: section.password,
        database: section.database.filter(|db| !db.trim().is_empty()),
    })
}

/// Render settings as a config document that [`load`] reads back unchanged.
pub fn to_yaml(settings: &ConnectionSettings) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&ConfigFile {
        neo4j: Neo4jSection {
            uri: settings.graph_uri.clone(),
            user: settings.username.clone(),
            password: settings.password.clone(),
            database: settings.database.clone(),
        },
    })
}

/// Write settings to `path`, replacing any existing file.
pub fn write<P: AsRef<Path>>(path: P, settings: &ConnectionSettings) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let yaml = to_yaml(settings).map_err(|source| ConfigError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, yaml).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
