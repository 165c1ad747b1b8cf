//! Generator configuration
//!
//! Settings come from an optional TOML file (`dtskt.toml`), every key has a
//! default, and the CLI overrides individual keys afterwards.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// How a `number` is narrowed to `Int` based on the field/parameter name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdHeuristic {
    /// `Id` must occur after the first character (`userId` yes, `Id` no)
    #[default]
    Positional,
    /// `Id` anywhere in the name
    Contains,
}

impl IdHeuristic {
    /// Parse from a CLI value
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "positional" => Some(IdHeuristic::Positional),
            "contains" => Some(IdHeuristic::Contains),
            _ => None,
        }
    }

    /// Whether a number named `alias` should become `Int`
    pub fn is_id(self, alias: &str) -> bool {
        match self {
            IdHeuristic::Positional => alias.find("Id").is_some_and(|pos| pos > 0),
            IdHeuristic::Contains => alias.contains("Id"),
        }
    }
}

/// External formatter invoked on every written file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormatterConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Options the type mapper and naming rules depend on
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MappingConfig {
    /// Package every generated scope lives under (`org.node`)
    pub root_package: String,
    /// Extension of generated files, without the dot
    pub extension: String,
    /// Prefix removed from ambient module names before deriving packages
    pub strip_module_prefix: String,
    /// Package `Promise` is imported from
    pub promise_package: String,
    pub id_heuristic: IdHeuristic,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            root_package: "org.node".to_string(),
            extension: "kt".to_string(),
            strip_module_prefix: "node:".to_string(),
            promise_package: "kotlin.js".to_string(),
            id_heuristic: IdHeuristic::Positional,
        }
    }
}

/// Full configuration, as read from `dtskt.toml`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    #[serde(flatten)]
    pub mapping: MappingConfig,
    /// Root directory generated files are written under
    pub out_dir: PathBuf,
    /// Second root every finished file is copied to
    pub mirror_dir: Option<PathBuf>,
    pub formatter: Option<FormatterConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mapping: MappingConfig::default(),
            out_dir: PathBuf::from("generated"),
            mirror_dir: None,
            formatter: None,
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(text: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: path.to_string(),
            source,
        })
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_toml(&text, &display)
    }
}
