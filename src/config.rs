//! Configuration schema for apcheck.
//!
//! A config tunes the built-in rules: thresholds, which framework types count
//! as controllers and route providers, per-rule enablement and severity, and
//! which paths are never analyzed.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detect::{builtin_rule, Severity};

/// File names probed by [`Config::discover`], in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["apcheck.yaml", "apcheck.yml", ".apcheck.yaml"];

/// Errors raised while loading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unknown rule id in config: {0}")]
    UnknownRule(String),

    #[error("invalid glob pattern {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("threshold {0} must be greater than zero")]
    ZeroThreshold(&'static str),

    #[error("known type {0} must not be empty")]
    EmptyKnownType(&'static str),
}

/// Top-level config definition.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    /// Glob patterns for paths to exclude from analysis (e.g., "**/obj/**", "**/Migrations/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub known_types: KnownTypesConfig,
    /// Per-rule overrides keyed by rule id (e.g. `AP_4`)
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,
    /// Pass generated code to every rule, not only the ones that analyze it by default
    #[serde(default)]
    pub include_generated: bool,
}

impl Config {
    /// Parse and validate a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a config from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Look for a config file directly inside `dir`.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.as_ref().join(name))
            .find(|p| p.is_file())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for id in self.rules.keys() {
            if builtin_rule(id).is_none() {
                return Err(ConfigError::UnknownRule(id.clone()));
            }
        }

        self.exclude_matcher()?;
        self.thresholds.validate()?;

        if self.known_types.controller.trim().is_empty() {
            return Err(ConfigError::EmptyKnownType("controller"));
        }
        if self.known_types.route_provider.trim().is_empty() {
            return Err(ConfigError::EmptyKnownType("route_provider"));
        }

        Ok(())
    }

    /// Compile `excluded_paths` into one matcher.
    pub fn exclude_matcher(&self) -> Result<GlobSet, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern).map_err(|source| ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|source| ConfigError::InvalidGlob {
            pattern: self.excluded_paths.join(", "),
            source,
        })
    }

    /// Rules are enabled unless the config turns them off.
    pub fn is_rule_enabled(&self, id: &str) -> bool {
        self.rules.get(id).map(|r| r.enabled).unwrap_or(true)
    }

    /// Severity overrides, keyed by rule id.
    pub fn severity_overrides(&self) -> HashMap<String, Severity> {
        self.rules
            .iter()
            .filter_map(|(id, rule)| rule.severity.map(|s| (id.clone(), s)))
            .collect()
    }

    /// The config written by `apcheck init`.
    pub fn default_yaml() -> &'static str {
        DEFAULT_CONFIG
    }
}

/// Numeric limits for the built-in rules.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Thresholds {
    /// AP_3: constructor parameters allowed
    pub max_constructor_parameters: usize,
    /// AP_6: line breaks allowed in a class
    pub max_class_lines: usize,
    /// AP_5: line breaks allowed in a method
    pub max_method_lines: usize,
    /// AP_2: line breaks allowed across the whole program
    pub max_total_lines: usize,
    /// AP_1: a service with at most this many endpoints is reported
    pub max_nano_service_endpoints: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_constructor_parameters: 10,
            max_class_lines: 600,
            max_method_lines: 100,
            max_total_lines: 10_000,
            max_nano_service_endpoints: 1,
        }
    }
}

impl Thresholds {
    /// Size limits must be positive. `max_nano_service_endpoints: 0` is
    /// allowed and flags only services without endpoints.
    fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("max_constructor_parameters", self.max_constructor_parameters),
            ("max_class_lines", self.max_class_lines),
            ("max_method_lines", self.max_method_lines),
            ("max_total_lines", self.max_total_lines),
        ];
        match checks.iter().find(|(_, v)| *v == 0) {
            Some((name, _)) => Err(ConfigError::ZeroThreshold(name)),
            None => Ok(()),
        }
    }
}

/// Fully qualified names of the framework types the nano-service rule keys on.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct KnownTypesConfig {
    pub controller: String,
    pub route_provider: String,
}

impl Default for KnownTypesConfig {
    fn default() -> Self {
        Self {
            controller: "Microsoft.AspNetCore.Mvc.ControllerBase".to_string(),
            route_provider: "Microsoft.AspNetCore.Mvc.Routing.IRouteTemplateProvider".to_string(),
        }
    }
}

/// Per-rule settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RuleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub severity: Option<Severity>,
}

fn default_true() -> bool {
    true
}

const DEFAULT_CONFIG: &str = r#"# apcheck configuration
version: "1"

# Paths never analyzed (globset syntax)
excluded_paths:
  - "**/bin/**"
  - "**/obj/**"

thresholds:
  max_constructor_parameters: 10
  max_class_lines: 600
  max_method_lines: 100
  max_total_lines: 10000
  max_nano_service_endpoints: 1

known_types:
  controller: Microsoft.AspNetCore.Mvc.ControllerBase
  route_provider: Microsoft.AspNetCore.Mvc.Routing.IRouteTemplateProvider

# Per-rule overrides, e.g.
#   AP_4:
#     enabled: false
#   AP_6:
#     severity: error
rules: {}

include_generated: false
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_yaml_parses_to_defaults() {
        let config = Config::from_yaml(Config::default_yaml()).unwrap();
        assert_eq!(config.thresholds, Thresholds::default());
        assert_eq!(config.known_types, KnownTypesConfig::default());
        assert!(config.rules.is_empty());
        assert!(!config.include_generated);
        assert_eq!(config.excluded_paths.len(), 2);
    }

    #[test]
    fn test_partial_thresholds_keep_defaults() {
        let config = Config::from_yaml("thresholds:\n  max_method_lines: 40\n").unwrap();
        assert_eq!(config.thresholds.max_method_lines, 40);
        assert_eq!(config.thresholds.max_class_lines, 600);
    }

    #[test]
    fn test_rule_overrides() {
        let config = Config::from_yaml(
            "rules:\n  AP_4:\n    enabled: false\n  AP_6:\n    severity: error\n",
        )
        .unwrap();
        assert!(!config.is_rule_enabled("AP_4"));
        assert!(config.is_rule_enabled("AP_6"));
        assert!(config.is_rule_enabled("AP_1"));

        let overrides = config.severity_overrides();
        assert_eq!(overrides.get("AP_6"), Some(&Severity::Error));
        assert_eq!(overrides.len(), 1);
    }

    #[test]
    fn test_unknown_rule_is_rejected() {
        let err = Config::from_yaml("rules:\n  AP_9:\n    enabled: false\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRule(ref id) if id == "AP_9"));
    }

    #[test]
    fn test_zero_threshold_is_rejected() {
        let err = Config::from_yaml("thresholds:\n  max_class_lines: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroThreshold("max_class_lines")));
    }

    #[test]
    fn test_zero_endpoint_threshold_is_allowed() {
        let config = Config::from_yaml("thresholds:\n  max_nano_service_endpoints: 0\n").unwrap();
        assert_eq!(config.thresholds.max_nano_service_endpoints, 0);
    }

    #[test]
    fn test_bad_glob_is_rejected() {
        let err = Config::from_yaml("excluded_paths:\n  - \"src/[\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGlob { .. }));
    }

    #[test]
    fn test_path_exclusion() {
        let config = Config {
            excluded_paths: vec!["**/obj/**".to_string(), "**/*.Designer.cs".to_string()],
            ..Default::default()
        };
        let matcher = config.exclude_matcher().unwrap();
        assert!(matcher.is_match(Path::new("src/App/obj/Debug/A.cs")));
        assert!(matcher.is_match(Path::new("src/Form1.Designer.cs")));
        assert!(!matcher.is_match(Path::new("src/App/Program.cs")));
    }

    #[test]
    fn test_discover() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(Config::discover(temp.path()).is_none());

        fs::write(temp.path().join("apcheck.yml"), "version: \"1\"\n").unwrap();
        let found = Config::discover(temp.path()).unwrap();
        assert!(found.ends_with("apcheck.yml"));
        assert!(Config::parse_file(found).is_ok());
    }
}
