//! Analysis configuration.
//!
//! Deserialized from TOML and validated eagerly, so a running engine never
//! observes an invalid layer/rule set.
//!
//! ```toml
//! excluded_prefixes = ["self", "ctx"]
//!
//! [architecture]
//! enabled = true
//!
//! [[architecture.layers]]
//! name = "api"
//! paths = ["myapp/api", "cmd/*"]
//!
//! [[architecture.layers]]
//! name = "core"
//! paths = ["myapp/core"]
//!
//! [[architecture.rules]]
//! layer = "api"
//! allow = ["core"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::arch::is_glob_pattern;
use crate::error::{BeaconError, Result};

/// Top-level analysis configuration, supplied by the embedding tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Leading reference segments that are known not to be modules
    /// (framework receiver/context names) and always resolve.
    #[serde(default)]
    pub excluded_prefixes: Vec<String>,
    /// Architecture layer model.
    #[serde(default)]
    pub architecture: ArchitectureConfig,
}

/// Layer definitions plus one allow-rule per layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub layers: Vec<LayerConfig>,
    #[serde(default)]
    pub rules: Vec<LayerRule>,
}

/// One named layer, matched by path patterns (glob or literal prefix).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub name: String,
    pub paths: Vec<String>,
}

/// The allow-list rule for one source layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRule {
    /// Optional display name; defaults to the source layer's name.
    #[serde(default)]
    pub name: Option<String>,
    /// The layer this rule constrains.
    pub layer: String,
    /// Layers this layer's modules may import.
    pub allow: Vec<String>,
}

impl LayerRule {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.layer)
    }
}

impl AnalysisConfig {
    /// Parse and validate a TOML configuration string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    /// Reject invalid configuration before any engine is built.
    pub fn validate(&self) -> Result<()> {
        self.architecture.validate()
    }
}

impl ArchitectureConfig {
    /// Structural validation: unique layer names, at most one rule per
    /// layer, every rule reference resolvable, and no literal path claimed
    /// by two layers.
    pub fn validate(&self) -> Result<()> {
        let mut names: HashSet<&str> = HashSet::new();
        for layer in &self.layers {
            if !names.insert(layer.name.as_str()) {
                return Err(BeaconError::DuplicateLayer(layer.name.clone()));
            }
        }

        // A literal path belonging to two layers would make classification
        // order-dependent; globs may legitimately overlap.
        let mut literal_owner: HashMap<&str, &str> = HashMap::new();
        for layer in &self.layers {
            for pattern in &layer.paths {
                if is_glob_pattern(pattern) {
                    continue;
                }
                if let Some(first) = literal_owner.insert(pattern, &layer.name) {
                    if first != layer.name {
                        return Err(BeaconError::OverlappingLayerPaths {
                            pattern: pattern.clone(),
                            first: first.to_string(),
                            second: layer.name.clone(),
                        });
                    }
                }
            }
        }

        let mut ruled: HashSet<&str> = HashSet::new();
        for rule in &self.rules {
            if !names.contains(rule.layer.as_str()) {
                return Err(BeaconError::UnknownLayer {
                    rule: rule.display_name().to_string(),
                    layer: rule.layer.clone(),
                });
            }
            if !ruled.insert(rule.layer.as_str()) {
                return Err(BeaconError::DuplicateRule(rule.layer.clone()));
            }
            for allowed in &rule.allow {
                if !names.contains(allowed.as_str()) {
                    return Err(BeaconError::UnknownLayer {
                        rule: rule.display_name().to_string(),
                        layer: allowed.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
