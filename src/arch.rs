//! Architecture layer engine.
//!
//! Classifies modules into configured layers by path pattern and validates
//! every import edge against the source layer's allow-list. Built once from
//! a validated [`ArchitectureConfig`](crate::config::ArchitectureConfig);
//! construction is the last point where configuration can fail.

use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::config::ArchitectureConfig;
use crate::error::{BeaconError, Result};
use crate::graph::engine::DependencyGraph;

/// An import edge crossing from one layer to a layer not on its allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureViolation {
    /// Name of the violated rule.
    pub rule: String,
    pub from_module: String,
    pub to_module: String,
    pub from_layer: String,
    pub to_layer: String,
    /// File that declared the offending import.
    pub file: String,
    pub line: u32,
    pub column: u32,
}

/// Whether a layer path pattern is a glob (vs. a literal path prefix).
pub(crate) fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

/// A single compiled layer path pattern.
#[derive(Debug, Clone)]
struct CompiledPattern {
    raw: String,
    /// `Some` for glob patterns; `None` means literal prefix matching.
    glob: Option<GlobMatcher>,
}

impl CompiledPattern {
    fn compile(raw: &str) -> Result<Self> {
        let glob = if is_glob_pattern(raw) {
            let matcher = Glob::new(raw)
                .map_err(|e| BeaconError::InvalidPattern {
                    pattern: raw.to_string(),
                    reason: e.to_string(),
                })?
                .compile_matcher();
            Some(matcher)
        } else {
            None
        };
        Ok(Self {
            raw: raw.to_string(),
            glob,
        })
    }

    fn matches(&self, candidate: &str) -> bool {
        match &self.glob {
            Some(matcher) => matcher.is_match(candidate),
            None => literal_prefix_match(candidate, &self.raw),
        }
    }
}

/// Literal match: equal, or a strict prefix ending at a path separator.
/// `.` counts as a separator too, since patterns are matched against dotted
/// module names as well as file paths.
fn literal_prefix_match(candidate: &str, pattern: &str) -> bool {
    match candidate.strip_prefix(pattern) {
        Some("") => true,
        Some(rest) => rest.starts_with('/') || rest.starts_with('.'),
        None => false,
    }
}

#[derive(Debug, Clone)]
struct CompiledLayer {
    name: String,
    patterns: Vec<CompiledPattern>,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    name: String,
    allow: Vec<String>,
}

/// The layer classification and validation engine.
#[derive(Debug, Clone, Default)]
pub struct ArchitectureEngine {
    enabled: bool,
    layers: Vec<CompiledLayer>,
    /// Source layer name -> its (single) allow rule.
    rules: HashMap<String, CompiledRule>,
}

impl ArchitectureEngine {
    /// An engine with validation switched off; validates to nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Compile a validated configuration into a running engine.
    pub fn from_config(config: &ArchitectureConfig) -> Result<Self> {
        config.validate()?;

        let mut layers = Vec::with_capacity(config.layers.len());
        for layer in &config.layers {
            let patterns = layer
                .paths
                .iter()
                .map(|p| CompiledPattern::compile(p))
                .collect::<Result<Vec<_>>>()?;
            layers.push(CompiledLayer {
                name: layer.name.clone(),
                patterns,
            });
        }

        let rules = config
            .rules
            .iter()
            .map(|rule| {
                (
                    rule.layer.clone(),
                    CompiledRule {
                        name: rule.display_name().to_string(),
                        allow: rule.allow.clone(),
                    },
                )
            })
            .collect();

        Ok(Self {
            enabled: config.enabled,
            layers,
            rules,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Classify a module by its name and representative file path.
    ///
    /// Best match wins: the longest matching pattern string, ties broken by
    /// the lexicographically smaller layer name. `None` means the module has
    /// no layer and is exempt from validation.
    pub fn layer_of(&self, module_name: &str, representative_path: &str) -> Option<&str> {
        let path = normalize_path(representative_path);
        let mut best: Option<(&str, usize)> = None;

        for layer in &self.layers {
            for pattern in &layer.patterns {
                if !pattern.matches(module_name) && !pattern.matches(&path) {
                    continue;
                }
                let candidate = (layer.name.as_str(), pattern.raw.len());
                best = match best {
                    None => Some(candidate),
                    Some((name, len)) => {
                        if candidate.1 > len || (candidate.1 == len && candidate.0 < name) {
                            Some(candidate)
                        } else {
                            Some((name, len))
                        }
                    }
                };
            }
        }

        best.map(|(name, _)| name)
    }

    /// Validate every import edge against the layer rules.
    ///
    /// Edges from layer-less or rule-less modules, and edges to layer-less
    /// modules, are silently skipped. Output order follows the graph's
    /// sorted edge order.
    pub fn validate(&self, graph: &DependencyGraph) -> Vec<ArchitectureViolation> {
        if !self.enabled {
            return Vec::new();
        }

        // Layer per module, resolved once per validation pass.
        let mut layer_cache: HashMap<String, Option<String>> = HashMap::new();
        let mut layer_for = |engine: &Self, module: &str| -> Option<String> {
            if let Some(cached) = layer_cache.get(module) {
                return cached.clone();
            }
            let representative = graph
                .member_files(module)
                .and_then(|files| files.iter().next())
                .cloned()
                .unwrap_or_default();
            let layer = engine
                .layer_of(module, &representative)
                .map(|l| l.to_string());
            layer_cache.insert(module.to_string(), layer.clone());
            layer
        };

        let mut violations = Vec::new();
        for edge in graph.import_edges() {
            let Some(from_layer) = layer_for(self, &edge.from) else {
                continue;
            };
            let Some(rule) = self.rules.get(&from_layer) else {
                continue;
            };
            let Some(to_layer) = layer_for(self, &edge.to) else {
                continue;
            };
            if rule.allow.iter().any(|allowed| *allowed == to_layer) {
                continue;
            }
            violations.push(ArchitectureViolation {
                rule: rule.name.clone(),
                from_module: edge.from.clone(),
                to_module: edge.to.clone(),
                from_layer: from_layer.clone(),
                to_layer,
                file: edge.file.clone(),
                line: edge.location.line,
                column: edge.location.column,
            });
        }

        debug!(violations = violations.len(), "architecture validation finished");
        violations
    }
}

fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
