//! Error types for Beacon.
//!
//! Only configuration can fail: the analysis algorithms always produce a
//! result (possibly empty), and lookups signal absence with `Option`, never
//! an error, since absence is a routine outcome of incremental updates.

use thiserror::Error;

/// Convenience result alias used across the crate.
pub type Result<T> = std::result::Result<T, BeaconError>;

/// Errors surfaced by Beacon. All variants are rejected eagerly at
/// configuration-build time, before any engine is constructed.
#[derive(Debug, Error)]
pub enum BeaconError {
    #[error("duplicate layer name `{0}`")]
    DuplicateLayer(String),

    #[error("layer `{0}` has more than one rule")]
    DuplicateRule(String),

    #[error("rule `{rule}` references unknown layer `{layer}`")]
    UnknownLayer { rule: String, layer: String },

    #[error("layer path `{pattern}` is claimed by both `{first}` and `{second}`")]
    OverlappingLayerPaths {
        pattern: String,
        first: String,
        second: String,
    },

    #[error("invalid layer pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}
