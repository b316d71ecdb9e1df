//! Dependency graph module — the structural backbone of Beacon.
//!
//! Provides the graph data model, the mutation/lookup engine, cycle
//! detection, and transitive change-invalidation.

pub mod cycles;
pub mod engine;
pub mod invalidate;
pub mod types;

pub use cycles::detect_cycles;
pub use engine::{DependencyGraph, GraphStats, ImportEdge, ModuleNode};
pub use invalidate::invalidate_transitive;
pub use types::{
    DefKind, DefMetrics, Definition, FileRecord, ImportDecl, Language, Reference, SourceLocation,
};
