//! # Beacon
//!
//! Dependency intelligence for multi-language codebases.
//!
//! Beacon keeps an in-memory module dependency graph that language front
//! ends feed with normalized file records, and recomputes findings
//! incrementally as files change.
//!
//! ## Key Features
//!
//! - **Cycle detection**: circular module dependencies from a single DFS pass
//! - **Hallucination detection**: references no definition, import, stdlib
//!   namespace, or builtin accounts for
//! - **Unused imports**: zero-hit import bindings, confidence-ranked
//! - **Architecture rules**: layer classification by path pattern with one
//!   allow-list per layer
//! - **Incremental**: reverse-import invalidation re-resolves only affected
//!   files
//!
//! ## Quick Start
//!
//! ```rust
//! use beacon::{AnalysisConfig, Analyzer, FileRecord, Language};
//!
//! let analyzer = Analyzer::new(&AnalysisConfig::default()).unwrap();
//!
//! // Records normally come from a parsing front end.
//! let mut file = FileRecord::new("api/server.go", Language::Go, "myapp/api");
//! file.local_symbols = vec!["srv".to_string()];
//! let results = analyzer.ingest(vec![file]);
//!
//! assert!(results.is_clean());
//! ```

pub mod analyzer;
pub mod arch;
pub mod config;
pub mod error;
pub mod graph;
pub mod lang;
pub mod query;
pub mod resolve;

// Re-exports for convenience
pub use error::{BeaconError, Result};

// Graph re-exports
pub use graph::{
    detect_cycles, invalidate_transitive, DefKind, DefMetrics, Definition, DependencyGraph,
    FileRecord, GraphStats, ImportDecl, ImportEdge, Language, ModuleNode, Reference,
    SourceLocation,
};

// Analysis surface
pub use analyzer::{AnalysisResults, Analyzer};
pub use arch::{ArchitectureEngine, ArchitectureViolation};
pub use config::{AnalysisConfig, ArchitectureConfig, LayerConfig, LayerRule};
pub use resolve::{Confidence, Resolver, UnresolvedReference, UnusedImport};

// Query surface
pub use query::{
    dependency_trace, find_import_chain, impact_report, module_summary, ChainResult, ImpactReport,
    ModuleSummary,
};
