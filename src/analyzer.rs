//! The shared analysis service.
//!
//! Owns the dependency graph behind a reader/writer lock (many concurrent
//! readers, mutually-exclusive writers) plus the incremental result caches,
//! each under its own lock so a UI read of stale-but-consistent findings is
//! never blocked by an in-progress recompute of a different cache. Within
//! one incremental cycle the cycle detector, the resolver, and the
//! architecture engine all observe the same post-mutation snapshot.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Instant;
use tracing::{debug, info};

use crate::arch::{ArchitectureEngine, ArchitectureViolation};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::graph::cycles::detect_cycles;
use crate::graph::engine::DependencyGraph;
use crate::graph::invalidate::invalidate_transitive;
use crate::graph::types::FileRecord;
use crate::resolve::{Resolver, UnresolvedReference, UnusedImport};

/// A consistent view of every finding the analysis currently knows about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResults {
    /// Module cycles, each an ordered closed walk.
    pub cycles: Vec<Vec<String>>,
    /// Unresolved references, sorted by file then location.
    pub unresolved: Vec<UnresolvedReference>,
    /// Unused imports, sorted by file then location.
    pub unused: Vec<UnusedImport>,
    /// Architecture violations in edge order.
    pub violations: Vec<ArchitectureViolation>,
}

impl AnalysisResults {
    /// Pretty JSON for external reporting surfaces.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn is_clean(&self) -> bool {
        self.cycles.is_empty()
            && self.unresolved.is_empty()
            && self.unused.is_empty()
            && self.violations.is_empty()
    }
}

type ResultHandler = Box<dyn Fn(&AnalysisResults) + Send + Sync>;

/// The analysis service: one shared mutable graph, incremental caches, and
/// a single registered result observer.
///
/// `Analyzer` is `Sync`; a scan path, a watch path, and a UI read path may
/// all hold references concurrently. No operation blocks on I/O; the only
/// suspension is lock contention, bounded by mutation duration.
pub struct Analyzer {
    graph: Arc<RwLock<DependencyGraph>>,
    resolver: Resolver,
    arch: ArchitectureEngine,
    unresolved_cache: Mutex<HashMap<String, Vec<UnresolvedReference>>>,
    unused_cache: Mutex<HashMap<String, Vec<UnusedImport>>>,
    cycles: Mutex<Vec<Vec<String>>>,
    violations: Mutex<Vec<ArchitectureViolation>>,
    handler: Mutex<Option<ResultHandler>>,
}

/// Recover a usable guard from a poisoned lock: the protected data is a
/// plain collection, valid regardless of where another thread panicked.
fn relock<T>(result: std::result::Result<T, PoisonError<T>>) -> T {
    result.unwrap_or_else(PoisonError::into_inner)
}

impl Analyzer {
    /// Build an analyzer from validated configuration. Configuration errors
    /// surface here, before any analysis can run.
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        let arch = ArchitectureEngine::from_config(&config.architecture)?;
        Ok(Self {
            graph: Arc::new(RwLock::new(DependencyGraph::new())),
            resolver: Resolver::new(config.excluded_prefixes.clone()),
            arch,
            unresolved_cache: Mutex::new(HashMap::new()),
            unused_cache: Mutex::new(HashMap::new()),
            cycles: Mutex::new(Vec::new()),
            violations: Mutex::new(Vec::new()),
            handler: Mutex::new(None),
        })
    }

    /// Shared handle to the graph, for query surfaces that want their own
    /// read locks.
    pub fn graph(&self) -> Arc<RwLock<DependencyGraph>> {
        Arc::clone(&self.graph)
    }

    // ─── Mutation entry points ──────────────────────────────────

    /// Ingest a batch of file records, then run a full analysis pass.
    ///
    /// All mutations complete before any detector runs; the whole batch is
    /// analyzed against one snapshot.
    pub fn ingest(&self, batch: Vec<FileRecord>) -> AnalysisResults {
        let started = Instant::now();
        let count = batch.len();
        {
            let mut graph = relock(self.graph.write());
            for record in batch {
                graph.add_file(record);
            }
        }

        let graph = relock(self.graph.read());
        let mut unresolved = HashMap::new();
        let mut unused = HashMap::new();
        for file in graph.all_files() {
            let found = self.resolver.resolve_file(&graph, &file);
            if !found.is_empty() {
                unresolved.insert(file.path.clone(), found);
            }
            let found = self.resolver.find_unused_in_file(&file);
            if !found.is_empty() {
                unused.insert(file.path.clone(), found);
            }
        }
        let cycles = detect_cycles(&graph.import_map());
        let violations = self.arch.validate(&graph);
        drop(graph);

        *relock(self.unresolved_cache.lock()) = unresolved;
        *relock(self.unused_cache.lock()) = unused;
        *relock(self.cycles.lock()) = cycles;
        *relock(self.violations.lock()) = violations;

        info!(
            files = count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch ingest analyzed"
        );
        self.publish()
    }

    /// Add or replace one file, re-resolving only the transitively affected
    /// files before rerunning the whole-graph detectors.
    pub fn update_file(&self, record: FileRecord) -> AnalysisResults {
        let path = record.path.clone();
        let affected = {
            let mut graph = relock(self.graph.write());
            graph.add_file(record);
            invalidate_transitive(&graph, &path)
        };
        debug!(file = %path, affected = affected.len(), "incremental update");
        self.refresh(affected)
    }

    /// Remove one file. The invalidation set is computed from the
    /// pre-removal reverse edges, then the removed path's cached findings
    /// are pruned.
    pub fn remove_file(&self, path: &str) -> AnalysisResults {
        let affected = {
            let mut graph = relock(self.graph.write());
            let mut affected = invalidate_transitive(&graph, path);
            affected.remove(path);
            graph.remove_file(path);
            affected
        };
        relock(self.unresolved_cache.lock()).remove(path);
        relock(self.unused_cache.lock()).remove(path);
        debug!(file = %path, affected = affected.len(), "file removed");
        self.refresh(affected)
    }

    // ─── Reads ──────────────────────────────────────────────────

    /// Stale-but-consistent copy of all cached findings. Never blocks on an
    /// in-progress analysis pass beyond individual cache locks.
    pub fn results(&self) -> AnalysisResults {
        self.assemble()
    }

    /// Register the result observer invoked after each full incremental
    /// cycle. Only one handler is active; the last registration wins. The
    /// handler runs on the analysis thread and must not block for long.
    pub fn on_results<F>(&self, handler: F)
    where
        F: Fn(&AnalysisResults) + Send + Sync + 'static,
    {
        *relock(self.handler.lock()) = Some(Box::new(handler));
    }

    // ─── Internals ──────────────────────────────────────────────

    /// Re-resolve the affected file set and rerun the snapshot detectors.
    fn refresh(&self, affected: BTreeSet<String>) -> AnalysisResults {
        let started = Instant::now();
        let graph = relock(self.graph.read());

        let mut unresolved_updates = HashMap::new();
        let mut unused_updates = HashMap::new();
        for path in &affected {
            if let Some(file) = graph.file(path) {
                unresolved_updates.insert(path.clone(), self.resolver.resolve_file(&graph, &file));
                unused_updates.insert(path.clone(), self.resolver.find_unused_in_file(&file));
            }
        }
        let cycles = detect_cycles(&graph.import_map());
        let violations = self.arch.validate(&graph);
        drop(graph);

        apply_updates(relock(self.unresolved_cache.lock()), unresolved_updates);
        apply_updates(relock(self.unused_cache.lock()), unused_updates);
        *relock(self.cycles.lock()) = cycles;
        *relock(self.violations.lock()) = violations;

        debug!(
            affected = affected.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "incremental pass finished"
        );
        self.publish()
    }

    /// Assemble a snapshot and deliver it to the registered observer.
    fn publish(&self) -> AnalysisResults {
        let results = self.assemble();
        if let Some(handler) = relock(self.handler.lock()).as_ref() {
            handler(&results);
        }
        results
    }

    fn assemble(&self) -> AnalysisResults {
        let mut unresolved: Vec<UnresolvedReference> = relock(self.unresolved_cache.lock())
            .values()
            .flatten()
            .cloned()
            .collect();
        unresolved.sort_by(|a, b| {
            (&a.file, a.location.line, a.location.column, &a.name).cmp(&(
                &b.file,
                b.location.line,
                b.location.column,
                &b.name,
            ))
        });

        let mut unused: Vec<UnusedImport> = relock(self.unused_cache.lock())
            .values()
            .flatten()
            .cloned()
            .collect();
        unused.sort_by(|a, b| {
            (&a.file, a.location.line, a.location.column, &a.module).cmp(&(
                &b.file,
                b.location.line,
                b.location.column,
                &b.module,
            ))
        });

        AnalysisResults {
            cycles: relock(self.cycles.lock()).clone(),
            unresolved,
            unused,
            violations: relock(self.violations.lock()).clone(),
        }
    }
}

/// Merge per-file recomputation results into a cache: empty result sets
/// clear the entry, non-empty ones replace it.
fn apply_updates<T>(
    mut cache: MutexGuard<'_, HashMap<String, Vec<T>>>,
    updates: HashMap<String, Vec<T>>,
) {
    for (path, findings) in updates {
        if findings.is_empty() {
            cache.remove(&path);
        } else {
            cache.insert(path, findings);
        }
    }
}
