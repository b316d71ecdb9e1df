//! The dependency graph engine for Beacon.
//!
//! Stores files, their module aggregation, per-module export tables, and the
//! module-level import edges, with a reverse index kept in lock-step for
//! impact queries. All lookups hand out owned copies; the two mutation entry
//! points rebuild a module's aggregates from its member files so re-ingesting
//! an edited file can never leave stale contributions behind.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use super::types::{Definition, FileRecord, SourceLocation};

/// A directed module-to-module dependency, annotated with the file and
/// location of the import statement that declared it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEdge {
    /// Importing module.
    pub from: String,
    /// Imported module. May name a module with no files in the graph
    /// (an external or not-yet-scanned dependency).
    pub to: String,
    /// File whose import statement produced this edge.
    pub file: String,
    /// Location of that import statement.
    pub location: SourceLocation,
}

/// Aggregation of the files sharing one module name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleNode {
    /// Module name.
    pub name: String,
    /// Member file paths, sorted.
    pub files: BTreeSet<String>,
    /// All definitions declared by member files, keyed by symbol name.
    pub symbols: HashMap<String, Definition>,
    /// Exported subset of `symbols`: what other modules may reference.
    pub exports: HashMap<String, Definition>,
}

impl ModuleNode {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

/// Aggregate graph sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub module_count: usize,
    pub file_count: usize,
    pub edge_count: usize,
}

/// The main dependency graph — files, modules, and import edges with
/// cross-reference bookkeeping.
///
/// A module exists exactly as long as it has at least one member file.
/// Import edges may point at module names that have no node (external
/// dependencies); those targets still appear in the reverse index so the
/// forward and reverse indexes stay exact transposes of each other.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Path -> latest ingested record.
    files: HashMap<String, FileRecord>,
    /// Module name -> aggregation of its member files.
    modules: HashMap<String, ModuleNode>,
    /// Forward edge index: from-module -> (to-module -> edge).
    imports: HashMap<String, BTreeMap<String, ImportEdge>>,
    /// Reverse edge index: to-module -> set of from-modules.
    imported_by: HashMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Mutation ───────────────────────────────────────────────

    /// Insert or replace a file's contributions.
    ///
    /// Any prior contributions of the same path (edges, exports, symbol
    /// entries) are retracted first, so re-ingesting an edited file is
    /// idempotent rather than additive. Creates the module if absent.
    pub fn add_file(&mut self, record: FileRecord) {
        if let Some(old) = self.files.remove(&record.path) {
            debug!(file = %record.path, "retracting stale contributions before re-ingest");
            self.detach(&old);
        }

        let path = record.path.clone();
        let module = record.module.clone();
        self.files.insert(path.clone(), record);
        self.modules
            .entry(module.clone())
            .or_insert_with(|| ModuleNode::new(&module))
            .files
            .insert(path.clone());
        self.refresh_module(&module);

        debug!(file = %path, module = %module, "file added to graph");
    }

    /// Remove a file and everything it contributed. Unknown paths are a
    /// no-op; absence is routine during incremental updates.
    pub fn remove_file(&mut self, path: &str) {
        let Some(old) = self.files.remove(path) else {
            return;
        };
        debug!(file = %path, module = %old.module, "removing file from graph");
        self.detach(&old);
    }

    /// Detach a removed record from its module: rebuild the module's
    /// aggregates from the remaining members, or delete the module entirely
    /// when this was its last file.
    fn detach(&mut self, old: &FileRecord) {
        let emptied = match self.modules.get_mut(&old.module) {
            Some(node) => {
                node.files.remove(&old.path);
                node.files.is_empty()
            }
            None => return,
        };

        if emptied {
            self.modules.remove(&old.module);
            self.drop_outgoing_edges(&old.module);
            debug!(module = %old.module, "module emptied and deleted");
        } else {
            self.refresh_module(&old.module);
        }
    }

    /// Recompute a module's export table, symbol table, and outgoing edges
    /// from its current member files, syncing the reverse index to match.
    fn refresh_module(&mut self, name: &str) {
        let member_paths: Vec<String> = match self.modules.get(name) {
            Some(node) => node.files.iter().cloned().collect(),
            None => return,
        };

        let mut symbols = HashMap::new();
        let mut exports = HashMap::new();
        let mut edges: BTreeMap<String, ImportEdge> = BTreeMap::new();

        for path in &member_paths {
            let Some(record) = self.files.get(path) else {
                continue;
            };
            for def in &record.definitions {
                symbols.insert(def.name.clone(), def.clone());
                if def.exported {
                    exports.insert(def.name.clone(), def.clone());
                }
            }
            for imp in &record.imports {
                // A module importing itself carries no dependency information.
                if imp.module == name {
                    continue;
                }
                edges.insert(
                    imp.module.clone(),
                    ImportEdge {
                        from: name.to_string(),
                        to: imp.module.clone(),
                        file: path.clone(),
                        location: imp.location,
                    },
                );
            }
        }

        if let Some(node) = self.modules.get_mut(name) {
            node.symbols = symbols;
            node.exports = exports;
        }

        // Diff old vs. new targets so the reverse index stays an exact
        // transpose of the forward index.
        let old_targets: BTreeSet<String> = self
            .imports
            .get(name)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        let new_targets: BTreeSet<String> = edges.keys().cloned().collect();

        for gone in old_targets.difference(&new_targets) {
            self.unlink_reverse(gone, name);
        }
        for added in new_targets.difference(&old_targets) {
            self.imported_by
                .entry(added.clone())
                .or_default()
                .insert(name.to_string());
        }

        if edges.is_empty() {
            self.imports.remove(name);
        } else {
            self.imports.insert(name.to_string(), edges);
        }
    }

    /// Remove all outgoing edges of a deleted module, pruning it from every
    /// reverse-index set it appeared in.
    fn drop_outgoing_edges(&mut self, name: &str) {
        if let Some(edges) = self.imports.remove(name) {
            for target in edges.keys() {
                self.unlink_reverse(target, name);
            }
        }
    }

    fn unlink_reverse(&mut self, target: &str, from: &str) {
        if let Some(set) = self.imported_by.get_mut(target) {
            set.remove(from);
            if set.is_empty() {
                self.imported_by.remove(target);
            }
        }
    }

    // ─── Lookups ────────────────────────────────────────────────

    /// Look up a module aggregation by name. Returns an owned copy.
    pub fn module(&self, name: &str) -> Option<ModuleNode> {
        self.modules.get(name).cloned()
    }

    /// Look up a file record by path. Returns an owned copy.
    pub fn file(&self, path: &str) -> Option<FileRecord> {
        self.files.get(path).cloned()
    }

    /// The full definition table of a module (exported and not).
    pub fn definitions(&self, module: &str) -> Option<HashMap<String, Definition>> {
        self.modules.get(module).map(|node| node.symbols.clone())
    }

    /// All file records, sorted by path.
    pub fn all_files(&self) -> Vec<FileRecord> {
        let mut files: Vec<FileRecord> = self.files.values().cloned().collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// Every import edge, sorted by (from, to).
    pub fn import_edges(&self) -> Vec<ImportEdge> {
        let mut froms: Vec<&String> = self.imports.keys().collect();
        froms.sort();
        froms
            .into_iter()
            .flat_map(|from| self.imports[from].values().cloned())
            .collect()
    }

    /// Snapshot of the module adjacency: every known module, mapped to the
    /// sorted set of modules it imports. The detector input.
    pub fn import_map(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut map: BTreeMap<String, BTreeSet<String>> = self
            .modules
            .keys()
            .map(|name| (name.clone(), BTreeSet::new()))
            .collect();
        for (from, edges) in &self.imports {
            map.entry(from.clone())
                .or_default()
                .extend(edges.keys().cloned());
        }
        map
    }

    /// Modules that import `module`, directly. Returns an owned copy.
    pub fn imported_by(&self, module: &str) -> BTreeSet<String> {
        self.imported_by.get(module).cloned().unwrap_or_default()
    }

    /// Borrowing form of [`imported_by`](Self::imported_by) for in-crate
    /// traversals that already hold a graph reference.
    pub(crate) fn importers(&self, module: &str) -> Option<&BTreeSet<String>> {
        self.imported_by.get(module)
    }

    /// Borrowing member-file lookup for in-crate traversals that already
    /// hold a graph reference.
    pub(crate) fn member_files(&self, module: &str) -> Option<&BTreeSet<String>> {
        self.modules.get(module).map(|node| &node.files)
    }

    /// Whether a module currently has any member files.
    pub(crate) fn contains_module(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    /// Borrowing view of a module's full symbol table.
    pub(crate) fn module_symbols(&self, module: &str) -> Option<&HashMap<String, Definition>> {
        self.modules.get(module).map(|node| &node.symbols)
    }

    /// Borrowing view of a module's export table.
    pub(crate) fn module_exports(&self, module: &str) -> Option<&HashMap<String, Definition>> {
        self.modules.get(module).map(|node| &node.exports)
    }

    /// Module a path belongs to, if the path is known.
    pub(crate) fn module_of(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(|r| r.module.as_str())
    }

    /// Number of modules currently in the graph.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Number of files currently in the graph.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Aggregate graph sizes.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            module_count: self.modules.len(),
            file_count: self.files.len(),
            edge_count: self.imports.values().map(|m| m.len()).sum(),
        }
    }
}
