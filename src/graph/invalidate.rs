//! Transitive change-invalidation over the reverse-import index.

use std::collections::{BTreeSet, VecDeque};
use tracing::debug;

use super::engine::DependencyGraph;

/// Compute the set of files that must be re-analyzed after `changed_path`
/// changes: the file itself plus every file of every module that imports the
/// changed file's module, directly or transitively.
///
/// Unknown paths produce an empty set. The graph is not mutated.
pub fn invalidate_transitive(graph: &DependencyGraph, changed_path: &str) -> BTreeSet<String> {
    let Some(seed_module) = graph.module_of(changed_path) else {
        return BTreeSet::new();
    };

    let mut result = BTreeSet::new();
    result.insert(changed_path.to_string());

    // Breadth-first over importers, guarding against re-enqueueing a module
    // reachable along more than one reverse path.
    let mut enqueued: BTreeSet<String> = BTreeSet::new();
    enqueued.insert(seed_module.to_string());
    let mut queue: VecDeque<String> = VecDeque::new();

    if let Some(importers) = graph.importers(seed_module) {
        for importer in importers {
            enqueued.insert(importer.clone());
            queue.push_back(importer.clone());
        }
    }

    while let Some(module) = queue.pop_front() {
        if let Some(files) = graph.member_files(&module) {
            result.extend(files.iter().cloned());
        }
        if let Some(importers) = graph.importers(&module) {
            for importer in importers {
                if enqueued.insert(importer.clone()) {
                    queue.push_back(importer.clone());
                }
            }
        }
    }

    debug!(
        changed = %changed_path,
        affected = result.len(),
        "computed invalidation set"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{FileRecord, ImportDecl, Language, SourceLocation};

    fn record(path: &str, module: &str, imports: &[&str]) -> FileRecord {
        let mut rec = FileRecord::new(path, Language::Go, module);
        rec.imports = imports
            .iter()
            .map(|m| ImportDecl::module_import(m, SourceLocation::new(1, 1)))
            .collect();
        rec
    }

    /// C imports B, B imports A; changing a.file invalidates all three.
    fn chain() -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        graph.add_file(record("a.file", "A", &[]));
        graph.add_file(record("b.file", "B", &["A"]));
        graph.add_file(record("c.file", "C", &["B"]));
        graph
    }

    #[test]
    fn test_unknown_path_is_empty() {
        let graph = chain();
        assert!(invalidate_transitive(&graph, "ghost.file").is_empty());
    }

    #[test]
    fn test_transitive_dependents_invalidated() {
        let graph = chain();
        let affected = invalidate_transitive(&graph, "a.file");
        let expected: BTreeSet<String> = ["a.file", "b.file", "c.file"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(affected, expected);
    }

    #[test]
    fn test_leaf_change_invalidates_only_itself() {
        let graph = chain();
        let affected = invalidate_transitive(&graph, "c.file");
        assert_eq!(affected.len(), 1);
        assert!(affected.contains("c.file"));
    }

    #[test]
    fn test_mid_chain_change() {
        let graph = chain();
        let affected = invalidate_transitive(&graph, "b.file");
        assert!(affected.contains("b.file"));
        assert!(affected.contains("c.file"));
        assert!(!affected.contains("a.file"));
    }

    #[test]
    fn test_cyclic_imports_terminate() {
        let mut graph = DependencyGraph::new();
        graph.add_file(record("a.file", "A", &["B"]));
        graph.add_file(record("b.file", "B", &["A"]));

        let affected = invalidate_transitive(&graph, "a.file");
        assert!(affected.contains("a.file"));
        assert!(affected.contains("b.file"));
    }

    #[test]
    fn test_importer_module_contributes_all_its_files() {
        let mut graph = DependencyGraph::new();
        graph.add_file(record("a.file", "A", &[]));
        graph.add_file(record("b1.file", "B", &["A"]));
        graph.add_file(record("b2.file", "B", &[]));

        let affected = invalidate_transitive(&graph, "a.file");
        assert!(
            affected.contains("b2.file"),
            "every file of a dependent module is affected"
        );
    }

    #[test]
    fn test_diamond_dependents_visited_once() {
        let mut graph = DependencyGraph::new();
        graph.add_file(record("a.file", "A", &[]));
        graph.add_file(record("b.file", "B", &["A"]));
        graph.add_file(record("c.file", "C", &["A"]));
        graph.add_file(record("d.file", "D", &["B", "C"]));

        let affected = invalidate_transitive(&graph, "a.file");
        assert_eq!(affected.len(), 4);
    }
}
