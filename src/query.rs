//! Read-only query projections over the dependency graph.
//!
//! Thin consumers of the graph's public API: module summaries, shortest
//! import chains, and the impact report. No algorithms here beyond
//! breadth-first search.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::graph::engine::DependencyGraph;

/// A compact description of one module for display surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub name: String,
    pub files: Vec<String>,
    pub definition_count: usize,
    pub export_count: usize,
    /// Modules this module imports, sorted.
    pub imports: Vec<String>,
    /// Modules importing this module, sorted.
    pub imported_by: Vec<String>,
}

/// Outcome of a shortest import-chain lookup. "No path" and "unknown
/// module" are reportable outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "result", content = "value")]
pub enum ChainResult {
    /// The shortest chain, endpoints included.
    Found(Vec<String>),
    /// Both endpoints exist but no import chain connects them.
    NoPath,
    /// The named endpoint is not in the graph.
    UnknownModule(String),
}

/// Everything that must re-verify when a module changes: its transitive
/// dependents and all of their files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactReport {
    pub module: String,
    /// Modules that import `module` directly or transitively, sorted.
    pub dependent_modules: Vec<String>,
    /// Files of `module` and of every dependent module, sorted.
    pub affected_files: Vec<String>,
}

/// Summarize one module, or `None` for unknown names.
pub fn module_summary(graph: &DependencyGraph, name: &str) -> Option<ModuleSummary> {
    let node = graph.module(name)?;
    let imports: Vec<String> = graph
        .import_map()
        .remove(name)
        .map(|targets| targets.into_iter().collect())
        .unwrap_or_default();
    Some(ModuleSummary {
        name: node.name,
        files: node.files.into_iter().collect(),
        definition_count: node.symbols.len(),
        export_count: node.exports.len(),
        imports,
        imported_by: graph.imported_by(name).into_iter().collect(),
    })
}

/// Shortest import chain from `from` to `to`, endpoints included.
///
/// Breadth-first over the module graph; candidate neighbors are visited in
/// sorted order so equal-length chains always resolve the same way. The
/// target may be an edge-only module (an external dependency something
/// imports); a name that is neither a module nor an import target is
/// reported as unknown.
pub fn find_import_chain(graph: &DependencyGraph, from: &str, to: &str) -> ChainResult {
    if !graph.contains_module(from) {
        return ChainResult::UnknownModule(from.to_string());
    }
    let adjacency = graph.import_map();
    let target_known =
        graph.contains_module(to) || adjacency.values().any(|targets| targets.contains(to));
    if !target_known {
        return ChainResult::UnknownModule(to.to_string());
    }
    if from == to {
        return ChainResult::Found(vec![from.to_string()]);
    }

    let mut predecessor: HashMap<String, String> = HashMap::new();
    let mut queue: VecDeque<String> = VecDeque::new();
    queue.push_back(from.to_string());

    while let Some(current) = queue.pop_front() {
        let Some(neighbors) = adjacency.get(&current) else {
            continue;
        };
        // BTreeSet iteration is already sorted.
        for neighbor in neighbors {
            if neighbor == from || predecessor.contains_key(neighbor) {
                continue;
            }
            predecessor.insert(neighbor.clone(), current.clone());
            if neighbor == to {
                return ChainResult::Found(reconstruct(&predecessor, from, to));
            }
            queue.push_back(neighbor.clone());
        }
    }

    ChainResult::NoPath
}

fn reconstruct(predecessor: &HashMap<String, String>, from: &str, to: &str) -> Vec<String> {
    let mut chain = vec![to.to_string()];
    let mut current = to;
    while current != from {
        match predecessor.get(current) {
            Some(prev) => {
                chain.push(prev.clone());
                current = prev;
            }
            None => break,
        }
    }
    chain.reverse();
    chain
}

/// Every module reachable from `module` by following import edges, sorted.
/// `None` for unknown module names.
pub fn dependency_trace(graph: &DependencyGraph, module: &str) -> Option<Vec<String>> {
    if !graph.contains_module(module) {
        return None;
    }
    let adjacency = graph.import_map();
    let mut reachable: BTreeSet<String> = BTreeSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.push_back(module);

    while let Some(current) = queue.pop_front() {
        let Some(neighbors) = adjacency.get(current) else {
            continue;
        };
        for neighbor in neighbors {
            if neighbor != module && reachable.insert(neighbor.clone()) {
                queue.push_back(neighbor);
            }
        }
    }

    Some(reachable.into_iter().collect())
}

/// The transitive closure of a module's dependents, expanded to files.
/// `None` for unknown module names.
pub fn impact_report(graph: &DependencyGraph, module: &str) -> Option<ImpactReport> {
    if !graph.contains_module(module) {
        return None;
    }

    let mut dependents: BTreeSet<String> = BTreeSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();
    queue.push_back(module.to_string());

    while let Some(current) = queue.pop_front() {
        if let Some(importers) = graph.importers(&current) {
            for importer in importers {
                if importer != module && dependents.insert(importer.clone()) {
                    queue.push_back(importer.clone());
                }
            }
        }
    }

    let mut affected_files: BTreeSet<String> = graph
        .member_files(module)
        .map(|files| files.iter().cloned().collect())
        .unwrap_or_default();
    for dependent in &dependents {
        if let Some(files) = graph.member_files(dependent) {
            affected_files.extend(files.iter().cloned());
        }
    }

    Some(ImpactReport {
        module: module.to_string(),
        dependent_modules: dependents.into_iter().collect(),
        affected_files: affected_files.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{DefKind, Definition, FileRecord, ImportDecl, Language, SourceLocation};

    fn record(path: &str, module: &str, imports: &[&str]) -> FileRecord {
        let mut rec = FileRecord::new(path, Language::Go, module);
        rec.imports = imports
            .iter()
            .map(|m| ImportDecl::module_import(m, SourceLocation::new(1, 1)))
            .collect();
        rec
    }

    fn chain_graph() -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        graph.add_file(record("a.go", "A", &["B"]));
        graph.add_file(record("b.go", "B", &["C"]));
        graph.add_file(record("c.go", "C", &[]));
        graph
    }

    #[test]
    fn test_module_summary() {
        let mut graph = chain_graph();
        let mut rec = record("b2.go", "B", &[]);
        rec.definitions = vec![
            Definition::new("Open", "B.Open", DefKind::Function, true),
            Definition::new("internal", "B.internal", DefKind::Function, false),
        ];
        graph.add_file(rec);

        let summary = module_summary(&graph, "B").unwrap();
        assert_eq!(summary.files, vec!["b.go", "b2.go"]);
        assert_eq!(summary.definition_count, 2);
        assert_eq!(summary.export_count, 1);
        assert_eq!(summary.imports, vec!["C"]);
        assert_eq!(summary.imported_by, vec!["A"]);
    }

    #[test]
    fn test_module_summary_unknown() {
        assert!(module_summary(&chain_graph(), "ghost").is_none());
    }

    #[test]
    fn test_import_chain_found() {
        let graph = chain_graph();
        assert_eq!(
            find_import_chain(&graph, "A", "C"),
            ChainResult::Found(vec!["A".into(), "B".into(), "C".into()])
        );
    }

    #[test]
    fn test_import_chain_no_path() {
        let mut graph = chain_graph();
        graph.add_file(record("d.go", "D", &[]));
        assert_eq!(find_import_chain(&graph, "A", "D"), ChainResult::NoPath);
    }

    #[test]
    fn test_import_chain_unknown_endpoints() {
        let graph = chain_graph();
        assert_eq!(
            find_import_chain(&graph, "ghost", "C"),
            ChainResult::UnknownModule("ghost".to_string())
        );
        assert_eq!(
            find_import_chain(&graph, "A", "ghost"),
            ChainResult::UnknownModule("ghost".to_string())
        );
    }

    #[test]
    fn test_import_chain_same_module() {
        let graph = chain_graph();
        assert_eq!(
            find_import_chain(&graph, "B", "B"),
            ChainResult::Found(vec!["B".to_string()])
        );
    }

    #[test]
    fn test_import_chain_prefers_shortest() {
        let mut graph = DependencyGraph::new();
        graph.add_file(record("a.go", "A", &["B", "C"]));
        graph.add_file(record("b.go", "B", &["D"]));
        graph.add_file(record("c.go", "C", &["X"]));
        graph.add_file(record("x.go", "X", &["D"]));
        graph.add_file(record("d.go", "D", &[]));

        assert_eq!(
            find_import_chain(&graph, "A", "D"),
            ChainResult::Found(vec!["A".into(), "B".into(), "D".into()])
        );
    }

    #[test]
    fn test_import_chain_to_external_target() {
        let mut graph = DependencyGraph::new();
        graph.add_file(record("a.go", "A", &["vendor/lib"]));
        assert_eq!(
            find_import_chain(&graph, "A", "vendor/lib"),
            ChainResult::Found(vec!["A".into(), "vendor/lib".into()])
        );
    }

    #[test]
    fn test_dependency_trace() {
        let graph = chain_graph();
        assert_eq!(
            dependency_trace(&graph, "A").unwrap(),
            vec!["B".to_string(), "C".to_string()]
        );
        assert!(dependency_trace(&graph, "C").unwrap().is_empty());
        assert!(dependency_trace(&graph, "ghost").is_none());
    }

    #[test]
    fn test_dependency_trace_through_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add_file(record("a.go", "A", &["B"]));
        graph.add_file(record("b.go", "B", &["A"]));
        let trace = dependency_trace(&graph, "A").unwrap();
        assert_eq!(trace, vec!["B".to_string()]);
    }

    #[test]
    fn test_impact_report() {
        let graph = chain_graph();
        let report = impact_report(&graph, "C").unwrap();
        assert_eq!(report.dependent_modules, vec!["A", "B"]);
        assert_eq!(report.affected_files, vec!["a.go", "b.go", "c.go"]);
    }

    #[test]
    fn test_impact_report_leaf() {
        let graph = chain_graph();
        let report = impact_report(&graph, "A").unwrap();
        assert!(report.dependent_modules.is_empty());
        assert_eq!(report.affected_files, vec!["a.go"]);
    }

    #[test]
    fn test_impact_report_unknown() {
        assert!(impact_report(&chain_graph(), "ghost").is_none());
    }
}
