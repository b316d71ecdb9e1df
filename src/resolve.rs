//! Cross-module symbol resolution.
//!
//! Two analyses share the per-language capability tables: unresolved-
//! reference detection (is every use site backed by a local symbol, a
//! definition, an import, or the language itself?) and unused-import
//! detection (does anything in the file actually reference what the import
//! binds?).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::graph::engine::DependencyGraph;
use crate::graph::types::{
    head_segment, tail_segment, FileRecord, Language, SourceLocation,
};
use crate::lang::{module_base_name, profile};

/// A reference that could not be matched to any known definition, import,
/// stdlib namespace, or builtin: a "hallucination".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedReference {
    /// The referenced name as written (possibly dotted).
    pub name: String,
    /// File containing the reference.
    pub file: String,
    /// Where the reference appears.
    pub location: SourceLocation,
}

/// How certain the analysis is that an import is unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// A named item with zero hits; nothing else it could bind.
    High,
    /// A whole-module import whose derived name has zero hits; derivation
    /// conventions leave a little room for doubt.
    Medium,
}

/// A declared import whose bound name or item is never referenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnusedImport {
    pub file: String,
    pub language: Language,
    /// The imported module path.
    pub module: String,
    /// Alias on the import statement, if any.
    pub alias: Option<String>,
    /// The specific unused item for item-style imports; `None` when the
    /// whole-module binding is unused.
    pub item: Option<String>,
    pub location: SourceLocation,
    pub confidence: Confidence,
}

/// Symbol resolver over a consistent graph snapshot.
///
/// Stateless apart from configuration; safe to call from any thread holding
/// a graph read guard.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    /// Leading name segments that are known not to be modules (framework
    /// receiver/context names and the like) and always resolve.
    excluded_prefixes: Vec<String>,
}

impl Resolver {
    pub fn new(excluded_prefixes: Vec<String>) -> Self {
        Self { excluded_prefixes }
    }

    // ─── Unresolved references ──────────────────────────────────

    /// Resolve every reference of `file` against the graph, returning the
    /// ones nothing accounts for.
    pub fn resolve_file(
        &self,
        graph: &DependencyGraph,
        file: &FileRecord,
    ) -> Vec<UnresolvedReference> {
        let unresolved: Vec<UnresolvedReference> = file
            .references
            .iter()
            .filter(|reference| !self.resolve_reference(graph, file, &reference.name))
            .map(|reference| UnresolvedReference {
                name: reference.name.clone(),
                file: file.path.clone(),
                location: reference.location,
            })
            .collect();

        if !unresolved.is_empty() {
            debug!(
                file = %file.path,
                count = unresolved.len(),
                "unresolved references found"
            );
        }
        unresolved
    }

    /// Resolution pipeline for one reference name; first match wins.
    fn resolve_reference(&self, graph: &DependencyGraph, file: &FileRecord, name: &str) -> bool {
        let head = head_segment(name);

        // 1. File-local symbols and configured non-module prefixes.
        if file.local_symbols.iter().any(|s| s == head) {
            return true;
        }
        if self.excluded_prefixes.iter().any(|p| p == head) {
            return true;
        }

        // 2. Definitions in the file's own module; unexported allowed.
        if let Some(symbols) = graph.module_symbols(&file.module) {
            if symbols.contains_key(head) || symbols.contains_key(name) {
                return true;
            }
        }

        // 3. Imported modules: alias-, item-, and base-name-qualified.
        for imp in &file.imports {
            if let Some(alias) = &imp.alias {
                if alias == head && module_member_resolves(graph, &imp.module, tail_segment(name)) {
                    return true;
                }
            }
            if imp.items.iter().any(|item| item == head)
                && module_member_resolves(graph, &imp.module, Some(head))
            {
                return true;
            }
            if imp.alias.is_none()
                && module_base_name(file.language, &imp.module) == head
                && module_member_resolves(graph, &imp.module, tail_segment(name))
            {
                return true;
            }
        }

        // 4. Standard-library namespaces.
        let prof = profile(file.language);
        if prof.is_stdlib(head) {
            return true;
        }

        // 5. Builtins.
        prof.is_builtin(head) || prof.is_builtin(name)
    }

    // ─── Unused imports ─────────────────────────────────────────

    /// Derive unused-import findings for one file from its reference hits.
    ///
    /// Only runs for languages where import-usage tracking is meaningful;
    /// side-effect imports and namespace-blending imports are never flagged.
    pub fn find_unused_in_file(&self, file: &FileRecord) -> Vec<UnusedImport> {
        let prof = profile(file.language);
        if !prof.tracks_import_usage {
            return Vec::new();
        }

        // Hit histogram by exact name and by leading dotted segment.
        let mut exact: HashMap<&str, u32> = HashMap::new();
        let mut prefix: HashMap<&str, u32> = HashMap::new();
        for reference in &file.references {
            *exact.entry(reference.name.as_str()).or_insert(0) += 1;
            *prefix.entry(head_segment(&reference.name)).or_insert(0) += 1;
        }
        let used = |name: &str| exact.contains_key(name) || prefix.contains_key(name);

        let mut findings = Vec::new();
        for imp in &file.imports {
            if !imp.items.is_empty() {
                // Item imports: every zero-hit item is individually unused.
                for item in &imp.items {
                    if !used(item) {
                        findings.push(UnusedImport {
                            file: file.path.clone(),
                            language: file.language,
                            module: imp.module.clone(),
                            alias: imp.alias.clone(),
                            item: Some(item.clone()),
                            location: imp.location,
                            confidence: Confidence::High,
                        });
                    }
                }
                continue;
            }

            let bound = match imp.alias.as_deref() {
                // Imported for effect only.
                Some("_") => continue,
                // Namespace blending: membership can't be verified.
                Some(".") => continue,
                Some(alias) => alias,
                None if prof.bare_import_may_be_side_effect => continue,
                None => module_base_name(file.language, &imp.module),
            };

            if !used(bound) {
                findings.push(UnusedImport {
                    file: file.path.clone(),
                    language: file.language,
                    module: imp.module.clone(),
                    alias: imp.alias.clone(),
                    item: None,
                    location: imp.location,
                    confidence: Confidence::Medium,
                });
            }
        }
        findings
    }
}

/// Whether `member` of `module` resolves for a cross-module reference.
///
/// Modules outside the graph (external dependencies) resolve optimistically,
/// since membership can't be checked. For known modules only exported
/// definitions count.
fn module_member_resolves(graph: &DependencyGraph, module: &str, member: Option<&str>) -> bool {
    let Some(member) = member else {
        // The module name itself was referenced, not one of its members.
        return true;
    };
    if !graph.contains_module(module) {
        return true;
    }
    graph
        .module_exports(module)
        .is_some_and(|exports| exports.contains_key(head_segment(member)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{DefKind, Definition, ImportDecl, Reference};

    fn loc() -> SourceLocation {
        SourceLocation::new(1, 1)
    }

    fn exporting_module(graph: &mut DependencyGraph, path: &str, module: &str, exports: &[&str]) {
        let mut rec = FileRecord::new(path, Language::Go, module);
        rec.definitions = exports
            .iter()
            .map(|name| {
                Definition::new(name, &format!("{}.{}", module, name), DefKind::Function, true)
            })
            .collect();
        graph.add_file(rec);
    }

    fn importing_file(module: &str, imports: &[&str], references: &[&str]) -> FileRecord {
        let mut rec = FileRecord::new("b.go", Language::Go, module);
        rec.imports = imports
            .iter()
            .map(|m| ImportDecl::module_import(m, loc()))
            .collect();
        rec.references = references.iter().map(|r| Reference::new(r, loc())).collect();
        rec
    }

    #[test]
    fn test_missing_export_is_reported() {
        let mut graph = DependencyGraph::new();
        exporting_module(&mut graph, "a.go", "modA", &["FuncA"]);

        let file = importing_file("modB", &["modA"], &["modA.FuncA", "modA.FuncMissing"]);
        graph.add_file(file.clone());

        let resolver = Resolver::default();
        let unresolved = resolver.resolve_file(&graph, &file);
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].name, "modA.FuncMissing");
        assert_eq!(unresolved[0].file, "b.go");
    }

    #[test]
    fn test_local_symbols_resolve() {
        let graph = DependencyGraph::new();
        let mut file = importing_file("modB", &[], &["cursor.next"]);
        file.local_symbols = vec!["cursor".to_string()];

        let resolver = Resolver::default();
        assert!(resolver.resolve_file(&graph, &file).is_empty());
    }

    #[test]
    fn test_excluded_prefix_resolves() {
        let graph = DependencyGraph::new();
        let file = importing_file("modB", &[], &["ctx.Done"]);

        let resolver = Resolver::new(vec!["ctx".to_string()]);
        assert!(resolver.resolve_file(&graph, &file).is_empty());
    }

    #[test]
    fn test_same_module_unexported_definition_resolves() {
        let mut graph = DependencyGraph::new();
        let mut rec = FileRecord::new("a.go", Language::Go, "modA");
        rec.definitions = vec![Definition::new(
            "helper",
            "modA.helper",
            DefKind::Function,
            false,
        )];
        graph.add_file(rec);

        let mut file = importing_file("modA", &[], &["helper"]);
        file.path = "a2.go".to_string();
        graph.add_file(file.clone());

        let resolver = Resolver::default();
        assert!(resolver.resolve_file(&graph, &file).is_empty());
    }

    #[test]
    fn test_unexported_cross_module_does_not_resolve() {
        let mut graph = DependencyGraph::new();
        let mut rec = FileRecord::new("a.go", Language::Go, "modA");
        rec.definitions = vec![Definition::new(
            "helper",
            "modA.helper",
            DefKind::Function,
            false,
        )];
        graph.add_file(rec);

        let file = importing_file("modB", &["modA"], &["modA.helper"]);
        let resolver = Resolver::default();
        let unresolved = resolver.resolve_file(&graph, &file);
        assert_eq!(unresolved.len(), 1);
    }

    #[test]
    fn test_alias_qualified_resolution() {
        let mut graph = DependencyGraph::new();
        exporting_module(&mut graph, "a.go", "myapp/models", &["User"]);

        let mut file = FileRecord::new("b.go", Language::Go, "myapp/api");
        let mut imp = ImportDecl::module_import("myapp/models", loc());
        imp.alias = Some("m".to_string());
        file.imports = vec![imp];
        file.references = vec![
            Reference::new("m.User", loc()),
            Reference::new("m.Ghost", loc()),
        ];
        graph.add_file(file.clone());

        let resolver = Resolver::default();
        let unresolved = resolver.resolve_file(&graph, &file);
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].name, "m.Ghost");
    }

    #[test]
    fn test_item_qualified_resolution() {
        let mut graph = DependencyGraph::new();
        exporting_module(&mut graph, "a.py", "models", &["User"]);

        let mut file = FileRecord::new("b.py", Language::Python, "api");
        let mut imp = ImportDecl::module_import("models", loc());
        imp.items = vec!["User".to_string()];
        file.imports = vec![imp];
        file.references = vec![Reference::new("User", loc())];
        graph.add_file(file.clone());

        let resolver = Resolver::default();
        assert!(resolver.resolve_file(&graph, &file).is_empty());
    }

    #[test]
    fn test_base_name_resolution_for_nested_path() {
        let mut graph = DependencyGraph::new();
        exporting_module(&mut graph, "a.go", "myapp/store", &["Open"]);

        // `import "myapp/store"` binds `store`.
        let file = importing_file("myapp/api", &["myapp/store"], &["store.Open"]);
        let resolver = Resolver::default();
        assert!(resolver.resolve_file(&graph, &file).is_empty());
    }

    #[test]
    fn test_unknown_module_resolves_optimistically() {
        let graph = DependencyGraph::new();
        let file = importing_file(
            "modB",
            &["github.com/gin-gonic/gin"],
            &["gin.Default", "gin.New"],
        );
        let resolver = Resolver::default();
        assert!(resolver.resolve_file(&graph, &file).is_empty());
    }

    #[test]
    fn test_stdlib_and_builtin_fallbacks() {
        let graph = DependencyGraph::new();
        let file = importing_file("modB", &[], &["fmt.Println", "len", "nosuchthing"]);
        let resolver = Resolver::default();
        let unresolved = resolver.resolve_file(&graph, &file);
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].name, "nosuchthing");
    }

    // ─── Unused imports ─────────────────────────────────────────

    #[test]
    fn test_unreferenced_whole_module_import_is_medium() {
        let file = importing_file("modB", &["myapp/store"], &["fmt.Println"]);
        let resolver = Resolver::default();
        let unused = resolver.find_unused_in_file(&file);
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].module, "myapp/store");
        assert_eq!(unused[0].confidence, Confidence::Medium);
        assert!(unused[0].item.is_none());
    }

    #[test]
    fn test_referenced_by_base_name_is_used() {
        let file = importing_file("modB", &["myapp/store"], &["store.Open"]);
        let resolver = Resolver::default();
        assert!(resolver.find_unused_in_file(&file).is_empty());
    }

    #[test]
    fn test_zero_hit_items_are_high_confidence() {
        let mut file = FileRecord::new("b.py", Language::Python, "api");
        let mut imp = ImportDecl::module_import("models", loc());
        imp.items = vec!["User".to_string(), "Role".to_string()];
        file.imports = vec![imp];
        file.references = vec![Reference::new("User", loc())];

        let resolver = Resolver::default();
        let unused = resolver.find_unused_in_file(&file);
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].item.as_deref(), Some("Role"));
        assert_eq!(unused[0].confidence, Confidence::High);
    }

    #[test]
    fn test_side_effect_alias_never_flagged() {
        let mut file = FileRecord::new("b.go", Language::Go, "modB");
        let mut imp = ImportDecl::module_import("database/sql/driver", loc());
        imp.alias = Some("_".to_string());
        file.imports = vec![imp];

        let resolver = Resolver::default();
        assert!(resolver.find_unused_in_file(&file).is_empty());
    }

    #[test]
    fn test_namespace_blend_alias_never_flagged() {
        let mut file = FileRecord::new("b.go", Language::Go, "modB");
        let mut imp = ImportDecl::module_import("myapp/dsl", loc());
        imp.alias = Some(".".to_string());
        file.imports = vec![imp];

        let resolver = Resolver::default();
        assert!(resolver.find_unused_in_file(&file).is_empty());
    }

    #[test]
    fn test_bare_import_skipped_for_side_effect_languages() {
        let mut file = FileRecord::new("app.ts", Language::TypeScript, "app");
        file.imports = vec![ImportDecl::module_import("./styles.css", loc())];

        let resolver = Resolver::default();
        assert!(resolver.find_unused_in_file(&file).is_empty());
    }

    #[test]
    fn test_unused_alias_is_flagged() {
        let mut file = FileRecord::new("b.py", Language::Python, "api");
        let mut imp = ImportDecl::module_import("numpy", loc());
        imp.alias = Some("np".to_string());
        file.imports = vec![imp];

        let resolver = Resolver::default();
        let unused = resolver.find_unused_in_file(&file);
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].alias.as_deref(), Some("np"));
    }

    #[test]
    fn test_untracked_language_reports_nothing() {
        let mut file = FileRecord::new("lib.rs", Language::Rust, "mylib");
        file.imports = vec![ImportDecl::module_import("std::collections", loc())];

        let resolver = Resolver::default();
        assert!(resolver.find_unused_in_file(&file).is_empty());
    }
}
