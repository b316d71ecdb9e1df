//! Core types for the Beacon dependency graph.
//!
//! Defines the normalized source-file record supplied by language front ends,
//! plus the import/definition/reference building blocks the graph stores.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages the analysis understands.
///
/// The concrete parsers live outside this crate; the core only needs the tag
/// to pick the right stdlib/builtin tables and import conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Go,
    Python,
    JavaScript,
    TypeScript,
    Rust,
}

impl Language {
    /// Parse a language tag as emitted by the front end.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "go" => Some(Language::Go),
            "python" => Some(Language::Python),
            "javascript" => Some(Language::JavaScript),
            "typescript" => Some(Language::TypeScript),
            "rust" => Some(Language::Rust),
            _ => None,
        }
    }

    /// Get the display name.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Go => "Go",
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Rust => "Rust",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A line/column position inside a source file (1-indexed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An import statement declared by a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDecl {
    /// The imported module path (e.g. `net/http`, `myapp.models`).
    pub module: String,
    /// The import statement as written in source.
    pub raw: String,
    /// Explicit alias, if any (`import x as y`, `alias "pkg"`).
    pub alias: Option<String>,
    /// Specific items pulled in (`from m import a, b`), empty for
    /// whole-module imports.
    pub items: Vec<String>,
    /// Whether the import path is relative to the importing file.
    pub is_relative: bool,
    /// Where the import statement appears.
    pub location: SourceLocation,
}

impl ImportDecl {
    /// A plain whole-module import with no alias or item list.
    pub fn module_import(module: &str, location: SourceLocation) -> Self {
        Self {
            module: module.to_string(),
            raw: format!("import {}", module),
            alias: None,
            items: Vec::new(),
            is_relative: false,
            location,
        }
    }
}

/// The kind of a declared symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefKind {
    Function,
    Class,
    Method,
    Variable,
    Constant,
    Type,
    Interface,
}

impl fmt::Display for DefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefKind::Function => write!(f, "function"),
            DefKind::Class => write!(f, "class"),
            DefKind::Method => write!(f, "method"),
            DefKind::Variable => write!(f, "variable"),
            DefKind::Constant => write!(f, "constant"),
            DefKind::Type => write!(f, "type"),
            DefKind::Interface => write!(f, "interface"),
        }
    }
}

/// Optional complexity attributes attached to a definition by the front end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DefMetrics {
    pub param_count: Option<u32>,
    pub branch_count: Option<u32>,
    pub nesting_depth: Option<u32>,
    pub line_count: Option<u32>,
    pub complexity: Option<f64>,
}

/// A named symbol declared in a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    /// Symbol name as referenced in code.
    pub name: String,
    /// Fully-qualified name (module-prefixed).
    pub qualified_name: String,
    /// What kind of symbol this is.
    pub kind: DefKind,
    /// Whether the symbol is visible outside its module.
    pub exported: bool,
    /// Where the definition starts.
    pub location: SourceLocation,
    /// Complexity attributes, when the front end computed them.
    #[serde(default)]
    pub metrics: DefMetrics,
}

impl Definition {
    pub fn new(name: &str, qualified_name: &str, kind: DefKind, exported: bool) -> Self {
        Self {
            name: name.to_string(),
            qualified_name: qualified_name.to_string(),
            kind,
            exported,
            location: SourceLocation::default(),
            metrics: DefMetrics::default(),
        }
    }
}

/// A symbol use site inside a file. The name may be dotted
/// (`modA.FuncA`, `pkg.Type.method`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    pub location: SourceLocation,
}

impl Reference {
    pub fn new(name: &str, location: SourceLocation) -> Self {
        Self {
            name: name.to_string(),
            location,
        }
    }

    /// The leading dotted segment (`modA.FuncA` -> `modA`), or the whole
    /// name when undotted.
    pub fn head(&self) -> &str {
        head_segment(&self.name)
    }
}

/// First dotted segment of a possibly-qualified name.
pub fn head_segment(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// Everything after the leading dotted segment, if anything.
pub fn tail_segment(name: &str) -> Option<&str> {
    name.split_once('.').map(|(_, rest)| rest)
}

/// The normalized record for one analyzed source file.
///
/// Produced by the (external) per-language extraction front end; this is the
/// sole input contract of the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Project-relative path; unique key for the file.
    pub path: String,
    /// Language the file was analyzed as.
    pub language: Language,
    /// Resolved module name the file belongs to.
    pub module: String,
    /// Local/package name, when distinct from the module path.
    #[serde(default)]
    pub package: Option<String>,
    /// Declared imports.
    #[serde(default)]
    pub imports: Vec<ImportDecl>,
    /// Declared definitions.
    #[serde(default)]
    pub definitions: Vec<Definition>,
    /// Outgoing symbol references.
    #[serde(default)]
    pub references: Vec<Reference>,
    /// Locally-bound identifiers (parameters, locals, loop variables).
    #[serde(default)]
    pub local_symbols: Vec<String>,
}

impl FileRecord {
    /// An empty record for `path` in `module`, to be filled in by the caller.
    pub fn new(path: &str, language: Language, module: &str) -> Self {
        Self {
            path: path.to_string(),
            language,
            module: module.to_string(),
            package: None,
            imports: Vec::new(),
            definitions: Vec::new(),
            references: Vec::new(),
            local_symbols: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_tag() {
        assert_eq!(Language::from_tag("go"), Some(Language::Go));
        assert_eq!(Language::from_tag("python"), Some(Language::Python));
        assert_eq!(Language::from_tag("cobol"), None);
    }

    #[test]
    fn test_head_and_tail_segments() {
        assert_eq!(head_segment("modA.FuncA"), "modA");
        assert_eq!(head_segment("plain"), "plain");
        assert_eq!(tail_segment("pkg.Type.method"), Some("Type.method"));
        assert_eq!(tail_segment("plain"), None);
    }

    #[test]
    fn test_reference_head() {
        let r = Reference::new("http.Get", SourceLocation::new(3, 1));
        assert_eq!(r.head(), "http");
    }
}
