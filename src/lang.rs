//! Per-language capability tables.
//!
//! Everything language-specific the resolver needs lives here as data: the
//! stdlib namespace set, the builtin identifier set, how a module path
//! derives its bound reference name, and whether import-usage tracking is
//! meaningful for the language. Adding a language means adding a table
//! entry, not new branches in the resolver.

use crate::graph::types::Language;

/// Static capability table entry for one language.
#[derive(Debug)]
pub struct LanguageProfile {
    /// Standard-library namespaces referenced by their bindable name
    /// (e.g. `http` for Go's `net/http`).
    pub stdlib: &'static [&'static str],
    /// Identifiers available without any import.
    pub builtins: &'static [&'static str],
    /// Whether unused-import detection is meaningful for this language.
    pub tracks_import_usage: bool,
    /// Whether a whole-module import with no alias and no item list may be
    /// side-effect-only by convention (and must never be flagged unused).
    pub bare_import_may_be_side_effect: bool,
}

impl LanguageProfile {
    pub fn is_stdlib(&self, name: &str) -> bool {
        self.stdlib.contains(&name)
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtins.contains(&name)
    }
}

/// Derive the name an import binds in the importing file: the trailing path
/// segment for slash-separated module paths, the last dotted segment for
/// dotted paths, the last `::` segment for Rust.
pub fn module_base_name(language: Language, module: &str) -> &str {
    let base = match language {
        Language::Go | Language::JavaScript | Language::TypeScript => {
            module.rsplit('/').next()
        }
        Language::Python => module.rsplit('.').next(),
        Language::Rust => module.rsplit("::").next(),
    };
    base.unwrap_or(module)
}

/// Look up the capability table entry for a language.
pub fn profile(language: Language) -> &'static LanguageProfile {
    match language {
        Language::Go => &GO,
        Language::Python => &PYTHON,
        Language::JavaScript => &JAVASCRIPT,
        Language::TypeScript => &TYPESCRIPT,
        Language::Rust => &RUST,
    }
}

static GO: LanguageProfile = LanguageProfile {
    stdlib: &[
        "bufio", "bytes", "context", "errors", "flag", "fmt", "filepath", "http", "io", "json",
        "log", "math", "os", "path", "rand", "reflect", "regexp", "runtime", "sort", "strconv",
        "strings", "sync", "testing", "time", "url",
    ],
    builtins: &[
        "any", "append", "bool", "byte", "cap", "close", "complex", "copy", "delete", "error",
        "false", "float32", "float64", "imag", "int", "int16", "int32", "int64", "int8", "iota",
        "len", "make", "map", "max", "min", "new", "nil", "panic", "print", "println", "real",
        "recover", "rune", "string", "true", "uint", "uint16", "uint32", "uint64", "uint8",
        "uintptr",
    ],
    tracks_import_usage: true,
    bare_import_may_be_side_effect: false,
};

static PYTHON: LanguageProfile = LanguageProfile {
    stdlib: &[
        "abc", "argparse", "asyncio", "collections", "contextlib", "copy", "dataclasses",
        "datetime", "enum", "functools", "glob", "hashlib", "io", "itertools", "json", "logging",
        "math", "os", "pathlib", "random", "re", "shutil", "subprocess", "sys", "tempfile",
        "threading", "time", "typing", "unittest", "uuid",
    ],
    builtins: &[
        "AttributeError", "Exception", "False", "IndexError", "KeyError", "None",
        "NotImplementedError", "RuntimeError", "StopIteration", "True", "TypeError", "ValueError",
        "abs", "all", "any", "bool", "bytes", "callable", "classmethod", "dict", "dir",
        "enumerate", "filter", "float", "format", "frozenset", "getattr", "hasattr", "hash", "id",
        "int", "isinstance", "issubclass", "iter", "len", "list", "map", "max", "min", "next",
        "object", "open", "print", "property", "range", "repr", "reversed", "round", "set",
        "setattr", "slice", "sorted", "staticmethod", "str", "sum", "super", "tuple", "type",
        "vars", "zip",
    ],
    tracks_import_usage: true,
    bare_import_may_be_side_effect: false,
};

// TypeScript shares the JavaScript host environment.
const JS_STDLIB: &[&str] = &[
    "console", "document", "fetch", "globalThis", "localStorage", "navigator", "process",
    "window",
];
const JS_BUILTINS: &[&str] = &[
    "Array", "BigInt", "Boolean", "Date", "Error", "Infinity", "JSON", "Map", "Math", "NaN",
    "Number", "Object", "Promise", "Proxy", "Reflect", "RegExp", "Set", "String", "Symbol",
    "WeakMap", "WeakSet", "isNaN", "null", "parseFloat", "parseInt", "undefined",
];

static JAVASCRIPT: LanguageProfile = LanguageProfile {
    stdlib: JS_STDLIB,
    builtins: JS_BUILTINS,
    tracks_import_usage: true,
    // `import "./styles.css"` and friends are imported for effect only.
    bare_import_may_be_side_effect: true,
};

static TYPESCRIPT: LanguageProfile = LanguageProfile {
    stdlib: JS_STDLIB,
    builtins: JS_BUILTINS,
    tracks_import_usage: true,
    bare_import_may_be_side_effect: true,
};

static RUST: LanguageProfile = LanguageProfile {
    stdlib: &["alloc", "core", "std"],
    builtins: &[
        "Box", "Clone", "Copy", "Default", "Err", "Iterator", "None", "Ok", "Option", "Result",
        "Self", "Some", "String", "Vec", "bool", "char", "f32", "f64", "i16", "i32", "i64", "i8",
        "isize", "str", "u16", "u32", "u64", "u8", "usize",
    ],
    // rustc already reports unused imports itself.
    tracks_import_usage: false,
    bare_import_may_be_side_effect: false,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_slash_paths() {
        assert_eq!(module_base_name(Language::Go, "net/http"), "http");
        assert_eq!(module_base_name(Language::Go, "fmt"), "fmt");
        assert_eq!(
            module_base_name(Language::JavaScript, "./utils/helpers"),
            "helpers"
        );
    }

    #[test]
    fn test_base_name_dotted_paths() {
        assert_eq!(module_base_name(Language::Python, "myapp.models.user"), "user");
        assert_eq!(module_base_name(Language::Python, "os"), "os");
    }

    #[test]
    fn test_base_name_rust_paths() {
        assert_eq!(module_base_name(Language::Rust, "std::collections"), "collections");
    }

    #[test]
    fn test_stdlib_membership() {
        assert!(profile(Language::Go).is_stdlib("fmt"));
        assert!(profile(Language::Go).is_stdlib("http"));
        assert!(!profile(Language::Go).is_stdlib("gin"));
        assert!(profile(Language::Python).is_stdlib("typing"));
    }

    #[test]
    fn test_builtin_membership() {
        assert!(profile(Language::Go).is_builtin("len"));
        assert!(profile(Language::Python).is_builtin("print"));
        assert!(profile(Language::JavaScript).is_builtin("JSON"));
        assert!(!profile(Language::Go).is_builtin("fprintf"));
    }

    #[test]
    fn test_usage_tracking_flags() {
        assert!(profile(Language::Go).tracks_import_usage);
        assert!(profile(Language::Python).tracks_import_usage);
        assert!(!profile(Language::Rust).tracks_import_usage);
        assert!(profile(Language::TypeScript).bare_import_may_be_side_effect);
    }
}
