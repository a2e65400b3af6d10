//! Static keyword tables for each completion context.
//!
//! Process-wide immutable configuration: built once, referenced by value,
//! never mutated. The uniqueness map ties a keyword to the node kind its
//! acceptance would produce, so one-shot keywords (`uses`, `interface`,
//! module headers) are withheld once that node already exists under the
//! checked subtree.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::syntax::SyntaxKind;

/// Module header keywords, valid only while the file has no module head.
pub const MODULE_HEADERS: &[&str] = &["unit", "program", "library", "package"];

/// Unit section keywords in their fixed order.
pub const UNIT_SECTIONS: &[&str] = &[
    "interface",
    "implementation",
    "initialization",
    "finalization",
];

/// Declaration keywords at unit/global level.
pub const DECLARATIONS: &[&str] = &[
    "var",
    "const",
    "type",
    "threadvar",
    "resourcestring",
    "procedure",
    "function",
];

/// Declaration keywords inside a routine body.
pub const DECLARATIONS_LOCAL: &[&str] = &["var", "const", "type", "procedure", "function"];

/// Statement-starting keywords.
pub const STATEMENTS: &[&str] = &[
    "if", "case", "for", "while", "repeat", "try", "with", "raise", "inherited", "goto",
];

/// Cycle-control keywords, offered only inside for/while/repeat bodies.
pub const STATEMENTS_IN_CYCLE: &[&str] = &["break", "continue"];

/// Value literals for expression positions.
pub const VALUES: &[&str] = &["nil", "true", "false"];

/// Member visibility keywords.
pub const VISIBILITY: &[&str] = &["private", "protected", "public", "published", "strict"];

/// Member kinds beyond the plain declaration set.
pub const STRUCT_DECLARATIONS: &[&str] = &["constructor", "destructor", "property"];

/// Keywords naming a type in a type position.
pub const TYPE_DECLARATIONS: &[&str] = &[
    "type", "class", "record", "object", "dispinterface", "packed", "set", "file", "array",
    "helper",
];

/// Formal-parameter modifiers for untyped parameter slots.
pub const PARAM_MODIFIERS: &[&str] = &["const", "var", "out"];

/// Directives valid on a method's interface declaration.
pub const DIRECTIVE_METHOD: &[&str] = &[
    "virtual",
    "override",
    "abstract",
    "dynamic",
    "reintroduce",
    "overload",
    "message",
    "final",
];

/// Directives valid on a plain routine declaration.
pub const DIRECTIVE_ROUTINE: &[&str] = &[
    "overload",
    "inline",
    "assembler",
    "cdecl",
    "stdcall",
    "register",
    "safecall",
    "external",
    "forward",
];

/// Package-level clauses.
pub const TOP_LEVEL_DECLARATIONS: &[&str] = &["requires", "contains"];

/// Compiler directive names offered inside `{$...}` pragma comments.
pub const PRAGMAS: &[&str] = &[
    "$DEFINE",
    "$UNDEF",
    "$IFDEF",
    "$IFNDEF",
    "$IFOPT",
    "$ELSE",
    "$ENDIF",
    "$INCLUDE",
    "$I",
    "$RESOURCE",
    "$R",
    "$MODE",
    "$H",
    "$WARNINGS",
    "$HINTS",
    "$NOTES",
    "$RANGECHECKS",
    "$OVERFLOWCHECKS",
];

/// Keyword → node kind its acceptance produces. A keyword with an entry is
/// suppressed when a node of that kind already exists under the subtree the
/// caller checks against.
pub static PRODUCED_NODE: Lazy<FxHashMap<&'static str, SyntaxKind>> = Lazy::new(|| {
    let mut map = FxHashMap::default();
    map.insert("program", SyntaxKind::PROGRAM_HEAD);
    map.insert("unit", SyntaxKind::UNIT_HEAD);
    map.insert("library", SyntaxKind::LIBRARY_HEAD);
    map.insert("package", SyntaxKind::PACKAGE_HEAD);
    map.insert("contains", SyntaxKind::CONTAINS_CLAUSE);
    map.insert("requires", SyntaxKind::REQUIRES_CLAUSE);
    map.insert("interface", SyntaxKind::UNIT_INTERFACE);
    map.insert("implementation", SyntaxKind::UNIT_IMPLEMENTATION);
    map.insert("initialization", SyntaxKind::UNIT_INIT);
    map.insert("finalization", SyntaxKind::UNIT_FINAL);
    map.insert("uses", SyntaxKind::USES_CLAUSE);
    map.insert("begin", SyntaxKind::COMPOUND_STATEMENT);
    map
});
