//! # delphic-base
//!
//! Core library for Object Pascal code completion: position classification,
//! symbol resolution, and insertion templates.
//!
//! Given a cursor position inside a partially-typed, possibly-malformed
//! source file, the crate produces a ranked, deduplicated set of suggestions:
//! reserved words valid at that exact syntactic position, plus program
//! symbols (variables, types, routines, properties, constants, units) that
//! are visible and accessible from that position under Pascal's scoping and
//! visibility rules.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → completion entry point: classifier, aggregator, templates
//!   ↓
//! index     → external unit-index boundary (uses-clause candidates,
//!             cross-module declarations)
//!   ↓
//! hir       → Field/Visibility model, entity scopes, symbol resolver
//!   ↓
//! syntax    → closed SyntaxKind enum, rowan CST, tree navigation,
//!             speculative-parse conventions
//!   ↓
//! base      → primitives (FileId, case-insensitive name keys)
//! ```
//!
//! The parser itself is out of scope: trees are handed over through the
//! [`syntax::TreeBuilder`] interface by an external front end, and the whole
//! pipeline treats them as immutable snapshots. One completion request is
//! fully classified, resolved, and aggregated before control returns to the
//! caller; the only buffer mutation this crate ever describes is the
//! [`ide::Expansion`] value produced after the caller accepts a suggestion.

/// Foundation types: FileId, case-insensitive name keys
pub mod base;

/// Syntax: Pascal SyntaxKind, rowan CST types, navigation helpers
pub mod syntax;

/// Semantic model: fields, scopes, inheritance, the symbol resolver
pub mod hir;

/// External symbol-index boundary: unit discovery and lookup
pub mod index;

/// IDE features: completion classification, aggregation, insertion templates
pub mod ide;

// Re-export foundation types
pub use base::{FileId, NameKey};
pub use syntax::{PascalLanguage, SyntaxKind, SyntaxNode, SyntaxToken};
