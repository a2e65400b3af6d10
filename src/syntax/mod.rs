//! Rowan-based syntax layer for Object Pascal
//!
//! This module is the boundary to the external parser. The front end lexes
//! and parses source text elsewhere and hands over a lossless CST built
//! through [`TreeBuilder`] over the closed [`SyntaxKind`] vocabulary; the
//! completion core never parses text itself.
//!
//! ```text
//! Source Text
//!     ↓  (external front end)
//! TreeBuilder → GreenNode tree (immutable, cheap to clone)
//!     ↓
//! SyntaxNode (rowan) → CST with parent pointers
//!     ↓
//! hir → scopes and fields derived per completion request
//! ```
//!
//! ## Speculative trees
//!
//! Before a completion request the host inserts [`DUMMY_IDENT`] at the caret
//! and reparses, so the tree around the cursor is as well-formed as the
//! grammar allows. Both the speculative and the original tree are handed to
//! the classifier; some rules need the pre-placeholder shape.

mod kind;
mod tree;

pub use kind::{
    PascalLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxNodeChildren, SyntaxToken,
};
pub use tree::{
    DUMMY_IDENT, ModuleKind, TreeBuilder, ancestor_matching, child_of_kind, child_token,
    deepest_first, enclosing_expression, find_descendant, first_leaf_non_trivia, is_first_on_line,
    module_kind, module_name, module_of, parent_matching, prev_leaf_non_trivia,
    prev_non_trivia_sibling, skip_to_expression_parent, token_at_offset,
};

/// Re-export rowan types for convenience
pub use rowan::{GreenNode, TextRange, TextSize};
