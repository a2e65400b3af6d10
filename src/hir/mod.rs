//! Semantic model over the Pascal CST.
//!
//! Everything here is a derived view, recomputed per completion request:
//! [`Field`] candidates, [`ScopeNode`] regions, and the [`Resolver`] that
//! walks lexical and inheritance chains. No long-lived caches; the external
//! index owns persistence.

mod field;
mod resolve;
mod scope;

pub use field::{DeclRef, Field, FieldKind, STRUCT_SUFFIX, ScopeRef, TYPE_UNTYPED, Visibility};
pub use resolve::{Resolver, split_path};
pub use scope::{ScopeKind, ScopeNode};
