//! Symbol resolution — collecting candidate fields for a tree position.
//!
//! The resolver walks the enclosing scope chain (block → routine →
//! struct → module), searching declarations owned by each scope and, for
//! structured types, the inheritance-parent chain before the lexical
//! parent — so an override candidate in a subtype is found before members
//! of the enclosing unit. Cross-module declarations come from the unit
//! index; a unit that cannot be loaded contributes nothing.
//!
//! Shadowing is deliberately NOT resolved here: same-name fields from
//! different depths are all returned and the aggregator keeps the
//! first-seen (innermost) one. Visibility filtering also happens in the
//! aggregator, so one code path serves both normal and
//! visibility-disabled (virtual context) queries.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::debug;

use crate::base::{FileId, NameKey};
use crate::index::UnitIndex;
use crate::syntax::{self, DUMMY_IDENT, SyntaxKind, SyntaxToken};

use super::field::{Field, FieldKind};
use super::scope::{MAX_SCOPE_CHAIN, ScopeKind, ScopeNode};

/// Bound on inheritance-chain walks. Cyclic or degenerate heritage
/// declarations (`TFoo = class(TFoo)`) truncate here instead of looping.
const MAX_INHERITANCE_DEPTH: usize = 8;

/// Per-request resolution context: the file being edited plus the external
/// unit index. Holds no mutable state; every query recomputes its view.
pub struct Resolver<'a> {
    file: FileId,
    index: &'a dyn UnitIndex,
}

impl<'a> Resolver<'a> {
    pub fn new(file: FileId, index: &'a dyn UnitIndex) -> Self {
        Self { file, index }
    }

    /// Resolve candidates for the position of `anchor` (a token in the
    /// speculative tree). A bare identifier searches the whole scope
    /// chain; a dotted path walks its fixed qualifier segments first.
    pub fn resolve_at(&self, anchor: &SyntaxToken, allowed: &[FieldKind]) -> Vec<Field> {
        let Some(start) = anchor
            .parent()
            .and_then(|p| ScopeNode::nearest(&p, self.file))
        else {
            return Vec::new();
        };
        let prefix = qualifier_prefix(anchor);
        if prefix.is_empty() {
            self.scope_chain_fields(&start, allowed)
        } else {
            let segments: Vec<&str> = prefix.iter().map(|s| s.as_str()).collect();
            self.resolve_path(&start, &segments, allowed)
        }
    }

    /// Resolve a fully-qualified path against an arbitrary anchor scope.
    /// Used for cross-anchor queries where the path text is already known.
    pub fn resolve_path(
        &self,
        start: &ScopeNode,
        qualifiers: &[&str],
        allowed: &[FieldKind],
    ) -> Vec<Field> {
        let mut scope = start.clone();
        let mut qualified = false;
        for segment in qualifiers {
            let segment = segment.trim();
            if segment.is_empty() || segment == DUMMY_IDENT {
                continue;
            }
            match self.member_scope(&scope, segment) {
                Some(next) => {
                    scope = next;
                    qualified = true;
                }
                None => {
                    debug!(segment, "qualifier segment did not resolve to a scope");
                    return Vec::new();
                }
            }
        }
        if !qualified {
            self.scope_chain_fields(&scope, allowed)
        } else {
            // After a qualifier the search is member lookup, not a lexical
            // chain walk: the named scope plus its inheritance parents.
            let mut out = Vec::new();
            self.collect_owned(&scope, allowed, &mut out);
            for parent in self.parent_structs(&scope) {
                self.collect_owned(&parent, allowed, &mut out);
            }
            out
        }
    }

    /// Routines reachable through the ancestor chain of the method
    /// enclosing `anchor`. Empty when the anchor is not inside a method.
    pub fn inherited_routines(&self, anchor: &SyntaxToken) -> Vec<Field> {
        let Some(routine) = anchor.parent().and_then(|p| {
            syntax::ancestor_matching(&p, |k| {
                matches!(k, SyntaxKind::ROUTINE_IMPL | SyntaxKind::ROUTINE_DECL)
            })
        }) else {
            return Vec::new();
        };
        let Some(routine) = ScopeNode::new(routine, self.file) else {
            return Vec::new();
        };
        let Some(owner) = routine.containing_scope().filter(|s| s.kind() == ScopeKind::Struct)
        else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for parent in self.parent_structs(&owner) {
            self.collect_owned(&parent, FieldKind::TYPES_ROUTINE, &mut out);
        }
        out
    }

    /// Inheritance chain of a struct scope, direct parents first, then
    /// ancestors in breadth-first order. Bounded and cycle-safe.
    pub fn parent_structs(&self, scope: &ScopeNode) -> Vec<ScopeNode> {
        let mut chain = Vec::new();
        let mut seen: FxHashSet<NameKey> = FxHashSet::default();
        seen.insert(scope.unique_name());
        let mut frontier = vec![scope.clone()];
        for _ in 0..MAX_INHERITANCE_DEPTH {
            let mut next = Vec::new();
            for current in &frontier {
                for name in current.parent_names() {
                    if let Some(parent) = self.find_type(current, name.as_str()) {
                        if seen.insert(parent.unique_name()) {
                            chain.push(parent.clone());
                            next.push(parent);
                        }
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        chain
    }

    /// Walk the lexical chain outward from `start`, collecting matches.
    /// Struct scopes search their inheritance parents before yielding to
    /// the lexical parent; the module scope finally pulls in the interface
    /// declarations of every used unit.
    fn scope_chain_fields(&self, start: &ScopeNode, allowed: &[FieldKind]) -> Vec<Field> {
        let mut out = Vec::new();
        let mut current = Some(start.clone());
        let mut depth = 0;
        while let Some(scope) = current {
            if depth >= MAX_SCOPE_CHAIN {
                debug!("scope chain bound hit, truncating");
                break;
            }
            self.collect_owned(&scope, allowed, &mut out);
            if scope.kind() == ScopeKind::Struct {
                for parent in self.parent_structs(&scope) {
                    self.collect_owned(&parent, allowed, &mut out);
                }
            }
            if scope.kind() == ScopeKind::Module {
                self.collect_used_units(&scope, allowed, &mut out);
            }
            current = scope.containing_scope();
            depth += 1;
        }
        out
    }

    fn collect_owned(&self, scope: &ScopeNode, allowed: &[FieldKind], out: &mut Vec<Field>) {
        for field in scope.declared_fields() {
            if allowed.contains(&field.kind) && !field.is_synthetic_marker() {
                out.push(field);
            }
        }
    }

    fn collect_used_units(&self, module: &ScopeNode, allowed: &[FieldKind], out: &mut Vec<Field>) {
        for unit_field in module.declared_fields() {
            if unit_field.kind != FieldKind::Unit {
                continue;
            }
            match self.index.unit_source(&unit_field.name) {
                Ok(Some(source)) => {
                    if let Some(unit_scope) = ScopeNode::new(source.root.clone(), source.file) {
                        self.collect_owned(&unit_scope, allowed, out);
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    debug!(unit = %unit_field.name, %err, "used unit unavailable, skipping");
                }
            }
        }
    }

    /// Resolve a qualifier segment inside `scope` to the scope of its
    /// members: a unit name to that unit's module, a type name to its
    /// struct body, a typed variable/property to the struct of its type.
    fn member_scope(&self, scope: &ScopeNode, segment: &str) -> Option<ScopeNode> {
        // A unit name visible from here?
        if let Ok(Some(source)) = self.index.unit_source(segment) {
            let is_used = self
                .scope_chain_fields(scope, &[FieldKind::Unit])
                .iter()
                .any(|f| f.name.eq_ignore_ascii_case(segment));
            if is_used {
                return ScopeNode::new(source.root.clone(), source.file);
            }
        }
        // A type name?
        if let Some(found) = self.find_type(scope, segment) {
            return Some(found);
        }
        // A typed variable/property: hop to its declared type.
        let candidates = self.scope_chain_fields(
            scope,
            &[
                FieldKind::Variable,
                FieldKind::Property,
                FieldKind::PseudoVariable,
            ],
        );
        let field = candidates
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(segment))?;
        let type_name = field.type_text.clone()?;
        self.find_type(scope, &type_name)
    }

    /// Locate a struct type by simple name: the enclosing module first,
    /// then each used unit, in uses order.
    fn find_type(&self, near: &ScopeNode, name: &str) -> Option<ScopeNode> {
        let module = near.module_scope()?;
        if let Some(found) = module.find_struct_type(name) {
            return Some(found);
        }
        for unit_field in module.declared_fields() {
            if unit_field.kind != FieldKind::Unit {
                continue;
            }
            match self.index.unit_source(&unit_field.name) {
                Ok(Some(source)) => {
                    if let Some(unit_scope) = ScopeNode::new(source.root.clone(), source.file) {
                        if let Some(found) = unit_scope.find_struct_type(name) {
                            return Some(found);
                        }
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    debug!(unit = %unit_field.name, %err, "used unit unavailable, skipping");
                }
            }
        }
        None
    }
}

/// Qualifier segments preceding `anchor` inside its dotted path, with the
/// dummy identifier stripped. Empty for bare identifiers.
fn qualifier_prefix(anchor: &SyntaxToken) -> Vec<SmolStr> {
    let Some(fqi) = anchor.parent().and_then(|p| {
        syntax::ancestor_matching(&p, |k| k == SyntaxKind::FULLY_QUALIFIED_IDENT)
    }) else {
        return Vec::new();
    };
    let mut prefix = Vec::new();
    for sub in fqi.children().filter(|c| c.kind() == SyntaxKind::SUB_IDENT) {
        if sub.text_range().contains_range(anchor.text_range()) {
            break;
        }
        let text: String = sub
            .descendants_with_tokens()
            .filter_map(|el| el.into_token())
            .filter(|t| t.kind() == SyntaxKind::IDENT)
            .map(|t| t.text().replace(DUMMY_IDENT, ""))
            .collect();
        if !text.is_empty() {
            prefix.push(SmolStr::from(text));
        }
    }
    prefix
}

/// Split a dotted path string into segments, dropping the dummy marker.
/// Used by the cross-anchor virtual-context query, where the path arrives
/// as text rather than as a tree.
pub fn split_path(text: &str) -> Vec<SmolStr> {
    text.replace(DUMMY_IDENT, "")
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(SmolStr::from)
        .collect()
}
