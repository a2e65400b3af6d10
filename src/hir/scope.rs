//! Entity scopes — named regions of the tree that own declarations.
//!
//! A [`ScopeNode`] is a lightweight view over a CST node of a scope-opening
//! kind: module, routine, or structured type. Scopes and their fields are
//! recomputed per completion request; nothing here caches across requests.

use smol_str::SmolStr;

use crate::base::{FileId, NameKey};
use crate::syntax::{
    self, SyntaxKind, SyntaxNode, SyntaxToken, child_of_kind, child_token,
};

use super::field::{DeclRef, Field, FieldKind, ScopeRef, Visibility};

/// Scope flavor; drives which extraction rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Routine,
    Struct,
}

/// A named region that owns declarations, viewed over the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeNode {
    node: SyntaxNode,
    file: FileId,
}

impl ScopeNode {
    pub fn new(node: SyntaxNode, file: FileId) -> Option<Self> {
        node.kind().is_scope().then_some(Self { node, file })
    }

    /// Nearest enclosing scope of `node` (or `node` itself if it is one).
    pub fn nearest(node: &SyntaxNode, file: FileId) -> Option<Self> {
        syntax::ancestor_matching(node, SyntaxKind::is_scope)
            .map(|n| Self { node: n, file })
    }

    pub fn node(&self) -> &SyntaxNode {
        &self.node
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn kind(&self) -> ScopeKind {
        match self.node.kind() {
            SyntaxKind::MODULE => ScopeKind::Module,
            k if k.is_struct_type() => ScopeKind::Struct,
            _ => ScopeKind::Routine,
        }
    }

    /// Simple name of this scope. For structured types the name lives on
    /// the enclosing TYPE_DECL; for dotted routine implementations it is
    /// the last segment.
    pub fn name(&self) -> Option<SmolStr> {
        match self.kind() {
            ScopeKind::Module => syntax::module_name(&self.node).map(SmolStr::from),
            ScopeKind::Struct => {
                let decl = syntax::parent_matching(&self.node, |k| k == SyntaxKind::TYPE_DECL)?;
                named_ident_text(&decl)
            }
            ScopeKind::Routine => self.routine_name_parts().last().cloned(),
        }
    }

    /// Name segments of a routine header (`TFoo.Bar` yields two).
    pub fn routine_name_parts(&self) -> Vec<SmolStr> {
        let Some(name_node) = self
            .node
            .children()
            .find(|c| matches!(c.kind(), SyntaxKind::NAMED_IDENT | SyntaxKind::FULLY_QUALIFIED_IDENT))
        else {
            return Vec::new();
        };
        name_node
            .descendants_with_tokens()
            .filter_map(|el| el.into_token())
            .filter(|t| t.kind() == SyntaxKind::IDENT)
            .map(|t| SmolStr::from(t.text()))
            .collect()
    }

    /// Lexical parent scope. For a routine implementation whose header is
    /// qualified (`procedure TFoo.Bar;`) the containing scope is the struct
    /// named by the qualifier, not the module the body sits in.
    pub fn containing_scope(&self) -> Option<ScopeNode> {
        if self.node.kind() == SyntaxKind::ROUTINE_IMPL {
            let parts = self.routine_name_parts();
            if parts.len() > 1 {
                if let Some(module) = self.module_scope() {
                    if let Some(owner) = module.find_struct_type(&parts[0]) {
                        return Some(owner);
                    }
                }
            }
        }
        syntax::parent_matching(&self.node, SyntaxKind::is_scope)
            .map(|n| Self { node: n, file: self.file })
    }

    /// Enclosing module scope (or self).
    pub fn module_scope(&self) -> Option<ScopeNode> {
        syntax::module_of(&self.node).map(|n| Self { node: n, file: self.file })
    }

    /// Name of the enclosing module, as a case-folded key.
    pub fn module_name_key(&self) -> Option<NameKey> {
        let module = self.module_scope()?;
        module.name().map(|n| NameKey::new(&n))
    }

    /// Qualified name used for self/cross-module scope equality.
    pub fn unique_name(&self) -> NameKey {
        let mut parts: Vec<SmolStr> = Vec::new();
        let mut current = Some(self.clone());
        // The chain is short (block → routine → struct → module); the bound
        // only guards against malformed trees.
        let mut depth = 0;
        while let Some(scope) = current {
            if depth >= MAX_SCOPE_CHAIN {
                break;
            }
            if let Some(name) = scope.name() {
                parts.push(name);
            }
            current = scope.containing_scope();
            depth += 1;
        }
        parts.reverse();
        NameKey::new(&parts.join("."))
    }

    /// Handle used to stamp fields with their owner.
    pub fn scope_ref(&self) -> ScopeRef {
        ScopeRef {
            unique_name: self.unique_name(),
            display_name: self.name().unwrap_or_else(|| SmolStr::from("-")),
            module: self.module_name_key(),
        }
    }

    /// Names listed in a struct's heritage clause (`class(TBase, IThing)`).
    pub fn parent_names(&self) -> Vec<SmolStr> {
        let Some(parent) = child_of_kind(&self.node, SyntaxKind::CLASS_PARENT) else {
            return Vec::new();
        };
        parent
            .descendants_with_tokens()
            .filter_map(|el| el.into_token())
            .filter(|t| t.kind() == SyntaxKind::IDENT)
            .map(|t| SmolStr::from(t.text()))
            .collect()
    }

    /// Locate a struct type declared in this module by simple name
    /// (searching both unit sections and top-level type sections).
    pub fn find_struct_type(&self, name: &str) -> Option<ScopeNode> {
        self.node
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::TYPE_DECL)
            .find(|decl| {
                named_ident_text(decl)
                    .is_some_and(|n| n.eq_ignore_ascii_case(name))
            })
            .and_then(|decl| {
                decl.children()
                    .find(|c| c.kind().is_struct_type())
                    .map(|n| ScopeNode { node: n, file: self.file })
            })
    }

    /// True for routines declared inside a structured type.
    pub fn is_method(&self) -> bool {
        self.kind() == ScopeKind::Routine
            && self
                .containing_scope()
                .is_some_and(|s| s.kind() == ScopeKind::Struct)
    }

    /// Fields declared directly by this scope, in declaration order.
    pub fn declared_fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        match self.kind() {
            ScopeKind::Module => self.collect_module_fields(&mut fields),
            ScopeKind::Struct => self.collect_struct_fields(&mut fields),
            ScopeKind::Routine => self.collect_routine_fields(&mut fields),
        }
        fields
    }

    fn owner_ref(&self) -> ScopeRef {
        self.scope_ref()
    }

    fn decl_ref(&self, node: &SyntaxNode) -> DeclRef {
        DeclRef {
            file: self.file,
            range: node.text_range(),
            node_kind: node.kind(),
        }
    }

    fn collect_module_fields(&self, out: &mut Vec<Field>) {
        let owner = self.owner_ref();
        for child in self.node.children() {
            match child.kind() {
                SyntaxKind::USES_CLAUSE => self.collect_uses(&child, &owner, out),
                SyntaxKind::UNIT_INTERFACE => {
                    self.collect_decl_sections(&child, &owner, Visibility::Public, out);
                    if let Some(uses) = child_of_kind(&child, SyntaxKind::USES_CLAUSE) {
                        self.collect_uses(&uses, &owner, out);
                    }
                }
                SyntaxKind::UNIT_IMPLEMENTATION | SyntaxKind::BLOCK_GLOBAL => {
                    self.collect_decl_sections(&child, &owner, Visibility::Private, out);
                    if let Some(uses) = child_of_kind(&child, SyntaxKind::USES_CLAUSE) {
                        self.collect_uses(&uses, &owner, out);
                    }
                }
                _ => {}
            }
        }
        // Program/library declarations sit directly under the module node
        self.collect_decl_sections(&self.node, &owner, Visibility::Private, out);
    }

    fn collect_uses(&self, uses: &SyntaxNode, owner: &ScopeRef, out: &mut Vec<Field>) {
        for token in uses
            .descendants_with_tokens()
            .filter_map(|el| el.into_token())
            .filter(|t| t.kind() == SyntaxKind::IDENT)
        {
            // Unit names carry Private visibility but the aggregator always
            // lets Unit-kind fields through; units are referenced by name.
            out.push(
                Field::new(token.text(), FieldKind::Unit)
                    .with_visibility(Visibility::Private)
                    .with_owner(owner.clone())
                    .with_decl(self.decl_ref(uses)),
            );
        }
    }

    fn collect_decl_sections(
        &self,
        parent: &SyntaxNode,
        owner: &ScopeRef,
        visibility: Visibility,
        out: &mut Vec<Field>,
    ) {
        for section in parent.children() {
            match section.kind() {
                SyntaxKind::VAR_SECTION => {
                    self.collect_typed_decls(&section, SyntaxKind::VAR_DECL, FieldKind::Variable, owner, visibility, out)
                }
                SyntaxKind::CONST_SECTION => {
                    self.collect_typed_decls(&section, SyntaxKind::CONST_DECL, FieldKind::Constant, owner, visibility, out)
                }
                SyntaxKind::TYPE_SECTION => {
                    for decl in section.children().filter(|c| c.kind() == SyntaxKind::TYPE_DECL) {
                        if let Some(name) = named_ident_text(&decl) {
                            out.push(
                                Field::new(name, FieldKind::Type)
                                    .with_visibility(visibility)
                                    .with_owner(owner.clone())
                                    .with_decl(self.decl_ref(&decl)),
                            );
                        }
                    }
                }
                SyntaxKind::ROUTINE_DECL | SyntaxKind::ROUTINE_IMPL => {
                    let routine = ScopeNode { node: section.clone(), file: self.file };
                    let parts = routine.routine_name_parts();
                    // Qualified implementations (`TFoo.Bar`) belong to their
                    // struct, not to the module section they sit in.
                    if parts.len() == 1 {
                        out.push(
                            Field::new(parts[0].clone(), FieldKind::Routine)
                                .with_visibility(visibility)
                                .with_owner(owner.clone())
                                .with_decl(self.decl_ref(&section))
                                .with_routine_params(routine.has_parameters()),
                        );
                    }
                }
                _ => {}
            }
        }
    }

    fn collect_typed_decls(
        &self,
        section: &SyntaxNode,
        decl_kind: SyntaxKind,
        field_kind: FieldKind,
        owner: &ScopeRef,
        visibility: Visibility,
        out: &mut Vec<Field>,
    ) {
        for decl in section.children().filter(|c| c.kind() == decl_kind) {
            let type_text = type_id_text(&decl);
            for name in named_idents(&decl) {
                let mut field = Field::new(name, field_kind)
                    .with_visibility(visibility)
                    .with_owner(owner.clone())
                    .with_decl(self.decl_ref(&decl));
                if let Some(ty) = &type_text {
                    field = field.with_type_text(ty.clone());
                }
                out.push(field);
            }
        }
    }

    fn collect_struct_fields(&self, out: &mut Vec<Field>) {
        let owner = self.owner_ref();
        // Members before any visibility section get the default: published
        // for classes, public for the other struct flavors.
        let default_vis = if self.node.kind() == SyntaxKind::CLASS_TYPE {
            Visibility::Published
        } else {
            Visibility::Public
        };
        self.collect_members(&self.node, &owner, default_vis, out);
        for section in self
            .node
            .children()
            .filter(|c| c.kind() == SyntaxKind::VISIBILITY_SECTION)
        {
            let vis = section_visibility(&section).unwrap_or(default_vis);
            self.collect_members(&section, &owner, vis, out);
        }
    }

    fn collect_members(
        &self,
        parent: &SyntaxNode,
        owner: &ScopeRef,
        visibility: Visibility,
        out: &mut Vec<Field>,
    ) {
        for member in parent.children() {
            match member.kind() {
                SyntaxKind::CLASS_FIELD => {
                    let type_text = type_id_text(&member);
                    for name in named_idents(&member) {
                        let mut field = Field::new(name, FieldKind::Variable)
                            .with_visibility(visibility)
                            .with_owner(owner.clone())
                            .with_decl(self.decl_ref(&member));
                        if let Some(ty) = &type_text {
                            field = field.with_type_text(ty.clone());
                        }
                        out.push(field);
                    }
                }
                SyntaxKind::CLASS_PROPERTY => {
                    if let Some(name) = named_ident_text(&member) {
                        let mut field = Field::new(name, FieldKind::Property)
                            .with_visibility(visibility)
                            .with_owner(owner.clone())
                            .with_decl(self.decl_ref(&member));
                        if let Some(ty) = type_id_text(&member) {
                            field = field.with_type_text(ty);
                        }
                        out.push(field);
                    }
                }
                SyntaxKind::ROUTINE_DECL => {
                    let routine = ScopeNode { node: member.clone(), file: self.file };
                    if let Some(name) = routine.routine_name_parts().first() {
                        out.push(
                            Field::new(name.clone(), FieldKind::Routine)
                                .with_visibility(visibility)
                                .with_owner(owner.clone())
                                .with_decl(self.decl_ref(&member))
                                .with_routine_params(routine.has_parameters()),
                        );
                    }
                }
                _ => {}
            }
        }
    }

    fn collect_routine_fields(&self, out: &mut Vec<Field>) {
        let owner = self.owner_ref();
        if let Some(params) = child_of_kind(&self.node, SyntaxKind::FORMAL_PARAM_LIST) {
            for param in params.children().filter(|c| c.kind() == SyntaxKind::FORMAL_PARAM) {
                let type_text = type_id_text(&param);
                for name in named_idents(&param) {
                    let mut field = Field::new(name, FieldKind::Variable)
                        .with_visibility(Visibility::Private)
                        .with_owner(owner.clone())
                        .with_decl(self.decl_ref(&param));
                    if let Some(ty) = &type_text {
                        field = field.with_type_text(ty.clone());
                    }
                    out.push(field);
                }
            }
        }
        if let Some(locals) = child_of_kind(&self.node, SyntaxKind::BLOCK_LOCAL) {
            self.collect_decl_sections(&locals, &owner, Visibility::Private, out);
        }
        // `Self` inside methods, `Result` inside functions
        if self.is_method() {
            let mut field = Field::new("Self", FieldKind::PseudoVariable)
                .with_visibility(Visibility::Private)
                .with_owner(owner.clone());
            if let Some(struct_name) = self.containing_scope().and_then(|s| s.name()) {
                field = field.with_type_text(struct_name);
            }
            out.push(field);
        }
        if self.is_function() {
            let mut field = Field::new("Result", FieldKind::PseudoVariable)
                .with_visibility(Visibility::Private)
                .with_owner(owner.clone());
            if let Some(ty) = self.result_type_text() {
                field = field.with_type_text(ty);
            }
            out.push(field);
        }
    }

    /// True when the routine header declares a result type.
    pub fn is_function(&self) -> bool {
        if self.kind() != ScopeKind::Routine {
            return false;
        }
        child_token(&self.node, SyntaxKind::FUNCTION_KW).is_some()
    }

    fn result_type_text(&self) -> Option<SmolStr> {
        child_of_kind(&self.node, SyntaxKind::TYPE_ID).map(|ty| text_of(&ty))
    }

    /// True when the routine declares at least one formal parameter.
    pub fn has_parameters(&self) -> bool {
        child_of_kind(&self.node, SyntaxKind::FORMAL_PARAM_LIST)
            .is_some_and(|list| list.children().any(|c| c.kind() == SyntaxKind::FORMAL_PARAM))
    }
}

/// Bound on scope-chain walks; malformed trees never loop.
pub(crate) const MAX_SCOPE_CHAIN: usize = 16;

fn named_idents(node: &SyntaxNode) -> Vec<SmolStr> {
    node.children()
        .filter(|c| c.kind() == SyntaxKind::NAMED_IDENT)
        .filter_map(|n| named_token(&n))
        .map(|t| SmolStr::from(t.text()))
        .collect()
}

fn named_ident_text(node: &SyntaxNode) -> Option<SmolStr> {
    let named = child_of_kind(node, SyntaxKind::NAMED_IDENT)?;
    named_token(&named).map(|t| SmolStr::from(t.text()))
}

fn named_token(named: &SyntaxNode) -> Option<SyntaxToken> {
    named
        .children_with_tokens()
        .filter_map(|el| el.into_token())
        .find(|t| t.kind() == SyntaxKind::IDENT)
}

fn type_id_text(node: &SyntaxNode) -> Option<SmolStr> {
    child_of_kind(node, SyntaxKind::TYPE_ID).map(|ty| text_of(&ty))
}

fn text_of(node: &SyntaxNode) -> SmolStr {
    let mut text = String::new();
    for token in node
        .descendants_with_tokens()
        .filter_map(|el| el.into_token())
        .filter(|t| !t.kind().is_trivia())
    {
        text.push_str(token.text());
    }
    SmolStr::from(text)
}

fn section_visibility(section: &SyntaxNode) -> Option<Visibility> {
    let strict = child_token(section, SyntaxKind::STRICT_KW).is_some();
    let vis = section
        .children_with_tokens()
        .filter_map(|el| el.into_token())
        .find_map(|t| match t.kind() {
            SyntaxKind::PRIVATE_KW => Some(if strict {
                Visibility::StrictPrivate
            } else {
                Visibility::Private
            }),
            SyntaxKind::PROTECTED_KW => Some(if strict {
                Visibility::StrictProtected
            } else {
                Visibility::Protected
            }),
            SyntaxKind::PUBLIC_KW => Some(Visibility::Public),
            SyntaxKind::PUBLISHED_KW => Some(Visibility::Published),
            _ => None,
        });
    vis
}
