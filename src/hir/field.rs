//! The `Field` descriptor — a resolved symbol candidate.
//!
//! Fields are derived views over the syntax tree, recomputed per completion
//! request. A field carries everything the aggregator needs to filter and
//! rank it: case-insensitive name, closed kind, declared visibility, owning
//! scope, and a weak reference to the declaring node.

use smol_str::SmolStr;
use text_size::TextRange;

use crate::base::{FileId, NameKey};
use crate::syntax::SyntaxKind;

/// Marker suffix tagging synthetic structural helper symbols produced
/// during scope extraction. Fields whose name contains it never surface
/// in completion results.
pub const STRUCT_SUFFIX: &str = "$struct";

/// Display text for identifiers declared without a type.
pub const TYPE_UNTYPED: &str = "<untyped>";

/// Closed enumeration of symbol kinds; drives the filter sets below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Variable,
    Constant,
    Type,
    Routine,
    Unit,
    Property,
    PseudoVariable,
}

impl FieldKind {
    /// Every kind; value positions accept anything nameable.
    pub const TYPES_ALL: &'static [FieldKind] = &[
        FieldKind::Variable,
        FieldKind::Constant,
        FieldKind::Type,
        FieldKind::Routine,
        FieldKind::Unit,
        FieldKind::Property,
        FieldKind::PseudoVariable,
    ];

    /// Kinds that may stand on the left of an assignment.
    pub const TYPES_LEFT_SIDE: &'static [FieldKind] = &[
        FieldKind::Variable,
        FieldKind::Property,
        FieldKind::PseudoVariable,
        FieldKind::Routine,
        FieldKind::Unit,
    ];

    /// Kinds valid in a type position.
    pub const TYPES_TYPE_UNIT: &'static [FieldKind] = &[FieldKind::Type, FieldKind::Unit];

    /// Kinds valid in a constant expression.
    pub const TYPES_STATIC: &'static [FieldKind] = &[
        FieldKind::Constant,
        FieldKind::Type,
        FieldKind::Unit,
        FieldKind::Routine,
    ];

    /// Kinds valid after `read`/`write` in a property specifier.
    pub const TYPES_PROPERTY_SPECIFIER: &'static [FieldKind] =
        &[FieldKind::Variable, FieldKind::Routine];

    /// Routines only; the inherited-call filter.
    pub const TYPES_ROUTINE: &'static [FieldKind] = &[FieldKind::Routine];

    /// Lowercase annotation shown after the suggestion label.
    pub fn display(self) -> &'static str {
        match self {
            FieldKind::Variable => "variable",
            FieldKind::Constant => "constant",
            FieldKind::Type => "type",
            FieldKind::Routine => "routine",
            FieldKind::Unit => "unit",
            FieldKind::Property => "property",
            FieldKind::PseudoVariable => "variable",
        }
    }
}

/// Member visibility, ordered by accessibility (least to most accessible).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    StrictPrivate,
    Private,
    StrictProtected,
    Protected,
    Public,
    Published,
}

impl Visibility {
    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public | Visibility::Published)
    }

    pub fn is_strict(self) -> bool {
        matches!(self, Visibility::StrictPrivate | Visibility::StrictProtected)
    }
}

/// Weak reference to the node that declares a symbol. Absent for
/// synthetic/pseudo entries such as `Self` and `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclRef {
    pub file: FileId,
    pub range: TextRange,
    pub node_kind: SyntaxKind,
}

/// Identifier of the entity scope that declared a field, usable for
/// self/cross-module equality. Holds the scope's qualified unique name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeRef {
    pub unique_name: NameKey,
    /// Simple name shown as the owner label in suggestions.
    pub display_name: SmolStr,
    /// Module the scope lives in, for the cross-module rules.
    pub module: Option<NameKey>,
}

/// A resolved symbol candidate.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: SmolStr,
    pub kind: FieldKind,
    pub visibility: Visibility,
    /// Declaring entity scope; None for free-standing symbols.
    pub owner: Option<ScopeRef>,
    pub decl: Option<DeclRef>,
    /// Declared type text, used for `name: Type` display.
    pub type_text: Option<SmolStr>,
    /// For routines: whether the declaration lists formal parameters.
    /// Drives caret placement when the accepted routine expands to a call.
    pub routine_has_params: Option<bool>,
}

impl Field {
    pub fn new(name: impl Into<SmolStr>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            visibility: Visibility::Public,
            owner: None,
            decl: None,
            type_text: None,
            routine_has_params: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_owner(mut self, owner: ScopeRef) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_decl(mut self, decl: DeclRef) -> Self {
        self.decl = Some(decl);
        self
    }

    pub fn with_type_text(mut self, type_text: impl Into<SmolStr>) -> Self {
        self.type_text = Some(type_text.into());
        self
    }

    pub fn with_routine_params(mut self, has_params: bool) -> Self {
        self.routine_has_params = Some(has_params);
        self
    }

    /// Case-folded key for deduplication and shadow checks.
    pub fn name_key(&self) -> NameKey {
        NameKey::new(&self.name)
    }

    /// Synthetic helper symbols never surface in results.
    pub fn is_synthetic_marker(&self) -> bool {
        self.name.contains(STRUCT_SUFFIX)
    }

    /// Display text: `name` or `name: Type` for typed identifiers.
    pub fn display_text(&self) -> String {
        match self.kind {
            FieldKind::Variable | FieldKind::Constant | FieldKind::Property => {
                let ty = self.type_text.as_deref().unwrap_or(TYPE_UNTYPED);
                format!("{}: {}", self.name, ty)
            }
            _ => self.name.to_string(),
        }
    }
}
