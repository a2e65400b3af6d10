//! Suggestion aggregation — visibility filtering, dedup, ranking.
//!
//! Raw fields arrive from the resolver unfiltered; this is where the
//! cross-module and same-module accessibility rules apply. Keyword and
//! symbol candidates then merge into one case-insensitively deduplicated
//! list, first-seen wins, ranked into three fixed tiers. The tiers clamp:
//! underscore-prefixed names always rank below cross-file declarations,
//! which rank below everything declared in the edited file.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::trace;

use crate::base::{FileId, NameKey};
use crate::hir::{Field, FieldKind, ScopeRef, Visibility};

use super::super::templates::TemplateKey;

/// Fixed ranking tiers, lowest first so `Normal` sorts on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PriorityTier {
    Lowest,
    Lower,
    Normal,
}

/// What produced a suggestion; carries acceptance behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionSource {
    /// A reserved word, optionally expandable through a template.
    Keyword { template: Option<TemplateKey> },
    /// A resolved program symbol.
    Symbol {
        kind: FieldKind,
        routine_has_params: Option<bool>,
    },
    /// A discoverable unit file offered inside a uses clause.
    UnitFile,
}

/// One ranked completion candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Text inserted on acceptance (and the dedup key, case-folded).
    pub label: SmolStr,
    /// Presentable text, e.g. `Count: Integer`.
    pub display: SmolStr,
    /// Trailing kind annotation (`routine`, `variable`, a file extension).
    pub kind_text: Option<SmolStr>,
    /// Owning-scope label, where one exists.
    pub owner: Option<SmolStr>,
    pub tier: PriorityTier,
    pub deprecated: bool,
    pub source: SuggestionSource,
}

impl Suggestion {
    pub fn keyword(label: &'static str, template: Option<TemplateKey>) -> Self {
        Self {
            label: SmolStr::from(label),
            display: SmolStr::from(label),
            kind_text: None,
            owner: None,
            tier: PriorityTier::Normal,
            // The one struck-through legacy statement keyword.
            deprecated: label == "goto",
            source: SuggestionSource::Keyword { template },
        }
    }

    pub fn unit_file(name: &str, extension: &str) -> Self {
        Self {
            label: SmolStr::from(name),
            display: SmolStr::from(name),
            kind_text: Some(SmolStr::from(extension)),
            owner: None,
            tier: PriorityTier::Normal,
            deprecated: false,
            source: SuggestionSource::UnitFile,
        }
    }

    fn from_field(field: &Field, anchor: &AnchorInfo) -> Self {
        Self {
            label: field.name.clone(),
            display: SmolStr::from(field.display_text()),
            kind_text: Some(SmolStr::from(field.kind.display())),
            owner: field.owner.as_ref().map(|o| o.display_name.clone()),
            tier: tier_for(field, anchor),
            deprecated: false,
            source: SuggestionSource::Symbol {
                kind: field.kind,
                routine_has_params: field.routine_has_params,
            },
        }
    }
}

/// The position the request was made from, as the visibility rules see it.
#[derive(Debug, Clone)]
pub struct AnchorInfo {
    /// Module containing the cursor, by name.
    pub module: Option<NameKey>,
    /// File being edited; same-file declarations rank above cross-file ones.
    pub file: FileId,
    /// The scope containing the nearest enclosing scope of the cursor.
    pub containing: Option<ScopeRef>,
    /// Unique names of the containing scope's inheritance ancestors.
    pub ancestors: Vec<NameKey>,
}

/// Aggregation switches for the two special resolution modes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateOptions {
    /// Inherited-call resolution: only ancestor-reachable symbols survive.
    pub inherited_call: bool,
    /// Cross-anchor virtual-context query: visibility checks disabled.
    pub ignore_visibility: bool,
}

/// Merge keyword and field candidates into the final ranked list.
pub fn aggregate(
    keywords: Vec<Suggestion>,
    fields: Vec<Field>,
    anchor: &AnchorInfo,
    opts: AggregateOptions,
) -> Vec<Suggestion> {
    let mut seen: FxHashSet<NameKey> = FxHashSet::default();
    let mut out: Vec<Suggestion> = Vec::new();

    for suggestion in keywords {
        if suggestion.label.is_empty() {
            continue;
        }
        if seen.insert(NameKey::new(&suggestion.label)) {
            out.push(suggestion);
        }
    }

    for field in &fields {
        if field.name.is_empty() || field.is_synthetic_marker() {
            continue;
        }
        if !opts.ignore_visibility && !field_passes(field, anchor, opts.inherited_call) {
            trace!(name = %field.name, visibility = ?field.visibility, "field filtered");
            continue;
        }
        if seen.insert(field.name_key()) {
            out.push(Suggestion::from_field(field, anchor));
        }
    }

    // Stable by tier: equal-tier candidates keep discovery order, so
    // innermost-scope symbols stay ahead of outer ones.
    out.sort_by(|a, b| b.tier.cmp(&a.tier));
    out
}

/// The visibility/ownership filter, per candidate field.
fn field_passes(field: &Field, anchor: &AnchorInfo, inherited_call: bool) -> bool {
    let field_module = field.owner.as_ref().and_then(|o| o.module.clone());
    let same_module = matches!(
        (&field_module, &anchor.module),
        (Some(fm), Some(am)) if fm == am
    );

    if !same_module {
        return match field.visibility {
            Visibility::Public | Visibility::Published => true,
            // Protected crosses modules only along the inheritance chain.
            Visibility::Protected => field
                .owner
                .as_ref()
                .is_some_and(|o| anchor.ancestors.contains(&o.unique_name)),
            // Unit names carry private visibility but are referenced by
            // name, not by declared visibility.
            _ => field.kind == FieldKind::Unit,
        };
    }

    if let (Some(owner), Some(containing)) = (&field.owner, &anchor.containing) {
        if owner.unique_name != containing.unique_name {
            let is_ancestor = anchor.ancestors.contains(&owner.unique_name);
            if field.visibility.is_strict() {
                return false;
            }
            // Same module, different scope, outside the ancestor chain:
            // protected members stay hidden (the stricter reading).
            if field.visibility == Visibility::Protected && !is_ancestor {
                return false;
            }
            // Inherited-call completion only surfaces symbols reachable
            // through the override mechanism.
            if inherited_call && !is_ancestor {
                return false;
            }
        }
    }
    true
}

fn tier_for(field: &Field, anchor: &AnchorInfo) -> PriorityTier {
    // Leading underscores mark internal/compiler symbols; both single and
    // double prefixes clamp to the bottom tier.
    if field.name.starts_with('_') {
        return PriorityTier::Lowest;
    }
    if field
        .decl
        .as_ref()
        .is_some_and(|decl| decl.file != anchor.file)
    {
        return PriorityTier::Lower;
    }
    PriorityTier::Normal
}
