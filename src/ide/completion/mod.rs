//! Completion entry point.
//!
//! One request is fully classified, resolved, and aggregated before control
//! returns: the classifier maps the cursor to a set of contexts, each
//! context contributes keyword suggestions and/or a resolver call with a
//! kind filter, and the aggregator merges, filters, dedupes, and ranks.
//! Trees and the unit index are read-only snapshots for the duration; the
//! same request against the same snapshot always yields the same list.

mod aggregate;
mod context;
mod keywords;

pub use aggregate::{
    AggregateOptions, AnchorInfo, PriorityTier, Suggestion, SuggestionSource, aggregate,
};
pub use context::{ClassifyInput, Context, DeclLevel, StatementCtx, classify};

use text_size::TextSize;
use tracing::debug;

use crate::base::{FileId, NameKey};
use crate::hir::{Field, FieldKind, Resolver, ScopeNode, split_path};
use crate::index::UnitIndex;
use crate::syntax::{self, DUMMY_IDENT, ModuleKind, SyntaxNode, SyntaxToken};

use super::templates::{TemplateKey, TemplateVariant, has_template};

/// A cross-anchor query: resolve a dotted path against an arbitrary scope
/// element instead of the cursor's own surroundings. Visibility checks are
/// disabled for these.
pub struct VirtualContext<'a> {
    pub anchor: &'a SyntaxNode,
    pub anchor_file: FileId,
    /// The dotted path text; may still carry the dummy identifier.
    pub path: &'a str,
}

/// A completion request over immutable snapshots.
pub struct CompletionRequest<'a> {
    pub file: FileId,
    /// Name of the edited file; its stem feeds module-header templates.
    pub file_name: &'a str,
    pub offset: TextSize,
    /// Tree of the text as typed.
    pub original: &'a SyntaxNode,
    /// Tree with [`DUMMY_IDENT`] inserted at the caret.
    pub speculative: &'a SyntaxNode,
    /// Original source text, for line-position checks.
    pub source: &'a str,
    pub index: &'a dyn UnitIndex,
    pub virtual_context: Option<VirtualContext<'a>>,
}

/// Compute the ranked, deduplicated suggestion list for a request.
pub fn completions(req: &CompletionRequest<'_>) -> Vec<Suggestion> {
    let resolver = Resolver::new(req.file, req.index);
    let anchor = anchor_info(req, &resolver);

    // Cross-anchor virtual queries bypass classification entirely.
    if let Some(vc) = &req.virtual_context {
        let fields = resolve_virtual(vc, &resolver);
        return aggregate(
            Vec::new(),
            fields,
            &anchor,
            AggregateOptions {
                ignore_visibility: true,
                inherited_call: false,
            },
        );
    }

    let contexts = classify(&ClassifyInput {
        file: req.file,
        offset: req.offset,
        original: req.original,
        speculative: req.speculative,
        source: req.source,
    });
    debug!(?contexts, "classified completion position");

    let spec_token = syntax::token_at_offset(req.speculative, req.offset);
    let mut kws: Vec<Suggestion> = Vec::new();
    let mut fields: Vec<Field> = Vec::new();
    let mut opts = AggregateOptions::default();

    for ctx in &contexts {
        match ctx {
            Context::InheritedCall => {
                opts.inherited_call = true;
                if let Some(token) = &spec_token {
                    fields.extend(resolver.inherited_routines(token));
                }
            }
            Context::CommentPragma { pragma } => {
                if *pragma {
                    for &kw in keywords::PRAGMAS {
                        kws.push(Suggestion::keyword(kw, None));
                    }
                }
            }
            Context::ModuleHeaderMissing { content_follows } => {
                for &kw in keywords::MODULE_HEADERS {
                    push_unique(&mut kws, kw, req.original);
                }
                let variant = if *content_follows {
                    TemplateVariant::Default
                } else {
                    TemplateVariant::TopLevel
                };
                kws.push(Suggestion::keyword(
                    "begin",
                    Some(TemplateKey::with_variant("begin", variant)),
                ));
            }
            Context::ModuleSectionTop { kind } => {
                self::module_section_keywords(req, *kind, &mut kws);
            }
            Context::UsesClause => {
                uses_candidates(req, &mut kws);
            }
            Context::DeclarationSection {
                level,
                offer_keywords,
                offer_uses,
                offer_sections,
            } => {
                if *offer_sections {
                    let module = module_node(req);
                    for &kw in keywords::UNIT_SECTIONS {
                        if let Some(module) = &module {
                            push_unique(&mut kws, kw, module);
                        }
                    }
                }
                if *offer_keywords {
                    let set = match level {
                        DeclLevel::RoutineLocal => keywords::DECLARATIONS_LOCAL,
                        _ => keywords::DECLARATIONS,
                    };
                    for &kw in set {
                        kws.push(templated(kw));
                    }
                    if *offer_uses {
                        kws.push(templated("uses"));
                    }
                }
                kws.push(templated("begin"));
            }
            Context::StructuredTypeBody => {
                for &kw in keywords::VISIBILITY {
                    kws.push(Suggestion::keyword(kw, None));
                }
                for &kw in keywords::STRUCT_DECLARATIONS {
                    kws.push(templated(kw));
                }
                // `class procedure` / `class function` member prefix; the
                // type skeleton does not apply here.
                kws.push(Suggestion::keyword("class", None));
                for &kw in keywords::DECLARATIONS_LOCAL {
                    kws.push(templated(kw));
                }
            }
            Context::TypePosition { allow_keywords } => {
                resolve_into(&resolver, &spec_token, FieldKind::TYPES_TYPE_UNIT, &mut fields);
                if *allow_keywords {
                    for &kw in keywords::TYPE_DECLARATIONS {
                        kws.push(templated(kw));
                    }
                    kws.push(Suggestion::keyword(
                        "interface",
                        Some(TemplateKey::with_variant("interface", TemplateVariant::TypeDecl)),
                    ));
                }
            }
            Context::PropertySpecifier => {
                resolve_into(
                    &resolver,
                    &spec_token,
                    FieldKind::TYPES_PROPERTY_SPECIFIER,
                    &mut fields,
                );
            }
            Context::ConstExpression => {
                resolve_into(&resolver, &spec_token, FieldKind::TYPES_STATIC, &mut fields);
            }
            Context::Expression => {
                resolve_into(&resolver, &spec_token, FieldKind::TYPES_ALL, &mut fields);
            }
            Context::ParameterList => {
                for &kw in keywords::PARAM_MODIFIERS {
                    kws.push(Suggestion::keyword(kw, None));
                }
            }
            Context::Statement(stmt) => {
                statement_suggestions(stmt, &resolver, &spec_token, &mut kws, &mut fields);
            }
            Context::Directive { is_method } => {
                let set = if *is_method {
                    keywords::DIRECTIVE_METHOD
                } else {
                    keywords::DIRECTIVE_ROUTINE
                };
                for &kw in set {
                    kws.push(Suggestion::keyword(kw, None));
                }
            }
        }
    }

    aggregate(kws, fields, &anchor, opts)
}

fn statement_suggestions(
    stmt: &StatementCtx,
    resolver: &Resolver<'_>,
    spec_token: &Option<SyntaxToken>,
    kws: &mut Vec<Suggestion>,
    fields: &mut Vec<Field>,
) {
    if stmt.value_position {
        resolve_into(resolver, spec_token, FieldKind::TYPES_ALL, fields);
        if !stmt.after_dot {
            for &kw in keywords::VALUES {
                kws.push(Suggestion::keyword(kw, None));
            }
        }
    }
    if stmt.left_position {
        resolve_into(resolver, spec_token, FieldKind::TYPES_LEFT_SIDE, fields);
        if stmt.in_loop {
            for &kw in keywords::STATEMENTS_IN_CYCLE {
                kws.push(Suggestion::keyword(kw, None));
            }
        }
    }
    if stmt.offer_statements {
        for &kw in keywords::STATEMENTS {
            kws.push(templated(kw));
        }
    }
    if stmt.offer_else {
        kws.push(Suggestion::keyword("else", None));
    }
    if stmt.offer_except {
        kws.push(templated("except"));
    }
    if stmt.offer_until_terminator || stmt.offer_until {
        kws.push(templated("until"));
    }
    if let Some(connector) = stmt.connector {
        kws.push(templated(connector));
    }
    if stmt.offer_begin {
        kws.push(templated("begin"));
    }
}

/// Keyword suggestion carrying its default template when one exists.
fn templated(label: &'static str) -> Suggestion {
    let key = TemplateKey::new(label);
    Suggestion::keyword(label, has_template(key).then_some(key))
}

/// One-shot keywords: withheld once the node their acceptance produces
/// already exists under `check`.
fn push_unique(kws: &mut Vec<Suggestion>, label: &'static str, check: &SyntaxNode) {
    if let Some(kind) = keywords::PRODUCED_NODE.get(label) {
        if syntax::find_descendant(check, *kind).is_some() {
            return;
        }
    }
    kws.push(templated(label));
}

fn module_section_keywords(req: &CompletionRequest<'_>, kind: ModuleKind, kws: &mut Vec<Suggestion>) {
    let module = module_node(req);
    let check = module.as_ref().unwrap_or(req.original);
    match kind {
        ModuleKind::Unit => {
            for &kw in keywords::UNIT_SECTIONS {
                push_unique(kws, kw, check);
            }
        }
        // Package, library, and program share the trailing block keywords;
        // each adds its own clauses on top.
        ModuleKind::Package => {
            for &kw in keywords::TOP_LEVEL_DECLARATIONS {
                push_unique(kws, kw, check);
            }
            program_level_keywords(kws, check);
        }
        ModuleKind::Library => {
            kws.push(Suggestion::keyword("exports", None));
            program_level_keywords(kws, check);
        }
        ModuleKind::Program => {
            program_level_keywords(kws, check);
        }
    }
}

fn program_level_keywords(kws: &mut Vec<Suggestion>, check: &SyntaxNode) {
    push_unique(kws, "uses", check);
    for &kw in keywords::DECLARATIONS {
        kws.push(templated(kw));
    }
    kws.push(Suggestion::keyword(
        "begin",
        Some(TemplateKey::with_variant("begin", TemplateVariant::TopLevel)),
    ));
}

/// Uses-clause candidates: every discoverable unit except the module
/// itself and the units already listed.
fn uses_candidates(req: &CompletionRequest<'_>, kws: &mut Vec<Suggestion>) {
    let mut excluded: Vec<NameKey> = Vec::new();
    if let Some(module) = module_node(req) {
        if let Some(name) = syntax::module_name(&module) {
            excluded.push(NameKey::new(&name));
        }
        if let Some(scope) = ScopeNode::new(module, req.file) {
            for field in scope.declared_fields() {
                if field.kind == FieldKind::Unit {
                    excluded.push(field.name_key());
                }
            }
        }
    }
    for candidate in req.index.unit_candidates() {
        if candidate.name.contains(DUMMY_IDENT) {
            continue;
        }
        if !excluded.contains(&NameKey::new(&candidate.name)) {
            kws.push(Suggestion::unit_file(&candidate.name, &candidate.extension));
        }
    }
}

fn resolve_into(
    resolver: &Resolver<'_>,
    spec_token: &Option<SyntaxToken>,
    kinds: &[FieldKind],
    fields: &mut Vec<Field>,
) {
    if let Some(token) = spec_token {
        fields.extend(resolver.resolve_at(token, kinds));
    }
}

fn module_node(req: &CompletionRequest<'_>) -> Option<SyntaxNode> {
    if req.original.kind() == crate::syntax::SyntaxKind::MODULE {
        return Some(req.original.clone());
    }
    syntax::find_descendant(req.original, crate::syntax::SyntaxKind::MODULE)
}

fn anchor_info(req: &CompletionRequest<'_>, resolver: &Resolver<'_>) -> AnchorInfo {
    let orig_token = syntax::token_at_offset(req.original, req.offset);
    let nearest = orig_token
        .as_ref()
        .and_then(SyntaxToken::parent)
        .and_then(|p| ScopeNode::nearest(&p, req.file));
    let containing = nearest.as_ref().and_then(ScopeNode::containing_scope);
    let ancestors = containing
        .as_ref()
        .map(|scope| {
            resolver
                .parent_structs(scope)
                .iter()
                .map(ScopeNode::unique_name)
                .collect()
        })
        .unwrap_or_default();
    let module = module_node(req)
        .and_then(|m| syntax::module_name(&m))
        .map(|name| NameKey::new(&name));
    AnchorInfo {
        module,
        file: req.file,
        containing: containing.as_ref().map(ScopeNode::scope_ref),
        ancestors,
    }
}

fn resolve_virtual(vc: &VirtualContext<'_>, resolver: &Resolver<'_>) -> Vec<Field> {
    let Some(scope) = ScopeNode::nearest(vc.anchor, vc.anchor_file) else {
        return Vec::new();
    };
    let raw = vc.path.replace(DUMMY_IDENT, "");
    let mut segments = split_path(&raw);
    // A trailing partial segment is the probe, not a qualifier.
    if !raw.trim_end().ends_with('.') {
        segments.pop();
    }
    let refs: Vec<&str> = segments.iter().map(|s| s.as_str()).collect();
    resolver.resolve_path(&scope, &refs, FieldKind::TYPES_ALL)
}
