//! Position classification — mapping a cursor to completion contexts.
//!
//! The classifier inspects the deepest node at the cursor in both the
//! speculative tree (dummy identifier inserted at the caret) and the
//! original tree, and emits the *set* of contexts that apply. Rules are
//! cumulative: a position can be a declaration section and a statement at
//! once. Malformed source never fails a rule, it just contributes nothing.

use text_size::TextSize;
use tracing::trace;

use crate::base::FileId;
use crate::hir::ScopeNode;
use crate::syntax::{
    self, ModuleKind, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken,
};

/// Where a declaration section sits; selects the keyword subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclLevel {
    Unit,
    RoutineLocal,
    Global,
}

/// Fine-grained statement-position facts, computed once by the classifier
/// and consumed by the suggestion driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementCtx {
    /// Right of an assignment, inside an argument list, or inside the
    /// controlling expression of if/while/case.
    pub value_position: bool,
    /// Value keywords are withheld right after a qualifier dot.
    pub after_dot: bool,
    /// A left-hand statement position.
    pub left_position: bool,
    /// Nested in a for/while/repeat body: cycle-control keywords apply.
    pub in_loop: bool,
    /// Statement-starting keywords apply (bare, unqualified position).
    pub offer_statements: bool,
    pub offer_else: bool,
    /// One-shot terminators: only when the enclosing construct lacks them.
    pub offer_except: bool,
    pub offer_until_terminator: bool,
    /// The enclosing control construct still needs its connector keyword.
    pub connector: Option<&'static str>,
    /// The connector exists (or no connector applies): offer `begin`.
    pub offer_begin: bool,
    /// Anywhere inside a repeat body the closing `until` stays available.
    pub offer_until: bool,
}

impl StatementCtx {
    fn is_empty(&self) -> bool {
        *self == StatementCtx::default()
    }
}

/// A classification of the cursor position. The classifier returns a set;
/// several contexts routinely apply at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Context {
    /// No module header exists yet in the file.
    ModuleHeaderMissing { content_follows: bool },
    /// Directly inside the module body, between sections.
    ModuleSectionTop { kind: ModuleKind },
    UsesClause,
    DeclarationSection {
        level: DeclLevel,
        /// Declaration keywords apply (suppressed mid-line in routines).
        offer_keywords: bool,
        /// A nested `uses` is only offered while the scope has none.
        offer_uses: bool,
        /// Unit section keywords follow an implementation section.
        offer_sections: bool,
    },
    StructuredTypeBody,
    TypePosition {
        /// Type-constructor keywords are withheld in heritage clauses.
        allow_keywords: bool,
    },
    PropertySpecifier,
    ConstExpression,
    Expression,
    ParameterList,
    Statement(StatementCtx),
    InheritedCall,
    Directive { is_method: bool },
    CommentPragma { pragma: bool },
}

/// Classifier inputs: the two trees, the cursor, and the original text.
pub struct ClassifyInput<'a> {
    pub file: FileId,
    pub offset: TextSize,
    pub original: &'a SyntaxNode,
    pub speculative: &'a SyntaxNode,
    pub source: &'a str,
}

/// Compute the set of completion contexts for a cursor position.
pub fn classify(input: &ClassifyInput<'_>) -> Vec<Context> {
    let spec_token = syntax::token_at_offset(input.speculative, input.offset);
    let orig_token = syntax::token_at_offset(input.original, input.offset);

    // Inherited-call narrows everything down to ancestor routines; it must
    // win over generic statement classification.
    if detect_inherited(&orig_token) || detect_inherited(&spec_token) {
        return vec![Context::InheritedCall];
    }

    // Comments are mutually exclusive with every syntactic rule.
    if let Some(token) = &orig_token {
        if matches!(
            token.kind(),
            SyntaxKind::LINE_COMMENT | SyntaxKind::BLOCK_COMMENT
        ) {
            return vec![Context::CommentPragma {
                pragma: token.text().starts_with("{$"),
            }];
        }
    }

    let pos = spec_token
        .as_ref()
        .and_then(|t| syntax::skip_to_expression_parent(&SyntaxElement::Token(t.clone())));
    let orig_pos = orig_token
        .as_ref()
        .and_then(|t| syntax::skip_to_expression_parent(&SyntaxElement::Token(t.clone())));
    let prev = pos
        .as_ref()
        .and_then(|n| syntax::prev_non_trivia_sibling(&SyntaxElement::Node(n.clone())));
    let first_on_line = syntax::is_first_on_line(input.source, input.offset);

    trace!(
        pos = ?pos.as_ref().map(SyntaxNode::kind),
        orig_pos = ?orig_pos.as_ref().map(SyntaxNode::kind),
        first_on_line,
        "classifying position"
    );

    let mut out = Vec::new();

    let in_decl_area = orig_pos.as_ref().is_some_and(|n| {
        matches!(
            n.kind(),
            SyntaxKind::TYPE_SECTION | SyntaxKind::ROUTINE_IMPL | SyntaxKind::BLOCK_LOCAL
        )
    });
    let prev_is_type_section = prev
        .as_ref()
        .is_some_and(|el| el.kind() == SyntaxKind::TYPE_SECTION);
    if !prev_is_type_section && !in_decl_area {
        classify_module_header(input, &orig_token, &mut out);
        classify_module_section(&pos, &mut out);
        classify_uses(&pos, &orig_pos, &mut out);
    }

    classify_declarations(&pos, &orig_token, first_on_line, &mut out);
    classify_structured(input, &pos, &orig_pos, first_on_line, &mut out);
    classify_parameters(&pos, &mut out);
    classify_entities(&pos, &orig_pos, &orig_token, &mut out);

    let mut stmt = StatementCtx::default();
    classify_statement(&pos, &orig_pos, &orig_token, &mut stmt);
    classify_inside_statement(input, &pos, &orig_pos, &orig_token, &spec_token, &mut stmt);
    if !stmt.is_empty() {
        out.push(Context::Statement(stmt));
    }

    classify_directives(input, &pos, &orig_pos, &prev, first_on_line, &mut out);

    out
}

/// True when the nearest non-trivial preceding leaf is `inherited`, or the
/// enclosing statement opens with it while the cursor is on its identifier.
fn detect_inherited(token: &Option<SyntaxToken>) -> bool {
    let Some(token) = token else {
        return false;
    };
    if token.kind() == SyntaxKind::INHERITED_KW {
        return true;
    }
    if syntax::prev_leaf_non_trivia(token)
        .is_some_and(|t| t.kind() == SyntaxKind::INHERITED_KW)
    {
        // A semicolon would have closed the previous statement; a bare
        // preceding `inherited` leaf means the cursor completes its call.
        return true;
    }
    if token.kind() == SyntaxKind::IDENT {
        let stmt = token
            .parent()
            .and_then(|p| syntax::ancestor_matching(&p, |k| k == SyntaxKind::STATEMENT));
        if let Some(stmt) = stmt {
            if syntax::first_leaf_non_trivia(&stmt)
                .is_some_and(|t| t.kind() == SyntaxKind::INHERITED_KW)
            {
                return true;
            }
        }
    }
    false
}

fn classify_module_header(
    input: &ClassifyInput<'_>,
    orig_token: &Option<SyntaxToken>,
    out: &mut Vec<Context>,
) {
    let has_header = input.original.descendants().any(|n| {
        matches!(
            n.kind(),
            SyntaxKind::UNIT_HEAD
                | SyntaxKind::PROGRAM_HEAD
                | SyntaxKind::LIBRARY_HEAD
                | SyntaxKind::PACKAGE_HEAD
        )
    });
    if has_header {
        return;
    }
    let content_follows = orig_token.as_ref().is_some_and(|t| {
        let mut next = t.next_token();
        while let Some(n) = next {
            if !n.kind().is_trivia() {
                return true;
            }
            next = n.next_token();
        }
        false
    });
    out.push(Context::ModuleHeaderMissing { content_follows });
}

fn classify_module_section(pos: &Option<SyntaxNode>, out: &mut Vec<Context>) {
    let Some(pos) = pos else {
        return;
    };
    if pos.kind() != SyntaxKind::MODULE {
        return;
    }
    if let Some(kind) = syntax::module_kind(pos) {
        out.push(Context::ModuleSectionTop { kind });
    }
}

fn classify_uses(pos: &Option<SyntaxNode>, orig_pos: &Option<SyntaxNode>, out: &mut Vec<Context>) {
    let in_uses = pos
        .as_ref()
        .is_some_and(|n| n.kind() == SyntaxKind::USES_CLAUSE)
        || orig_pos
            .as_ref()
            .is_some_and(|n| n.kind() == SyntaxKind::USES_CLAUSE);
    if in_uses {
        out.push(Context::UsesClause);
    }
}

const DECLARATION_HOSTS: &[SyntaxKind] = &[
    SyntaxKind::UNIT_INTERFACE,
    SyntaxKind::UNIT_IMPLEMENTATION,
    SyntaxKind::TYPE_SECTION,
    SyntaxKind::CONST_SECTION,
    SyntaxKind::VAR_SECTION,
    SyntaxKind::ROUTINE_IMPL,
    SyntaxKind::BLOCK_LOCAL,
    SyntaxKind::BLOCK_GLOBAL,
];

fn classify_declarations(
    pos: &Option<SyntaxNode>,
    orig_token: &Option<SyntaxToken>,
    first_on_line: bool,
    out: &mut Vec<Context>,
) {
    // Right after the identifier of a declaration (`var x|`) the keyword
    // set would corrupt the declaration being typed.
    if let Some(token) = orig_token {
        let el = SyntaxElement::Token(token.clone());
        if syntax::prev_non_trivia_sibling(&el)
            .is_some_and(|p| p.kind() == SyntaxKind::NAMED_IDENT)
        {
            return;
        }
    }
    let Some(pos) = pos else {
        return;
    };
    if !DECLARATION_HOSTS.contains(&pos.kind()) {
        return;
    }
    let scope = if pos.kind().is_scope() {
        Some(pos.clone())
    } else {
        syntax::ancestor_matching(pos, |k| {
            k.is_scope() || k == SyntaxKind::UNIT_INTERFACE || k == SyntaxKind::UNIT_IMPLEMENTATION
        })
    };
    let offer_sections = pos.kind() == SyntaxKind::UNIT_IMPLEMENTATION
        || scope
            .as_ref()
            .is_some_and(|s| s.kind() == SyntaxKind::UNIT_IMPLEMENTATION);
    let is_routine = scope.as_ref().is_some_and(|s| {
        matches!(s.kind(), SyntaxKind::ROUTINE_IMPL | SyntaxKind::ROUTINE_DECL)
    });
    if is_routine {
        out.push(Context::DeclarationSection {
            level: DeclLevel::RoutineLocal,
            offer_keywords: first_on_line,
            offer_uses: false,
            offer_sections: false,
        });
    } else {
        let level = if pos.kind() == SyntaxKind::BLOCK_GLOBAL {
            DeclLevel::Global
        } else {
            DeclLevel::Unit
        };
        let offer_uses = scope
            .as_ref()
            .map(|s| syntax::find_descendant(s, SyntaxKind::USES_CLAUSE).is_none())
            .unwrap_or(true);
        out.push(Context::DeclarationSection {
            level,
            offer_keywords: true,
            offer_uses,
            offer_sections,
        });
    }
}

fn classify_structured(
    input: &ClassifyInput<'_>,
    pos: &Option<SyntaxNode>,
    orig_pos: &Option<SyntaxNode>,
    first_on_line: bool,
    out: &mut Vec<Context>,
) {
    // Only when the cursor starts its line; mid-line member keywords would
    // corrupt the declaration under edit.
    if !first_on_line {
        return;
    }
    let in_field = pos
        .as_ref()
        .is_some_and(|n| n.kind() == SyntaxKind::CLASS_FIELD);
    let in_struct_body = orig_pos.as_ref().is_some_and(|n| {
        n.kind().is_struct_type() || n.kind() == SyntaxKind::VISIBILITY_SECTION
    });
    let on_method_decl = pos.as_ref().is_some_and(|n| {
        n.kind() == SyntaxKind::ROUTINE_DECL
            && ScopeNode::new(n.clone(), input.file).is_some_and(|s| s.is_method())
    });
    if in_field || in_struct_body || on_method_decl {
        out.push(Context::StructuredTypeBody);
    }
}

fn classify_parameters(pos: &Option<SyntaxNode>, out: &mut Vec<Context>) {
    let Some(pos) = pos else {
        return;
    };
    if pos.kind() == SyntaxKind::FORMAL_PARAM
        && syntax::child_of_kind(pos, SyntaxKind::TYPE_ID).is_none()
    {
        out.push(Context::ParameterList);
    }
}

fn classify_entities(
    pos: &Option<SyntaxNode>,
    orig_pos: &Option<SyntaxNode>,
    orig_token: &Option<SyntaxToken>,
    out: &mut Vec<Context>,
) {
    let pos_kind = pos.as_ref().map(SyntaxNode::kind);
    let orig_kind = orig_pos.as_ref().map(SyntaxNode::kind);
    if pos_kind == Some(SyntaxKind::TYPE_ID) || orig_kind == Some(SyntaxKind::TYPE_ID) {
        let allow_keywords = pos
            .as_ref()
            .or(orig_pos.as_ref())
            .and_then(SyntaxNode::parent)
            .is_none_or(|p| p.kind() != SyntaxKind::CLASS_PARENT);
        out.push(Context::TypePosition { allow_keywords });
    } else if matches!(
        pos_kind,
        Some(SyntaxKind::PROPERTY_SPECIFIER) | Some(SyntaxKind::CLASS_PROPERTY)
    ) {
        out.push(Context::PropertySpecifier);
    } else if pos_kind == Some(SyntaxKind::CONST_EXPRESSION) {
        out.push(Context::ConstExpression);
    } else if orig_token.as_ref().is_some_and(|t| {
        syntax::enclosing_expression(&SyntaxElement::Token(t.clone())).is_some()
    }) {
        out.push(Context::Expression);
    }
}

fn is_value_position(pos: &Option<SyntaxNode>, orig_token: &Option<SyntaxToken>) -> bool {
    if let Some(token) = orig_token {
        if let Some(parent) = token.parent() {
            if syntax::ancestor_matching(&parent, |k| k == SyntaxKind::CASE_STATEMENT).is_some() {
                return true;
            }
        }
    }
    pos.as_ref().is_some_and(|n| {
        matches!(
            n.kind(),
            SyntaxKind::ASSIGN_PART
                | SyntaxKind::ARGUMENT_LIST
                | SyntaxKind::IF_STATEMENT
                | SyntaxKind::WHILE_STATEMENT
                | SyntaxKind::CASE_STATEMENT
        )
    })
}

fn classify_statement(
    pos: &Option<SyntaxNode>,
    orig_pos: &Option<SyntaxNode>,
    orig_token: &Option<SyntaxToken>,
    ctx: &mut StatementCtx,
) {
    let mut pos = pos.clone();
    if is_value_position(&pos, orig_token) {
        ctx.value_position = true;
        ctx.after_dot = orig_token
            .as_ref()
            .and_then(syntax::prev_leaf_non_trivia)
            .is_some_and(|t| t.kind() == SyntaxKind::DOT);
    } else if orig_pos.as_ref().is_some_and(|n| n.kind() == SyntaxKind::STATEMENT) {
        pos = orig_pos.clone();
    }
    if pos.as_ref().is_some_and(|n| n.kind() == SyntaxKind::STATEMENT) {
        ctx.left_position = true;
        ctx.in_loop = orig_token
            .as_ref()
            .and_then(SyntaxToken::parent)
            .and_then(|p| {
                syntax::ancestor_matching(&p, |k| {
                    matches!(
                        k,
                        SyntaxKind::FOR_STATEMENT
                            | SyntaxKind::WHILE_STATEMENT
                            | SyntaxKind::REPEAT_STATEMENT
                    )
                })
            })
            .is_some();
    }
}

fn classify_inside_statement(
    input: &ClassifyInput<'_>,
    pos: &Option<SyntaxNode>,
    orig_pos: &Option<SyntaxNode>,
    orig_token: &Option<SyntaxToken>,
    spec_token: &Option<SyntaxToken>,
    ctx: &mut StatementCtx,
) {
    let statement_like =
        |n: &&SyntaxNode| matches!(n.kind(), SyntaxKind::STATEMENT | SyntaxKind::CASE_ITEM);
    let Some(mut pos) = pos
        .as_ref()
        .filter(statement_like)
        .or_else(|| orig_pos.as_ref().filter(statement_like))
        .cloned()
    else {
        return;
    };
    let probe = spec_token.as_ref().or(orig_token.as_ref());
    ctx.offer_statements = probe.is_some_and(|t| {
        !is_part_of_expression(t) && !is_qualified(t)
    });

    let parent_kind = pos.parent().map(|p| p.kind());
    ctx.offer_else = parent_kind == Some(SyntaxKind::IF_THEN_STATEMENT)
        || orig_pos.as_ref().is_some_and(|n| {
            matches!(n.kind(), SyntaxKind::CASE_STATEMENT | SyntaxKind::CASE_ITEM)
        });
    if let Some(parent) = pos.parent() {
        if parent.kind() == SyntaxKind::TRY_STATEMENT
            && syntax::child_token(&parent, SyntaxKind::EXCEPT_KW).is_none()
            && syntax::child_token(&parent, SyntaxKind::FINALLY_KW).is_none()
        {
            ctx.offer_except = true;
        }
        if parent.kind() == SyntaxKind::REPEAT_STATEMENT
            && syntax::child_token(&parent, SyntaxKind::UNTIL_KW).is_none()
        {
            ctx.offer_until_terminator = true;
        }
    }

    // Connector vs begin: climb to the control construct, then look for its
    // connector keyword among the construct's direct tokens.
    if !pos.kind().is_control_statement() {
        if let Some(p) = pos.parent() {
            pos = p;
        }
    }
    if pos.kind() == SyntaxKind::IF_THEN_STATEMENT {
        if let Some(p) = pos.parent() {
            pos = p;
        }
    }
    if pos.kind().is_control_statement() {
        match connector_of(pos.kind()) {
            Some((text, kind)) => match syntax::child_token(&pos, kind) {
                Some(tok) if tok.text_range().start() < input.offset => ctx.offer_begin = true,
                Some(_) => {}
                None => ctx.connector = Some(text),
            },
            None => ctx.offer_begin = true,
        }
    } else if pos.kind() == SyntaxKind::CASE_ITEM {
        ctx.offer_begin = true;
    }

    if syntax::ancestor_matching(&pos, |k| k == SyntaxKind::REPEAT_STATEMENT).is_some() {
        ctx.offer_until = true;
    }
}

fn connector_of(kind: SyntaxKind) -> Option<(&'static str, SyntaxKind)> {
    match kind {
        SyntaxKind::IF_STATEMENT => Some(("then", SyntaxKind::THEN_KW)),
        SyntaxKind::FOR_STATEMENT | SyntaxKind::WHILE_STATEMENT | SyntaxKind::WITH_STATEMENT => {
            Some(("do", SyntaxKind::DO_KW))
        }
        SyntaxKind::CASE_STATEMENT => Some(("of", SyntaxKind::OF_KW)),
        _ => None,
    }
}

fn is_part_of_expression(token: &SyntaxToken) -> bool {
    let Some(expr) = syntax::enclosing_expression(&SyntaxElement::Token(token.clone())) else {
        return false;
    };
    if expr.children().count() > 1 {
        return true;
    }
    expr.parent()
        .is_some_and(|p| p.kind() == SyntaxKind::EXPRESSION && p.children().count() > 1)
}

fn is_qualified(token: &SyntaxToken) -> bool {
    token
        .parent()
        .and_then(|p| {
            syntax::ancestor_matching(&p, |k| k == SyntaxKind::FULLY_QUALIFIED_IDENT)
        })
        .is_some_and(|fqi| {
            fqi.children()
                .filter(|c| c.kind() == SyntaxKind::SUB_IDENT)
                .count()
                > 1
        })
}

fn classify_directives(
    input: &ClassifyInput<'_>,
    pos: &Option<SyntaxNode>,
    orig_pos: &Option<SyntaxNode>,
    prev: &Option<SyntaxElement>,
    first_on_line: bool,
    out: &mut Vec<Context>,
) {
    // Directives trail a routine header on the same line; at line start the
    // declaration rules own the position.
    if first_on_line {
        return;
    }
    let is_routine = |k: SyntaxKind| matches!(k, SyntaxKind::ROUTINE_DECL | SyntaxKind::ROUTINE_IMPL);
    let routine = orig_pos
        .as_ref()
        .filter(|n| is_routine(n.kind()))
        .or_else(|| pos.as_ref().filter(|n| is_routine(n.kind())))
        .cloned()
        .or_else(|| {
            prev.as_ref().and_then(|el| match el {
                SyntaxElement::Node(n) if is_routine(n.kind()) => Some(n.clone()),
                _ => None,
            })
        });
    let Some(routine) = routine else {
        return;
    };
    let Some(scope) = ScopeNode::new(routine.clone(), input.file) else {
        return;
    };
    if scope.is_method() {
        // Method directives belong on the declaration inside the class,
        // never on the defining implementation.
        if routine.kind() == SyntaxKind::ROUTINE_DECL {
            out.push(Context::Directive { is_method: true });
        }
    } else {
        out.push(Context::Directive { is_method: false });
    }
}
