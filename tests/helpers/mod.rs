//! Shared fixtures for the completion tests.
//!
//! Trees are built through the same `TreeBuilder` interface the external
//! parser uses. A fixture description carries one caret marker; building it
//! yields the original tree (caret skipped), the speculative tree (dummy
//! identifier inserted at the caret, wrapped in the node kinds the parser
//! would produce there), the caret offset, and the original text.

use delphic::base::FileId;
use delphic::ide::{CompletionRequest, Suggestion, completions};
use delphic::index::InMemoryUnitIndex;
use delphic::syntax::{DUMMY_IDENT, SyntaxKind, SyntaxNode, TextSize, TreeBuilder};
use delphic::syntax::SyntaxKind::*;

/// One element of a fixture description.
pub enum Fx {
    Node(SyntaxKind, Vec<Fx>),
    Token(SyntaxKind, String),
    /// The cursor. `wrap` lists the node kinds (outermost first) the
    /// speculative parse puts around the dummy identifier.
    Caret(&'static [SyntaxKind]),
}

pub fn n(kind: SyntaxKind, children: Vec<Fx>) -> Fx {
    Fx::Node(kind, children)
}

pub fn t(kind: SyntaxKind, text: &str) -> Fx {
    Fx::Token(kind, text.to_string())
}

pub fn ws(text: &str) -> Fx {
    Fx::Token(WHITESPACE, text.to_string())
}

pub fn caret(wrap: &'static [SyntaxKind]) -> Fx {
    Fx::Caret(wrap)
}

/// Caret wrapped the way a bare identifier parses inside a statement.
pub fn caret_in_statement() -> Fx {
    caret(&[STATEMENT, EXPRESSION, FULLY_QUALIFIED_IDENT, SUB_IDENT])
}

pub struct Fixture {
    pub original: SyntaxNode,
    pub speculative: SyntaxNode,
    pub offset: TextSize,
    pub source: String,
}

/// Build a caret-less tree, e.g. another unit registered with the index.
pub fn build_tree(fx: &Fx) -> SyntaxNode {
    let mut text = String::new();
    let mut offset = None;
    let mut builder = TreeBuilder::new();
    emit(&mut builder, fx, false, &mut text, &mut offset);
    builder.finish()
}

pub fn build(fx: &Fx) -> Fixture {
    let mut source = String::new();
    let mut offset = None;
    let mut original = TreeBuilder::new();
    emit(&mut original, fx, false, &mut source, &mut offset);
    let original = original.finish();

    let mut sink = String::new();
    let mut spec_offset = None;
    let mut speculative = TreeBuilder::new();
    emit(&mut speculative, fx, true, &mut sink, &mut spec_offset);
    let speculative = speculative.finish();

    let offset = offset.expect("fixture needs exactly one caret");
    Fixture {
        original,
        speculative,
        offset: TextSize::from(offset as u32),
        source,
    }
}

fn emit(
    builder: &mut TreeBuilder,
    fx: &Fx,
    speculative: bool,
    text: &mut String,
    offset: &mut Option<usize>,
) {
    match fx {
        Fx::Node(kind, children) => {
            builder.start_node(*kind);
            for child in children {
                emit(builder, child, speculative, text, offset);
            }
            builder.finish_node();
        }
        Fx::Token(kind, tok_text) => {
            builder.token(*kind, tok_text);
            text.push_str(tok_text);
        }
        Fx::Caret(wrap) => {
            assert!(offset.is_none(), "fixture has more than one caret");
            *offset = Some(text.len());
            if speculative {
                for kind in wrap.iter() {
                    builder.start_node(*kind);
                }
                builder.token(IDENT, DUMMY_IDENT);
                for _ in wrap.iter() {
                    builder.finish_node();
                }
            }
        }
    }
}

impl Fixture {
    pub fn completions_with(&self, index: &InMemoryUnitIndex) -> Vec<Suggestion> {
        completions(&CompletionRequest {
            file: FileId::new(0),
            file_name: "Edited.pas",
            offset: self.offset,
            original: &self.original,
            speculative: &self.speculative,
            source: &self.source,
            index,
            virtual_context: None,
        })
    }

    pub fn completions(&self) -> Vec<Suggestion> {
        self.completions_with(&InMemoryUnitIndex::new())
    }
}

pub fn labels(suggestions: &[Suggestion]) -> Vec<String> {
    suggestions.iter().map(|s| s.label.to_string()).collect()
}

pub fn has_label(suggestions: &[Suggestion], label: &str) -> bool {
    suggestions
        .iter()
        .any(|s| s.label.eq_ignore_ascii_case(label))
}

// ---------------------------------------------------------------------------
// Tree snippets
// ---------------------------------------------------------------------------

pub fn named_ident(name: &str) -> Fx {
    n(NAMED_IDENT, vec![t(IDENT, name)])
}

pub fn type_id(name: &str) -> Fx {
    n(TYPE_ID, vec![t(IDENT, name)])
}

pub fn unit_head(name: &str) -> Fx {
    n(
        UNIT_HEAD,
        vec![t(UNIT_KW, "unit"), ws(" "), t(IDENT, name), t(SEMICOLON, ";")],
    )
}

pub fn var_decl(name: &str, ty: &str) -> Fx {
    n(
        VAR_DECL,
        vec![
            named_ident(name),
            t(COLON, ":"),
            ws(" "),
            type_id(ty),
            t(SEMICOLON, ";"),
        ],
    )
}

pub fn var_section(decls: Vec<Fx>) -> Fx {
    let mut children = vec![t(VAR_KW, "var"), ws("\n  ")];
    children.extend(decls);
    children.push(ws("\n"));
    n(VAR_SECTION, children)
}

pub fn uses_clause(units: &[&str]) -> Fx {
    let mut children = vec![t(USES_KW, "uses"), ws(" ")];
    for (i, unit) in units.iter().enumerate() {
        if i > 0 {
            children.push(t(COMMA, ","));
            children.push(ws(" "));
        }
        children.push(n(
            FULLY_QUALIFIED_IDENT,
            vec![n(SUB_IDENT, vec![t(IDENT, unit)])],
        ));
    }
    children.push(t(SEMICOLON, ";"));
    n(USES_CLAUSE, children)
}

/// `procedure Name;` inside a class body.
pub fn method_decl(name: &str) -> Fx {
    n(
        ROUTINE_DECL,
        vec![
            t(PROCEDURE_KW, "procedure"),
            ws(" "),
            named_ident(name),
            t(SEMICOLON, ";"),
        ],
    )
}

/// `TName = class(TParent) ... end;` wrapped in its type declaration.
pub fn class_decl(name: &str, parent: Option<&str>, members: Vec<Fx>) -> Fx {
    let mut class_children = vec![t(CLASS_KW, "class")];
    if let Some(parent) = parent {
        class_children.push(n(
            CLASS_PARENT,
            vec![t(L_PAREN, "("), t(IDENT, parent), t(R_PAREN, ")")],
        ));
    }
    class_children.push(ws("\n  "));
    class_children.extend(members);
    class_children.push(ws("\n"));
    class_children.push(t(END_KW, "end"));
    n(
        TYPE_DECL,
        vec![
            named_ident(name),
            ws(" "),
            t(EQ, "="),
            ws(" "),
            n(CLASS_TYPE, class_children),
            t(SEMICOLON, ";"),
        ],
    )
}

pub fn type_section(decls: Vec<Fx>) -> Fx {
    let mut children = vec![t(TYPE_KW, "type"), ws("\n  ")];
    children.extend(decls);
    children.push(ws("\n"));
    n(TYPE_SECTION, children)
}

/// A routine implementation. `name_parts` is `["Foo"]` for a plain routine
/// or `["TChild", "Bar"]` for a method body.
pub fn routine_impl(name_parts: &[&str], locals: Vec<Fx>, body: Vec<Fx>) -> Fx {
    let name: Fx = if name_parts.len() > 1 {
        let mut subs = Vec::new();
        for (i, part) in name_parts.iter().enumerate() {
            if i > 0 {
                subs.push(t(DOT, "."));
            }
            subs.push(n(SUB_IDENT, vec![t(IDENT, part)]));
        }
        n(FULLY_QUALIFIED_IDENT, subs)
    } else {
        named_ident(name_parts[0])
    };
    let mut children = vec![t(PROCEDURE_KW, "procedure"), ws(" "), name, t(SEMICOLON, ";"), ws("\n")];
    if !locals.is_empty() {
        children.push(n(BLOCK_LOCAL, locals));
    }
    let mut compound = vec![t(BEGIN_KW, "begin"), ws("\n  ")];
    compound.extend(body);
    compound.push(ws("\n"));
    compound.push(t(END_KW, "end"));
    compound.push(t(SEMICOLON, ";"));
    children.push(n(COMPOUND_STATEMENT, compound));
    n(ROUTINE_IMPL, children)
}

/// A whole unit: header, interface items, implementation items.
pub fn unit_module(name: &str, interface: Vec<Fx>, implementation: Vec<Fx>) -> Fx {
    let mut iface = vec![t(INTERFACE_KW, "interface"), ws("\n")];
    iface.extend(interface);
    iface.push(ws("\n"));
    let mut impl_children = vec![t(IMPLEMENTATION_KW, "implementation"), ws("\n")];
    impl_children.extend(implementation);
    impl_children.push(ws("\n"));
    n(
        MODULE,
        vec![
            unit_head(name),
            ws("\n"),
            n(UNIT_INTERFACE, iface),
            n(UNIT_IMPLEMENTATION, impl_children),
            t(END_KW, "end"),
            t(DOT, "."),
            ws("\n"),
        ],
    )
}
