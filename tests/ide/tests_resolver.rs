//! Symbol-resolution tests: scope chains, inheritance, cross-unit lookup.

use crate::helpers::*;
use delphic::base::FileId;
use delphic::hir::Resolver;
use delphic::ide::{PriorityTier, SuggestionSource};
use delphic::index::InMemoryUnitIndex;
use delphic::syntax::SyntaxKind::*;

/// Unit A with a routine body caret; interface declares `Count: Integer`,
/// the routine a local `Count: string` that shadows it.
#[test]
fn test_local_shadows_unit_variable() {
    let fx = build(&unit_module(
        "Alpha",
        vec![var_section(vec![var_decl("Count", "Integer")])],
        vec![routine_impl(
            &["Foo"],
            vec![var_section(vec![var_decl("Count", "string")])],
            vec![caret_in_statement()],
        )],
    ));
    let items = fx.completions();
    let count: Vec<_> = items
        .iter()
        .filter(|s| s.label.eq_ignore_ascii_case("count"))
        .collect();
    assert_eq!(count.len(), 1, "shadowed name must appear once");
    // First-seen wins: the innermost (local) declaration
    assert_eq!(count[0].display.as_str(), "Count: string");
}

#[test]
fn test_cross_unit_interface_symbols_visible() {
    let beta = build_tree(&unit_module(
        "Beta",
        vec![var_section(vec![var_decl("Shared", "Integer")])],
        vec![var_section(vec![var_decl("Hidden", "Integer")])],
    ));
    let mut index = InMemoryUnitIndex::new();
    index.add_unit("Beta", "pas", FileId::new(1), beta);

    let fx = build(&n(
        MODULE,
        vec![
            unit_head("Alpha"),
            ws("\n"),
            n(
                UNIT_IMPLEMENTATION,
                vec![
                    t(IMPLEMENTATION_KW, "implementation"),
                    ws("\n"),
                    uses_clause(&["Beta"]),
                    ws("\n"),
                    routine_impl(&["Foo"], vec![], vec![caret_in_statement()]),
                    ws("\n"),
                ],
            ),
            t(END_KW, "end"),
            t(DOT, "."),
        ],
    ));
    let items = fx.completions_with(&index);
    assert!(has_label(&items, "Shared"));
    // Implementation-section symbols stay private to their unit
    assert!(!has_label(&items, "Hidden"));
    // The unit itself is referenceable by name despite private visibility
    assert!(has_label(&items, "Beta"));

    // Cross-file declarations rank below same-file ones
    let shared = items
        .iter()
        .find(|s| s.label.eq_ignore_ascii_case("shared"))
        .unwrap();
    assert_eq!(shared.tier, PriorityTier::Lower);
}

#[test]
fn test_qualified_path_resolves_unit_members() {
    let beta = build_tree(&unit_module(
        "Beta",
        vec![var_section(vec![var_decl("Shared", "Integer")])],
        vec![var_section(vec![var_decl("Hidden", "Integer")])],
    ));
    let mut index = InMemoryUnitIndex::new();
    index.add_unit("Beta", "pas", FileId::new(1), beta);

    let fx = build(&n(
        MODULE,
        vec![
            unit_head("Alpha"),
            ws("\n"),
            n(
                UNIT_IMPLEMENTATION,
                vec![
                    t(IMPLEMENTATION_KW, "implementation"),
                    ws("\n"),
                    uses_clause(&["Beta"]),
                    ws("\n"),
                    routine_impl(
                        &["Foo"],
                        vec![var_section(vec![var_decl("Local", "Integer")])],
                        vec![n(
                            STATEMENT,
                            vec![n(
                                EXPRESSION,
                                vec![n(
                                    FULLY_QUALIFIED_IDENT,
                                    vec![
                                        n(SUB_IDENT, vec![t(IDENT, "Beta")]),
                                        t(DOT, "."),
                                        caret(&[SUB_IDENT]),
                                    ],
                                )],
                            )],
                        )],
                    ),
                    ws("\n"),
                ],
            ),
            t(END_KW, "end"),
            t(DOT, "."),
        ],
    ));
    let items = fx.completions_with(&index);
    assert!(has_label(&items, "Shared"));
    assert!(!has_label(&items, "Hidden"));
    // Behind a qualifier only the named scope's members apply
    assert!(!has_label(&items, "Local"));
}

#[test]
fn test_method_body_sees_inherited_members() {
    let fx = build(&unit_module(
        "Alpha",
        vec![type_section(vec![
            class_decl("TParent", None, vec![method_decl("Baz")]),
            ws("\n  "),
            class_decl("TChild", Some("TParent"), vec![method_decl("Bar")]),
        ])],
        vec![routine_impl(&["TChild", "Bar"], vec![], vec![caret_in_statement()])],
    ));
    let items = fx.completions();
    assert!(has_label(&items, "Bar"));
    assert!(has_label(&items, "Baz"));
    // Methods come back as routine symbols with their owner label
    let baz = items
        .iter()
        .find(|s| s.label.eq_ignore_ascii_case("baz"))
        .unwrap();
    assert!(matches!(
        baz.source,
        SuggestionSource::Symbol { kind, .. } if kind == delphic::hir::FieldKind::Routine
    ));
    assert_eq!(baz.owner.as_deref(), Some("TParent"));
}

#[test]
fn test_cyclic_inheritance_truncates() {
    let root = build_tree(&unit_module(
        "Alpha",
        vec![type_section(vec![
            class_decl("TA", Some("TB"), vec![]),
            ws("\n  "),
            class_decl("TB", Some("TA"), vec![]),
        ])],
        vec![],
    ));
    let index = InMemoryUnitIndex::new();
    let resolver = Resolver::new(FileId::new(0), &index);
    let module = delphic::hir::ScopeNode::new(root, FileId::new(0)).unwrap();
    let ta = module.find_struct_type("TA").unwrap();
    let chain = resolver.parent_structs(&ta);
    // TB once; the cycle back to TA is cut, nothing loops
    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].name().as_deref(), Some("TB"));
}

#[test]
fn test_missing_unit_contributes_nothing() {
    let mut index = InMemoryUnitIndex::new();
    index.add_unloadable("Ghost", "pas");

    let fx = build(&n(
        MODULE,
        vec![
            unit_head("Alpha"),
            ws("\n"),
            n(
                UNIT_IMPLEMENTATION,
                vec![
                    t(IMPLEMENTATION_KW, "implementation"),
                    ws("\n"),
                    uses_clause(&["Ghost"]),
                    ws("\n"),
                    routine_impl(
                        &["Foo"],
                        vec![var_section(vec![var_decl("Here", "Integer")])],
                        vec![caret_in_statement()],
                    ),
                    ws("\n"),
                ],
            ),
            t(END_KW, "end"),
            t(DOT, "."),
        ],
    ));
    let items = fx.completions_with(&index);
    // The unloadable unit aborts nothing; local resolution still works
    assert!(has_label(&items, "Here"));
}

#[test]
fn test_function_body_has_result_and_self_only_in_methods() {
    // Plain function: Result yes, Self no
    let fx = build(&unit_module(
        "Alpha",
        vec![],
        vec![n(
            ROUTINE_IMPL,
            vec![
                t(FUNCTION_KW, "function"),
                ws(" "),
                named_ident("Calc"),
                t(COLON, ":"),
                ws(" "),
                type_id("Integer"),
                t(SEMICOLON, ";"),
                ws("\n"),
                n(
                    COMPOUND_STATEMENT,
                    vec![
                        t(BEGIN_KW, "begin"),
                        ws("\n  "),
                        caret_in_statement(),
                        ws("\n"),
                        t(END_KW, "end"),
                        t(SEMICOLON, ";"),
                    ],
                ),
            ],
        )],
    ));
    let items = fx.completions();
    assert!(has_label(&items, "Result"));
    assert!(!has_label(&items, "Self"));
}

#[test]
fn test_method_body_has_self() {
    let fx = build(&unit_module(
        "Alpha",
        vec![type_section(vec![class_decl("TBox", None, vec![method_decl("Run")])])],
        vec![routine_impl(&["TBox", "Run"], vec![], vec![caret_in_statement()])],
    ));
    let items = fx.completions();
    assert!(has_label(&items, "Self"));
    let own = items
        .iter()
        .find(|s| s.label.eq_ignore_ascii_case("self"))
        .unwrap();
    assert_eq!(own.display.as_str(), "Self: TBox");
}
