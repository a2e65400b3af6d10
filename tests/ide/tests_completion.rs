//! Full-pipeline completion tests: the end-to-end scenarios and the
//! aggregate laws (idempotence, dedup, ranking).

use crate::helpers::*;
use delphic::base::FileId;
use delphic::ide::{PriorityTier, SuggestionSource, TemplateVariant, expand_keyword};
use rstest::rstest;
use delphic::index::InMemoryUnitIndex;
use delphic::syntax::SyntaxKind::*;
use delphic::syntax::TextSize;

/// Cursor right after `begin` inside an empty routine body with one local
/// `x: Integer`: the local and statement keywords apply, declaration
/// keywords do not.
#[test]
fn test_scenario_routine_body() {
    let fx = build(&unit_module(
        "Alpha",
        vec![],
        vec![routine_impl(
            &["Foo"],
            vec![var_section(vec![var_decl("x", "Integer")])],
            vec![caret_in_statement()],
        )],
    ));
    let items = fx.completions();

    assert!(has_label(&items, "x"));
    let x = items
        .iter()
        .find(|s| s.label.eq_ignore_ascii_case("x"))
        .unwrap();
    assert_eq!(x.display.as_str(), "x: Integer");
    assert_eq!(x.kind_text.as_deref(), Some("variable"));

    for kw in ["if", "case", "while", "for"] {
        assert!(has_label(&items, kw), "missing statement keyword {kw}");
    }
    for kw in ["var", "const", "type"] {
        assert!(!has_label(&items, kw), "{kw} must not appear in a body");
    }
}

/// `inherited ` inside an overriding method: only routines reachable via
/// the ancestor chain, never members of unrelated sibling classes.
#[test]
fn test_scenario_inherited_call() {
    let fx = build(&unit_module(
        "Alpha",
        vec![type_section(vec![
            class_decl(
                "TParent",
                None,
                vec![method_decl("Bar"), ws("\n    "), method_decl("Baz")],
            ),
            ws("\n  "),
            class_decl("TSibling", None, vec![method_decl("Qux")]),
            ws("\n  "),
            class_decl("TChild", Some("TParent"), vec![method_decl("Bar")]),
        ])],
        vec![routine_impl(
            &["TChild", "Bar"],
            vec![],
            vec![n(
                STATEMENT,
                vec![
                    t(INHERITED_KW, "inherited"),
                    ws(" "),
                    caret(&[EXPRESSION, FULLY_QUALIFIED_IDENT, SUB_IDENT]),
                ],
            )],
        )],
    ));
    let items = fx.completions();

    assert!(has_label(&items, "Bar"));
    assert!(has_label(&items, "Baz"));
    assert!(!has_label(&items, "Qux"));
    // Inherited-call completion carries routines only
    for item in &items {
        assert!(
            matches!(
                item.source,
                SuggestionSource::Symbol { kind, .. }
                    if kind == delphic::hir::FieldKind::Routine
            ),
            "unexpected non-routine suggestion {}",
            item.label
        );
    }
}

/// Empty file: module headers; accepting `unit` expands to a skeleton with
/// the file base name and the caret inside the interface section.
#[test]
fn test_scenario_new_file() {
    let fx = build(&n(MODULE, vec![caret(&[])]));
    let items = fx.completions();
    for kw in ["unit", "program", "library", "package"] {
        assert!(has_label(&items, kw), "missing {kw}");
    }

    let accepted = items
        .iter()
        .find(|s| s.label.as_str() == "unit")
        .expect("unit keyword offered");
    let key = match &accepted.source {
        SuggestionSource::Keyword { template } => (*template).expect("unit has a template"),
        other => panic!("unit is a keyword, got {other:?}"),
    };
    let expansion = expand_keyword(key, "Vectors.pas", &fx.original, fx.offset).unwrap();
    assert!(expansion.text.starts_with(" Vectors;"));
    assert!(expansion.text.contains("interface"));
    assert!(expansion.text.contains("implementation"));
    assert!(expansion.text.contains("end."));
    let before = &expansion.text[..expansion.caret_offset];
    assert!(before.contains("interface") && !before.contains("implementation"));
}

/// Uses clause of unit A listing B: candidates exclude A and B, include C.
#[test]
fn test_scenario_uses_clause_exclusions() {
    let mut index = InMemoryUnitIndex::new();
    index.add_unloadable("Alpha", "pas");
    index.add_unloadable("Beta", "pas");
    index.add_unloadable("Gamma", "pas");

    let fx = build(&n(
        MODULE,
        vec![
            unit_head("Alpha"),
            ws("\n"),
            n(
                UNIT_INTERFACE,
                vec![
                    t(INTERFACE_KW, "interface"),
                    ws("\n"),
                    n(
                        USES_CLAUSE,
                        vec![
                            t(USES_KW, "uses"),
                            ws(" "),
                            n(
                                FULLY_QUALIFIED_IDENT,
                                vec![n(SUB_IDENT, vec![t(IDENT, "Beta")])],
                            ),
                            t(COMMA, ","),
                            ws(" "),
                            caret(&[FULLY_QUALIFIED_IDENT, SUB_IDENT]),
                            t(SEMICOLON, ";"),
                        ],
                    ),
                    ws("\n"),
                ],
            ),
        ],
    ));
    let items = fx.completions_with(&index);
    assert!(has_label(&items, "Gamma"));
    assert!(!has_label(&items, "Alpha"), "the unit must not import itself");
    assert!(!has_label(&items, "Beta"), "already-listed units are excluded");

    let gamma = items
        .iter()
        .find(|s| s.label.eq_ignore_ascii_case("gamma"))
        .unwrap();
    assert_eq!(gamma.kind_text.as_deref(), Some("pas"));
}

#[test]
fn test_idempotent_classification_and_resolution() {
    let fx = build(&unit_module(
        "Alpha",
        vec![var_section(vec![var_decl("Count", "Integer")])],
        vec![routine_impl(&["Foo"], vec![], vec![caret_in_statement()])],
    ));
    let first = labels(&fx.completions());
    let second = labels(&fx.completions());
    assert_eq!(first, second, "same snapshot, same list, same order");
}

#[test]
fn test_no_case_insensitive_duplicates() {
    let fx = build(&unit_module(
        "Alpha",
        vec![var_section(vec![
            var_decl("Value", "Integer"),
            ws("\n  "),
            var_decl("VALUE", "string"),
        ])],
        vec![routine_impl(&["Foo"], vec![], vec![caret_in_statement()])],
    ));
    let items = fx.completions();
    let mut seen = std::collections::HashSet::new();
    for item in &items {
        assert!(
            seen.insert(item.label.to_ascii_lowercase()),
            "duplicate suggestion {}",
            item.label
        );
    }
}

#[test]
fn test_underscore_names_sink_to_the_bottom() {
    let fx = build(&unit_module(
        "Alpha",
        vec![var_section(vec![
            var_decl("__compiler", "Integer"),
            ws("\n  "),
            var_decl("_internal", "Integer"),
            ws("\n  "),
            var_decl("Visible", "Integer"),
        ])],
        vec![routine_impl(&["Foo"], vec![], vec![caret_in_statement()])],
    ));
    let items = fx.completions();
    let pos = |needle: &str| {
        items
            .iter()
            .position(|s| s.label.eq_ignore_ascii_case(needle))
            .unwrap_or_else(|| panic!("{needle} missing"))
    };
    assert!(pos("Visible") < pos("_internal"));
    assert!(pos("Visible") < pos("__compiler"));
    let underscored = items
        .iter()
        .find(|s| s.label.as_str() == "_internal")
        .unwrap();
    assert_eq!(underscored.tier, PriorityTier::Lowest);
}

#[rstest]
#[case("_internal")]
#[case("__compiler")]
#[case("_Trailing_")]
fn test_underscore_prefix_always_lowest(#[case] name: &str) {
    let fx = build(&unit_module(
        "Alpha",
        vec![var_section(vec![var_decl(name, "Integer")])],
        vec![routine_impl(&["Foo"], vec![], vec![caret_in_statement()])],
    ));
    let items = fx.completions();
    let found = items
        .iter()
        .find(|s| s.label.as_str() == name)
        .unwrap_or_else(|| panic!("{name} missing"));
    assert_eq!(found.tier, PriorityTier::Lowest);
}

#[test]
fn test_goto_is_flagged_deprecated() {
    let fx = build(&unit_module(
        "Alpha",
        vec![],
        vec![routine_impl(&["Foo"], vec![], vec![caret_in_statement()])],
    ));
    let items = fx.completions();
    let goto = items
        .iter()
        .find(|s| s.label.as_str() == "goto")
        .expect("goto offered among statements");
    assert!(goto.deprecated);
    assert!(!items.iter().any(|s| s.label.as_str() == "if" && s.deprecated));
}

#[test]
fn test_routine_suggestion_carries_parameter_info() {
    let fx = build(&unit_module(
        "Alpha",
        vec![n(
            ROUTINE_DECL,
            vec![
                t(PROCEDURE_KW, "procedure"),
                ws(" "),
                named_ident("Render"),
                n(
                    FORMAL_PARAM_LIST,
                    vec![
                        t(L_PAREN, "("),
                        n(
                            FORMAL_PARAM,
                            vec![
                                named_ident("Target"),
                                t(COLON, ":"),
                                ws(" "),
                                type_id("TCanvas"),
                            ],
                        ),
                        t(R_PAREN, ")"),
                    ],
                ),
                t(SEMICOLON, ";"),
            ],
        )],
        vec![routine_impl(&["Foo"], vec![], vec![caret_in_statement()])],
    ));
    let items = fx.completions();
    let render = items
        .iter()
        .find(|s| s.label.eq_ignore_ascii_case("render"))
        .expect("interface routine visible from body");
    assert!(matches!(
        render.source,
        SuggestionSource::Symbol {
            routine_has_params: Some(true),
            ..
        }
    ));
}

#[test]
fn test_module_level_begin_closes_with_a_dot() {
    let fx = build(&n(MODULE, vec![caret(&[])]));
    let items = fx.completions();
    let begin = items.iter().find(|s| s.label.as_str() == "begin").unwrap();
    let key = match &begin.source {
        SuggestionSource::Keyword { template } => (*template).unwrap(),
        _ => unreachable!(),
    };
    assert_eq!(key.variant, TemplateVariant::TopLevel);
    let expansion = expand_keyword(key, "Main.pas", &fx.original, fx.offset).unwrap();
    assert!(expansion.text.contains("end."));
}

#[test]
fn test_virtual_context_ignores_visibility() {
    // Resolve `TBox.` against an anchor scope; strict-private members
    // surface because visibility checks are off for cross-anchor queries.
    let fx = build(&unit_module(
        "Alpha",
        vec![type_section(vec![n(
            TYPE_DECL,
            vec![
                named_ident("TBox"),
                ws(" "),
                t(EQ, "="),
                ws(" "),
                n(
                    CLASS_TYPE,
                    vec![
                        t(CLASS_KW, "class"),
                        ws("\n    "),
                        n(
                            VISIBILITY_SECTION,
                            vec![
                                t(STRICT_KW, "strict"),
                                ws(" "),
                                t(PRIVATE_KW, "private"),
                                ws("\n      "),
                                n(
                                    CLASS_FIELD,
                                    vec![
                                        named_ident("FData"),
                                        t(COLON, ":"),
                                        ws(" "),
                                        type_id("Integer"),
                                        t(SEMICOLON, ";"),
                                    ],
                                ),
                            ],
                        ),
                        ws("\n  "),
                        t(END_KW, "end"),
                    ],
                ),
                t(SEMICOLON, ";"),
            ],
        )]),
        var_section(vec![var_decl("Probe", "Integer")])],
        vec![routine_impl(&["Foo"], vec![], vec![caret_in_statement()])],
    ));

    let index = InMemoryUnitIndex::new();
    let items = delphic::ide::completions(&delphic::ide::CompletionRequest {
        file: FileId::new(0),
        file_name: "Alpha.pas",
        offset: TextSize::from(0),
        original: &fx.original,
        speculative: &fx.speculative,
        source: &fx.source,
        index: &index,
        virtual_context: Some(delphic::ide::VirtualContext {
            anchor: &fx.original,
            anchor_file: FileId::new(0),
            path: "TBox.",
        }),
    });
    assert!(has_label(&items, "FData"));
}
