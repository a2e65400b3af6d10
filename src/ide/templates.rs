//! Insertion templates — expanding an accepted keyword into a skeleton.
//!
//! Each template is a literal skeleton with one caret-rest marker and an
//! optional file-name placeholder. The result of an expansion is a pure
//! [`Expansion`] value; the host applies the edit, moves the caret, and
//! runs the requested reformat after committing the edit. Accepting a
//! block terminator reformats only the smallest enclosing compound/try/
//! repeat construct; anything else asks for a whole-document reformat as
//! a separate undoable step.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use text_size::{TextRange, TextSize};

use crate::syntax::{self, SyntaxKind, SyntaxNode};

/// Caret-rest marker inside a skeleton. Exactly one per template.
const PLACEHOLDER_CARET: &str = "__CARET__";

/// Replaced with the edited file's base name in module-header skeletons.
const PLACEHOLDER_FILENAME: &str = "__FILENAME__";

/// Secondary discriminator for keywords with more than one skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TemplateVariant {
    #[default]
    Default,
    /// Module-level `begin`: the block closes the program (`end.`).
    TopLevel,
    /// `interface` in a type position: heritage skeleton, not a unit section.
    TypeDecl,
}

/// Lookup key: literal keyword text plus variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateKey {
    pub keyword: &'static str,
    pub variant: TemplateVariant,
}

impl TemplateKey {
    pub fn new(keyword: &'static str) -> Self {
        Self {
            keyword,
            variant: TemplateVariant::Default,
        }
    }

    pub fn with_variant(keyword: &'static str, variant: TemplateVariant) -> Self {
        Self { keyword, variant }
    }
}

/// What to reformat after the host commits the inserted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReformatScope {
    /// No reformat needed (routine call parentheses).
    None,
    /// Reformat only this range: the smallest enclosing compound/try/repeat.
    EnclosingBlock(TextRange),
    /// Whole-document reformat, issued as a separate undoable step.
    Document,
}

/// A computed insertion: text, caret rest position relative to the insert
/// point, reformat request, and whether to pop the parameter hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub text: String,
    pub caret_offset: usize,
    pub reformat: ReformatScope,
    pub parameter_hint: bool,
}

/// Keywords whose acceptance closes a block; these reformat the enclosing
/// construct only.
const CLOSING_KEYWORDS: &[&str] = &["end", "except", "until"];

static INSERT_MAP: Lazy<FxHashMap<TemplateKey, &'static str>> = Lazy::new(|| {
    use self::TemplateVariant::{TopLevel, TypeDecl};
    let mut map = FxHashMap::default();
    let mut put = |key: TemplateKey, skeleton: &'static str| {
        map.insert(key, skeleton);
    };

    put(
        TemplateKey::new("unit"),
        " __FILENAME__;\n\ninterface\n\n  __CARET__\nimplementation\n\nend.\n",
    );
    put(
        TemplateKey::new("program"),
        " __FILENAME__;\nbegin\n  __CARET__\nend.\n",
    );
    put(
        TemplateKey::new("library"),
        " __FILENAME__;\n\nexports __CARET__\n\nbegin\n\nend.\n",
    );
    put(
        TemplateKey::new("package"),
        " __FILENAME__;\n\nrequires\n\n contains __CARET__\n\nend.\n",
    );

    put(TemplateKey::new("begin"), "\n__CARET__\nend;\n");
    put(TemplateKey::with_variant("begin", TopLevel), "\n__CARET__\nend.\n");
    put(TemplateKey::new("end"), ";");
    put(TemplateKey::new("interface"), "\n  __CARET__\nimplementation\n");
    put(
        TemplateKey::with_variant("interface", TypeDecl),
        "(IUnknown)\n__CARET__\nend;",
    );
    put(TemplateKey::new("initialization"), "\n  __CARET__\nfinalization\n");
    put(TemplateKey::new("uses"), " __CARET__;");

    put(TemplateKey::new("for"), " __CARET__ to do ;");
    put(TemplateKey::new("while"), " __CARET__ do ;");
    put(TemplateKey::new("repeat"), "\nuntil __CARET__;");
    put(TemplateKey::new("if"), " __CARET__ then ;\n");
    put(TemplateKey::new("case"), " __CARET__ of\nend;");
    put(TemplateKey::new("then"), " __CARET__");
    put(TemplateKey::new("do"), " __CARET__");
    put(TemplateKey::new("with"), " __CARET__ do ;");
    put(TemplateKey::new("try"), "\n  __CARET__\nfinally\nend;");

    put(TemplateKey::new("record"), "  __CARET__\nend;");
    put(TemplateKey::new("object"), "  __CARET__\nend;");
    put(
        TemplateKey::new("class"),
        "(TObject)\nprivate\n__CARET__\npublic\nend;",
    );
    put(TemplateKey::new("array"), "[0..__CARET__] of ;");
    put(TemplateKey::new("set"), " of __CARET__;");

    put(TemplateKey::new("constructor"), " Create(__CARET__);");
    put(TemplateKey::new("destructor"), " Destroy(__CARET__); override;");
    put(TemplateKey::new("function"), " __CARET__(): ;");
    put(TemplateKey::new("procedure"), " __CARET__();");

    put(TemplateKey::new("var"), " __CARET__: ;");
    put(TemplateKey::new("threadvar"), " __CARET__: ;");
    put(TemplateKey::new("const"), " __CARET__ = ;");
    put(TemplateKey::new("resourcestring"), " __CARET__ = '';");
    put(TemplateKey::new("type"), " T__CARET__ = ;");

    put(TemplateKey::new("property"), " __CARET__: read ;");
    put(TemplateKey::new("packed"), " ");
    put(TemplateKey::new("until"), " __CARET__;");
    put(TemplateKey::new("except"), "\n");
    map
});

/// Whether a keyword has an expansion skeleton at all.
pub fn has_template(key: TemplateKey) -> bool {
    INSERT_MAP.contains_key(&key)
}

/// Expand an accepted keyword at `offset` in `tree`.
///
/// `file_name` is the name of the file being edited; its base name (stem)
/// replaces the file-name placeholder in module-header skeletons. Returns
/// None for keywords without a skeleton — the host inserts the bare word.
pub fn expand_keyword(
    key: TemplateKey,
    file_name: &str,
    tree: &SyntaxNode,
    offset: TextSize,
) -> Option<Expansion> {
    let skeleton = INSERT_MAP.get(&key)?;
    let filled = skeleton.replace(PLACEHOLDER_FILENAME, file_stem(file_name));
    let (text, caret_offset) = match filled.find(PLACEHOLDER_CARET) {
        Some(idx) => {
            let mut text = filled;
            text.replace_range(idx..idx + PLACEHOLDER_CARET.len(), "");
            (text, idx)
        }
        None => {
            let caret = filled.len();
            (filled, caret)
        }
    };
    let reformat = if CLOSING_KEYWORDS.contains(&key.keyword) {
        enclosing_block_range(tree, offset)
            .map(ReformatScope::EnclosingBlock)
            .unwrap_or(ReformatScope::Document)
    } else {
        ReformatScope::Document
    };
    Some(Expansion {
        text,
        caret_offset,
        reformat,
        parameter_hint: false,
    })
}

/// Expansion for a routine accepted from the symbol resolver: parentheses
/// with the caret inside when the routine declares parameters, after them
/// otherwise, followed by a parameter-hint trigger.
pub fn expand_routine_call(has_parameters: bool) -> Expansion {
    if has_parameters {
        Expansion {
            text: "()".to_string(),
            caret_offset: 1,
            reformat: ReformatScope::None,
            parameter_hint: true,
        }
    } else {
        Expansion {
            text: "()".to_string(),
            caret_offset: 2,
            reformat: ReformatScope::None,
            parameter_hint: true,
        }
    }
}

/// Range of the smallest compound/try/repeat construct enclosing `offset`.
fn enclosing_block_range(tree: &SyntaxNode, offset: TextSize) -> Option<TextRange> {
    let token = syntax::token_at_offset(tree, offset)?;
    let block = token.parent().and_then(|p| {
        syntax::ancestor_matching(&p, |k| {
            matches!(
                k,
                SyntaxKind::COMPOUND_STATEMENT
                    | SyntaxKind::TRY_STATEMENT
                    | SyntaxKind::REPEAT_STATEMENT
            )
        })
    })?;
    Some(block.text_range())
}

fn file_stem(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(file_name)
}
