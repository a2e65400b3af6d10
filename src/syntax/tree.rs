//! Tree construction and navigation over the Pascal CST.
//!
//! The parser lives outside this crate; it hands trees over through
//! [`TreeBuilder`], a thin wrapper around rowan's green-node builder that
//! fixes the kind vocabulary to [`SyntaxKind`]. Everything else here is
//! read-only navigation used by the classifier and resolver: deepest token
//! at an offset, trivia-skipping sibling/leaf walks, ancestor searches.

use rowan::GreenNodeBuilder;
use text_size::TextSize;

use super::kind::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

/// Placeholder identifier the host inserts at the caret before the
/// speculative reparse, so the tree around the cursor is as well-formed as
/// possible. Resolution strips it from qualified paths.
pub const DUMMY_IDENT: &str = "__dummy_ident__";

/// Builder for handing a parsed tree to the completion core.
///
/// Call sequence mirrors rowan: `start_node`/`token`/`finish_node` pairs,
/// then [`TreeBuilder::finish`] for the root [`SyntaxNode`].
pub struct TreeBuilder {
    inner: GreenNodeBuilder<'static>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            inner: GreenNodeBuilder::new(),
        }
    }

    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.inner.start_node(kind.into());
    }

    pub fn token(&mut self, kind: SyntaxKind, text: &str) {
        self.inner.token(kind.into(), text);
    }

    pub fn finish_node(&mut self) {
        self.inner.finish_node();
    }

    pub fn finish(self) -> SyntaxNode {
        SyntaxNode::new_root(self.inner.finish())
    }
}

/// The four Pascal module flavors. Each has a different fixed set of
/// sections that may follow its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    Unit,
    Program,
    Library,
    Package,
}

/// Deepest token at `offset`, preferring a non-trivia token when the offset
/// sits on a boundary. Falls back to the last token at end of file.
pub fn token_at_offset(root: &SyntaxNode, offset: TextSize) -> Option<SyntaxToken> {
    if offset >= root.text_range().end() {
        return root.last_token();
    }
    match root.token_at_offset(offset) {
        rowan::TokenAtOffset::None => None,
        rowan::TokenAtOffset::Single(t) => Some(t),
        rowan::TokenAtOffset::Between(left, right) => {
            if !right.kind().is_trivia() {
                Some(right)
            } else if !left.kind().is_trivia() {
                Some(left)
            } else {
                Some(right)
            }
        }
    }
}

/// Previous sibling element, skipping whitespace and comments.
pub fn prev_non_trivia_sibling(element: &SyntaxElement) -> Option<SyntaxElement> {
    let mut current = prev_sibling_or_token(element);
    while let Some(el) = current {
        if !el.kind().is_trivia() {
            return Some(el);
        }
        current = prev_sibling_or_token(&el);
    }
    None
}

fn prev_sibling_or_token(element: &SyntaxElement) -> Option<SyntaxElement> {
    match element {
        SyntaxElement::Node(n) => n.prev_sibling_or_token(),
        SyntaxElement::Token(t) => t.prev_sibling_or_token(),
    }
}

/// Previous leaf in document order, skipping trivia and error markers.
pub fn prev_leaf_non_trivia(token: &SyntaxToken) -> Option<SyntaxToken> {
    let mut current = token.prev_token();
    while let Some(t) = current {
        if !t.kind().is_trivia() && t.kind() != SyntaxKind::ERROR {
            return Some(t);
        }
        current = t.prev_token();
    }
    None
}

/// First leaf token under `node` in document order.
pub fn deepest_first(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.first_token()
}

/// First non-trivia leaf token under `node`.
pub fn first_leaf_non_trivia(node: &SyntaxNode) -> Option<SyntaxToken> {
    let first = node.first_token()?;
    if !first.kind().is_trivia() {
        return Some(first);
    }
    let mut current = first.next_token();
    while let Some(t) = current {
        if t.text_range().end() > node.text_range().end() {
            return None;
        }
        if !t.kind().is_trivia() {
            return Some(t);
        }
        current = t.next_token();
    }
    None
}

/// Nearest ancestor (or self) whose kind satisfies `pred`.
pub fn ancestor_matching(
    node: &SyntaxNode,
    pred: impl Fn(SyntaxKind) -> bool,
) -> Option<SyntaxNode> {
    node.ancestors().find(|n| pred(n.kind()))
}

/// Nearest strict ancestor whose kind satisfies `pred`.
pub fn parent_matching(
    node: &SyntaxNode,
    pred: impl Fn(SyntaxKind) -> bool,
) -> Option<SyntaxNode> {
    node.ancestors().skip(1).find(|n| pred(n.kind()))
}

/// First descendant node of the given kind, depth-first.
pub fn find_descendant(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxNode> {
    node.descendants().find(|n| n.kind() == kind)
}

/// Direct child node of the given kind.
pub fn child_of_kind(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxNode> {
    node.children().find(|n| n.kind() == kind)
}

/// Direct child token of the given kind.
pub fn child_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|el| el.into_token())
        .find(|t| t.kind() == kind)
}

const NAME_PARTS: &[SyntaxKind] = &[
    SyntaxKind::SUB_IDENT,
    SyntaxKind::FULLY_QUALIFIED_IDENT,
    SyntaxKind::NAMED_IDENT,
    SyntaxKind::EXPRESSION,
];

/// Climb out of identifier/expression wrappers to the node that carries
/// positional meaning: a statement, assign part, argument list, type id,
/// section, or the module itself.
pub fn skip_to_expression_parent(element: &SyntaxElement) -> Option<SyntaxNode> {
    let start = match element {
        SyntaxElement::Node(n) => n.clone(),
        SyntaxElement::Token(t) => t.parent()?,
    };
    start.ancestors().find(|n| !NAME_PARTS.contains(&n.kind()))
}

/// The innermost EXPRESSION node containing `element`, if any.
pub fn enclosing_expression(element: &SyntaxElement) -> Option<SyntaxNode> {
    let start = match element {
        SyntaxElement::Node(n) => Some(n.clone()),
        SyntaxElement::Token(t) => t.parent(),
    }?;
    start
        .ancestors()
        .find(|n| n.kind() == SyntaxKind::EXPRESSION)
}

/// Enclosing MODULE node (or self).
pub fn module_of(node: &SyntaxNode) -> Option<SyntaxNode> {
    ancestor_matching(node, |k| k == SyntaxKind::MODULE)
}

/// Module flavor, derived from the header child.
pub fn module_kind(module: &SyntaxNode) -> Option<ModuleKind> {
    module.children().find_map(|child| match child.kind() {
        SyntaxKind::UNIT_HEAD => Some(ModuleKind::Unit),
        SyntaxKind::PROGRAM_HEAD => Some(ModuleKind::Program),
        SyntaxKind::LIBRARY_HEAD => Some(ModuleKind::Library),
        SyntaxKind::PACKAGE_HEAD => Some(ModuleKind::Package),
        _ => None,
    })
}

/// Module name from its header, stripped of the dummy identifier.
pub fn module_name(module: &SyntaxNode) -> Option<String> {
    let head = module.children().find(|c| {
        matches!(
            c.kind(),
            SyntaxKind::UNIT_HEAD
                | SyntaxKind::PROGRAM_HEAD
                | SyntaxKind::LIBRARY_HEAD
                | SyntaxKind::PACKAGE_HEAD
        )
    })?;
    let ident = head
        .descendants_with_tokens()
        .filter_map(|el| el.into_token())
        .find(|t| t.kind() == SyntaxKind::IDENT)?;
    Some(ident.text().to_string())
}

/// Whether the character run between the last newline and `offset` is all
/// whitespace. Structured-type member keywords are only offered at such
/// positions, to avoid corrupting mid-line edits.
pub fn is_first_on_line(source: &str, offset: TextSize) -> bool {
    let offset = usize::from(offset).min(source.len());
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    source[line_start..offset].chars().all(char::is_whitespace)
}
