//! Syntax kinds for the rowan-based Pascal CST
//!
//! This enum defines all node and token kinds the completion core consumes.
//! The external front end produces trees over exactly this vocabulary; the
//! enum is closed so context classification can match exhaustively.

/// All syntax kinds (tokens and nodes) in Object Pascal
///
/// Tokens are leaf nodes (identifiers, keywords, punctuation).
/// Nodes are composite (modules, sections, statements).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,           // identifier
    INT_NUMBER,      // 42
    REAL_NUMBER,     // 3.14
    STRING_LITERAL,  // 'hello'

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    SEMICOLON,       // ;
    COLON,           // :
    COMMA,           // ,
    DOT,             // .
    RANGE,           // ..
    L_PAREN,         // (
    R_PAREN,         // )
    L_BRACKET,       // [
    R_BRACKET,       // ]
    ASSIGN,          // :=
    EQ,              // =
    NEQ,             // <>
    LT,              // <
    GT,              // >
    LT_EQ,           // <=
    GT_EQ,           // >=
    PLUS,            // +
    MINUS,           // -
    STAR,            // *
    SLASH,           // /
    CARET,           // ^
    AT,              // @
    AMP,             // &

    // =========================================================================
    // KEYWORDS (contiguous: UNIT_KW ..= ASSEMBLER_KW)
    // =========================================================================
    // Module headers and sections
    UNIT_KW,
    PROGRAM_KW,
    LIBRARY_KW,
    PACKAGE_KW,
    USES_KW,
    INTERFACE_KW,
    IMPLEMENTATION_KW,
    INITIALIZATION_KW,
    FINALIZATION_KW,
    EXPORTS_KW,
    REQUIRES_KW,
    CONTAINS_KW,

    // Declarations
    VAR_KW,
    CONST_KW,
    TYPE_KW,
    THREADVAR_KW,
    RESOURCESTRING_KW,
    PROCEDURE_KW,
    FUNCTION_KW,
    CONSTRUCTOR_KW,
    DESTRUCTOR_KW,
    PROPERTY_KW,

    // Type constructors
    CLASS_KW,
    RECORD_KW,
    OBJECT_KW,
    DISPINTERFACE_KW,
    PACKED_KW,
    SET_KW,
    FILE_KW,
    ARRAY_KW,
    HELPER_KW,
    OF_KW,

    // Statements
    BEGIN_KW,
    END_KW,
    IF_KW,
    THEN_KW,
    ELSE_KW,
    CASE_KW,
    FOR_KW,
    TO_KW,
    DOWNTO_KW,
    DO_KW,
    WHILE_KW,
    REPEAT_KW,
    UNTIL_KW,
    WITH_KW,
    TRY_KW,
    EXCEPT_KW,
    FINALLY_KW,
    RAISE_KW,
    INHERITED_KW,
    GOTO_KW,
    BREAK_KW,
    CONTINUE_KW,
    EXIT_KW,

    // Value literals
    NIL_KW,
    TRUE_KW,
    FALSE_KW,
    NOT_KW,

    // Visibility
    PRIVATE_KW,
    PROTECTED_KW,
    PUBLIC_KW,
    PUBLISHED_KW,
    STRICT_KW,

    // Parameter modifiers
    OUT_KW,

    // Routine directives
    VIRTUAL_KW,
    OVERRIDE_KW,
    ABSTRACT_KW,
    DYNAMIC_KW,
    REINTRODUCE_KW,
    OVERLOAD_KW,
    MESSAGE_KW,
    FINAL_KW,
    INLINE_KW,
    CDECL_KW,
    STDCALL_KW,
    REGISTER_KW,
    SAFECALL_KW,
    EXTERNAL_KW,
    FORWARD_KW,
    ASSEMBLER_KW,

    // =========================================================================
    // NODES
    // =========================================================================
    // Module structure
    MODULE,
    UNIT_HEAD,
    PROGRAM_HEAD,
    LIBRARY_HEAD,
    PACKAGE_HEAD,
    USES_CLAUSE,
    REQUIRES_CLAUSE,
    CONTAINS_CLAUSE,
    EXPORTS_SECTION,
    UNIT_INTERFACE,
    UNIT_IMPLEMENTATION,
    UNIT_INIT,
    UNIT_FINAL,

    // Declaration sections
    VAR_SECTION,
    CONST_SECTION,
    TYPE_SECTION,
    VAR_DECL,
    CONST_DECL,
    TYPE_DECL,
    NAMED_IDENT,
    TYPE_ID,

    // Structured types
    CLASS_TYPE,
    RECORD_TYPE,
    OBJECT_TYPE,
    INTERFACE_TYPE,
    CLASS_PARENT,
    VISIBILITY_SECTION,
    CLASS_FIELD,
    CLASS_PROPERTY,
    PROPERTY_SPECIFIER,

    // Routines
    ROUTINE_DECL,
    ROUTINE_IMPL,
    FORMAL_PARAM_LIST,
    FORMAL_PARAM,
    BLOCK_LOCAL,
    BLOCK_GLOBAL,
    COMPOUND_STATEMENT,

    // Statements and expressions
    STATEMENT,
    ASSIGN_PART,
    EXPRESSION,
    CONST_EXPRESSION,
    ARGUMENT_LIST,
    IF_STATEMENT,
    IF_THEN_STATEMENT,
    FOR_STATEMENT,
    WHILE_STATEMENT,
    REPEAT_STATEMENT,
    WITH_STATEMENT,
    CASE_STATEMENT,
    CASE_ITEM,
    CASE_ELSE,
    TRY_STATEMENT,

    // Names
    FULLY_QUALIFIED_IDENT,
    SUB_IDENT,

    // Special
    ERROR,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::WHITESPACE | Self::LINE_COMMENT | Self::BLOCK_COMMENT
        )
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::UNIT_KW as u16) && (self as u16) <= (Self::ASSEMBLER_KW as u16)
    }

    /// Check if this node kind opens an entity scope (owns declarations)
    pub fn is_scope(self) -> bool {
        matches!(
            self,
            Self::MODULE | Self::ROUTINE_DECL | Self::ROUTINE_IMPL
        ) || self.is_struct_type()
    }

    /// Check if this is a structured type node (class/record/object/interface)
    pub fn is_struct_type(self) -> bool {
        matches!(
            self,
            Self::CLASS_TYPE | Self::RECORD_TYPE | Self::OBJECT_TYPE | Self::INTERFACE_TYPE
        )
    }

    /// Check if this node kind is a control statement with a connector
    /// keyword (`then`/`do`/`of`) between its head and its body
    pub fn is_control_statement(self) -> bool {
        matches!(
            self,
            Self::IF_STATEMENT
                | Self::FOR_STATEMENT
                | Self::WHILE_STATEMENT
                | Self::WITH_STATEMENT
                | Self::CASE_STATEMENT
                | Self::CASE_ELSE
        )
    }

    /// The keyword's source text, for keyword kinds only.
    pub fn keyword_text(self) -> Option<&'static str> {
        let text = match self {
            Self::UNIT_KW => "unit",
            Self::PROGRAM_KW => "program",
            Self::LIBRARY_KW => "library",
            Self::PACKAGE_KW => "package",
            Self::USES_KW => "uses",
            Self::INTERFACE_KW => "interface",
            Self::IMPLEMENTATION_KW => "implementation",
            Self::INITIALIZATION_KW => "initialization",
            Self::FINALIZATION_KW => "finalization",
            Self::EXPORTS_KW => "exports",
            Self::REQUIRES_KW => "requires",
            Self::CONTAINS_KW => "contains",
            Self::VAR_KW => "var",
            Self::CONST_KW => "const",
            Self::TYPE_KW => "type",
            Self::THREADVAR_KW => "threadvar",
            Self::RESOURCESTRING_KW => "resourcestring",
            Self::PROCEDURE_KW => "procedure",
            Self::FUNCTION_KW => "function",
            Self::CONSTRUCTOR_KW => "constructor",
            Self::DESTRUCTOR_KW => "destructor",
            Self::PROPERTY_KW => "property",
            Self::CLASS_KW => "class",
            Self::RECORD_KW => "record",
            Self::OBJECT_KW => "object",
            Self::DISPINTERFACE_KW => "dispinterface",
            Self::PACKED_KW => "packed",
            Self::SET_KW => "set",
            Self::FILE_KW => "file",
            Self::ARRAY_KW => "array",
            Self::HELPER_KW => "helper",
            Self::OF_KW => "of",
            Self::BEGIN_KW => "begin",
            Self::END_KW => "end",
            Self::IF_KW => "if",
            Self::THEN_KW => "then",
            Self::ELSE_KW => "else",
            Self::CASE_KW => "case",
            Self::FOR_KW => "for",
            Self::TO_KW => "to",
            Self::DOWNTO_KW => "downto",
            Self::DO_KW => "do",
            Self::WHILE_KW => "while",
            Self::REPEAT_KW => "repeat",
            Self::UNTIL_KW => "until",
            Self::WITH_KW => "with",
            Self::TRY_KW => "try",
            Self::EXCEPT_KW => "except",
            Self::FINALLY_KW => "finally",
            Self::RAISE_KW => "raise",
            Self::INHERITED_KW => "inherited",
            Self::GOTO_KW => "goto",
            Self::BREAK_KW => "break",
            Self::CONTINUE_KW => "continue",
            Self::EXIT_KW => "exit",
            Self::NIL_KW => "nil",
            Self::TRUE_KW => "true",
            Self::FALSE_KW => "false",
            Self::NOT_KW => "not",
            Self::PRIVATE_KW => "private",
            Self::PROTECTED_KW => "protected",
            Self::PUBLIC_KW => "public",
            Self::PUBLISHED_KW => "published",
            Self::STRICT_KW => "strict",
            Self::OUT_KW => "out",
            Self::VIRTUAL_KW => "virtual",
            Self::OVERRIDE_KW => "override",
            Self::ABSTRACT_KW => "abstract",
            Self::DYNAMIC_KW => "dynamic",
            Self::REINTRODUCE_KW => "reintroduce",
            Self::OVERLOAD_KW => "overload",
            Self::MESSAGE_KW => "message",
            Self::FINAL_KW => "final",
            Self::INLINE_KW => "inline",
            Self::CDECL_KW => "cdecl",
            Self::STDCALL_KW => "stdcall",
            Self::REGISTER_KW => "register",
            Self::SAFECALL_KW => "safecall",
            Self::EXTERNAL_KW => "external",
            Self::FORWARD_KW => "forward",
            Self::ASSEMBLER_KW => "assembler",
            _ => return None,
        };
        Some(text)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PascalLanguage {}

impl rowan::Language for PascalLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<PascalLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<PascalLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<PascalLanguage>;
pub type SyntaxNodeChildren = rowan::SyntaxNodeChildren<PascalLanguage>;
