//! Syntax model consumed by detectors.
//!
//! A [`SyntaxTree`] is an immutable tree of [`SyntaxNode`]s. Only leaf tokens
//! carry trivia (whitespace, line breaks, comments, directives), attached the
//! usual way: a token owns the trivia on its own line up to and including the
//! first line break as trailing trivia, everything else before the next token
//! is that token's leading trivia.

use std::fmt;

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    pub fn new(start_byte: usize, end_byte: usize, start_line: usize, start_col: usize) -> Self {
        Self {
            start_byte,
            end_byte,
            start_line,
            start_col,
            end_line: start_line,
            end_col: start_col + end_byte.saturating_sub(start_byte),
        }
    }

    /// Create a span from a tree-sitter node.
    #[cfg(feature = "tree-sitter")]
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Kind of a syntax node.
///
/// Detectors subscribe to node kinds, so this is the key of the driver's
/// dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    CompilationUnit,
    NamespaceDeclaration,
    ClassDeclaration,
    InterfaceDeclaration,
    StructDeclaration,
    RecordDeclaration,
    EnumDeclaration,
    MethodDeclaration,
    ConstructorDeclaration,
    ParameterList,
    Parameter,
    TypeParameterList,
    AttributeList,
    Attribute,
    BaseList,
    Token,
    Other,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::CompilationUnit => "compilation_unit",
            NodeKind::NamespaceDeclaration => "namespace_declaration",
            NodeKind::ClassDeclaration => "class_declaration",
            NodeKind::InterfaceDeclaration => "interface_declaration",
            NodeKind::StructDeclaration => "struct_declaration",
            NodeKind::RecordDeclaration => "record_declaration",
            NodeKind::EnumDeclaration => "enum_declaration",
            NodeKind::MethodDeclaration => "method_declaration",
            NodeKind::ConstructorDeclaration => "constructor_declaration",
            NodeKind::ParameterList => "parameter_list",
            NodeKind::Parameter => "parameter",
            NodeKind::TypeParameterList => "type_parameter_list",
            NodeKind::AttributeList => "attribute_list",
            NodeKind::Attribute => "attribute",
            NodeKind::BaseList => "base_list",
            NodeKind::Token => "token",
            NodeKind::Other => "other",
        }
    }

    /// Whether nodes of this kind declare a named type.
    pub fn is_type_declaration(&self) -> bool {
        matches!(
            self,
            NodeKind::ClassDeclaration
                | NodeKind::InterfaceDeclaration
                | NodeKind::StructDeclaration
                | NodeKind::RecordDeclaration
                | NodeKind::EnumDeclaration
        )
    }

    /// Whether nodes of this kind declare a type member.
    pub fn is_member_declaration(&self) -> bool {
        matches!(
            self,
            NodeKind::MethodDeclaration | NodeKind::ConstructorDeclaration
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of a trivia piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriviaKind {
    Whitespace,
    EndOfLine,
    SingleLineComment,
    MultiLineComment,
    /// `///` comment, including the line break that terminates it.
    DocumentationComment,
    /// Preprocessor directive, including the line break that terminates it.
    Directive,
    /// Source lines of a conditional branch that is not compiled.
    DisabledText,
}

/// Non-token source text attached to a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub text: String,
}

impl Trivia {
    pub fn new(kind: TriviaKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn end_of_line() -> Self {
        Self::new(TriviaKind::EndOfLine, "\n")
    }

    pub fn whitespace(text: impl Into<String>) -> Self {
        Self::new(TriviaKind::Whitespace, text)
    }

    pub fn is_end_of_line(&self) -> bool {
        self.kind == TriviaKind::EndOfLine
    }
}

/// An immutable node of a parsed program.
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub span: Span,
    /// Declared identifier for declarations, token text for tokens, source
    /// text for type references and type parameter lists.
    pub name: Option<String>,
    /// Set on subtrees marked as generated code (e.g. `[GeneratedCode]`).
    pub generated: bool,
    pub leading_trivia: Vec<Trivia>,
    pub trailing_trivia: Vec<Trivia>,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            span,
            name: None,
            generated: false,
            leading_trivia: Vec::new(),
            trailing_trivia: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a leaf token.
    pub fn token(text: impl Into<String>, span: Span) -> Self {
        Self::new(NodeKind::Token, span).with_name(text)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_leading_trivia(mut self, trivia: Vec<Trivia>) -> Self {
        self.leading_trivia = trivia;
        self
    }

    pub fn with_trailing_trivia(mut self, trivia: Vec<Trivia>) -> Self {
        self.trailing_trivia = trivia;
        self
    }

    pub fn mark_generated(mut self) -> Self {
        self.generated = true;
        self
    }

    /// The declared identifier, if this node declares something.
    pub fn identifier(&self) -> Option<&str> {
        match self.kind {
            NodeKind::Token | NodeKind::Other | NodeKind::TypeParameterList => None,
            _ => self.name.as_deref(),
        }
    }

    /// First direct child of the given kind.
    pub fn child(&self, kind: NodeKind) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// Direct children of the given kind.
    pub fn children_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// Number of parameters of a method or constructor declaration.
    ///
    /// Returns None if the node has no parameter list.
    pub fn parameter_count(&self) -> Option<usize> {
        self.child(NodeKind::ParameterList)
            .map(|list| list.children_of_kind(NodeKind::Parameter).count())
    }

    /// Pre-order iterator over this node and all of its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// All trivia inside this node, in document order.
    pub fn descendant_trivia(&self) -> impl Iterator<Item = &Trivia> {
        self.descendants()
            .flat_map(|n| n.leading_trivia.iter().chain(n.trailing_trivia.iter()))
    }

    /// Number of end-of-line trivia tokens inside this node.
    ///
    /// This is the line count used by the size rules: blank lines count once
    /// each and code trailing the last token is not double counted.
    pub fn end_of_line_count(&self) -> usize {
        self.descendant_trivia().filter(|t| t.is_end_of_line()).count()
    }
}

/// Pre-order traversal of a syntax subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Index of a syntax tree inside a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(pub u32);

/// What a `#pragma warning` directive does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PragmaAction {
    Disable,
    Restore,
}

/// A `#pragma warning disable|restore` directive found in a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PragmaDirective {
    /// Line of the directive (1-indexed).
    pub line: usize,
    pub action: PragmaAction,
    /// Rule ids named by the directive; empty means every rule.
    pub rules: Vec<String>,
}

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub id: TreeId,
    pub path: String,
    pub root: SyntaxNode,
    /// Whole file is generated code.
    pub generated: bool,
    pub pragmas: Vec<PragmaDirective>,
}

impl SyntaxTree {
    pub fn new(path: impl Into<String>, root: SyntaxNode) -> Self {
        Self {
            id: TreeId(0),
            path: path.into(),
            root,
            generated: false,
            pragmas: Vec::new(),
        }
    }

    pub fn with_pragmas(mut self, pragmas: Vec<PragmaDirective>) -> Self {
        self.pragmas = pragmas;
        self
    }

    pub fn mark_generated(mut self) -> Self {
        self.generated = true;
        self
    }

    /// Number of end-of-line trivia tokens in the whole file.
    pub fn end_of_line_count(&self) -> usize {
        self.root.end_of_line_count()
    }
}
