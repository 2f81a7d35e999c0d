//! Tree-sitter C# front-end.
//!
//! Converts a tree-sitter parse of one `.cs` file into a [`SyntaxTree`]:
//! - declaration nodes map to typed [`NodeKind`]s, everything else is `Other`
//! - leaves become tokens; comments and line directives become trivia
//! - trivia is attached the usual way: a token's trailing trivia runs up to
//!   and including the first line break, the rest leads the next token
//! - `///` comments and directives swallow their own line break
//! - `#if` takes its first branch; `#elif`/`#else` branches are disabled
//!   text and never reach the tree
//! - text after the last token trails the compilation unit

use std::collections::HashMap;

use once_cell::sync::OnceCell;
use streaming_iterator::StreamingIterator;
use tracing::debug;
use tree_sitter::{Language, Node, Parser as TsParser, Query, QueryCursor};

use crate::analysis::{NodeKind, PragmaDirective, Span, SyntaxNode, SyntaxTree, Trivia, TriviaKind};
use crate::detect::parse_pragma;

use super::{ParseError, ParsedFile};

/// File name suffixes of generated C# sources (compared lowercased).
const GENERATED_SUFFIXES: &[&str] = &[".designer.cs", ".generated.cs", ".g.cs", ".g.i.cs"];

/// Header markers of generated C# sources.
const GENERATED_MARKERS: &[&str] = &["<auto-generated", "<autogenerated"];

/// Preprocessor directives that do not wrap code and so are plain trivia.
const TRIVIA_DIRECTIVES: &[&str] = &[
    "preproc_pragma",
    "preproc_region",
    "preproc_endregion",
    "preproc_nullable",
    "preproc_define",
    "preproc_undef",
    "preproc_line",
    "preproc_error",
    "preproc_warning",
];

/// Nodes whose whole text is one token (their insides may hold line breaks).
const ATOMIC_KINDS: &[&str] = &[
    "string_literal",
    "verbatim_string_literal",
    "raw_string_literal",
    "interpolated_string_expression",
    "character_literal",
];

/// Non-declaration nodes that keep their source text as name: type
/// references in base lists.
const NAMED_BY_TEXT: &[&str] = &[
    "qualified_name",
    "generic_name",
    "alias_qualified_name",
    "nullable_type",
    "array_type",
];

const USING_QUERY: &str = "(using_directive) @using";

static USINGS: OnceCell<Query> = OnceCell::new();

/// The tree-sitter C# grammar.
pub fn language() -> Language {
    tree_sitter_c_sharp::LANGUAGE.into()
}

/// Parse one source file.
///
/// Syntax errors do not fail the parse; the tree keeps whatever tree-sitter
/// recovered.
pub fn parse_source(path: &str, content: &str) -> Result<ParsedFile, ParseError> {
    let language = language();
    let mut parser = TsParser::new();
    parser.set_language(&language)?;
    let ts_tree = parser
        .parse(content, None)
        .ok_or_else(|| ParseError::NoTree(path.to_string()))?;
    let root = ts_tree.root_node();

    if root.has_error() {
        debug!(path, "syntax errors, continuing with recovered tree");
    }

    let conditionals = Conditionals::scan(content);
    let layout = Layout::scan(root, content, &conditionals);
    let mut converter = Converter {
        source: content,
        trivia: layout.trivia,
        conditionals: &conditionals,
    };

    let mut syntax = converter
        .convert(root)
        .unwrap_or_else(|| SyntaxNode::new(NodeKind::CompilationUnit, Span::from_node(root)));
    syntax.trailing_trivia = layout.end_of_file;

    let generated = is_generated_path(path) || has_generated_header(&syntax);
    let mut tree = SyntaxTree::new(path, syntax).with_pragmas(layout.pragmas);
    if generated {
        tree = tree.mark_generated();
    }

    let usings = using_directives(&language, root, content)?;
    Ok(ParsedFile::new(tree, usings))
}

/// Whether a file name marks generated code.
pub fn is_generated_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    GENERATED_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

/// Whether the comments before the first token carry an auto-generated
/// marker.
fn has_generated_header(root: &SyntaxNode) -> bool {
    let Some(first) = root.descendants().find(|n| n.kind == NodeKind::Token) else {
        return false;
    };
    first
        .leading_trivia
        .iter()
        .filter(|t| {
            matches!(
                t.kind,
                TriviaKind::SingleLineComment
                    | TriviaKind::MultiLineComment
                    | TriviaKind::DocumentationComment
            )
        })
        .any(|t| GENERATED_MARKERS.iter().any(|m| t.text.contains(m)))
}

/// Namespaces imported by `using` directives. Aliases and `using static`
/// import no namespace and are skipped.
fn using_directives(language: &Language, root: Node, content: &str) -> Result<Vec<String>, ParseError> {
    let query = USINGS.get_or_try_init(|| Query::new(language, USING_QUERY))?;
    let source = content.as_bytes();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, root, source);

    let mut usings = Vec::new();
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let text = capture.node.utf8_text(source).unwrap_or("");
            if let Some(ns) = imported_namespace(text) {
                if !usings.contains(&ns) {
                    usings.push(ns);
                }
            }
        }
    }
    Ok(usings)
}

fn imported_namespace(directive: &str) -> Option<String> {
    let rest = directive.trim().trim_end_matches(';').trim();
    let rest = rest.strip_prefix("global").map(str::trim_start).unwrap_or(rest);
    let rest = rest.strip_prefix("using")?.trim_start();
    if rest.starts_with("static ") || rest.contains('=') {
        return None;
    }
    let ns: String = rest.chars().filter(|c| !c.is_whitespace()).collect();
    (!ns.is_empty()).then_some(ns)
}

/// What a tree-sitter node is, as far as trivia goes.
fn island_kind(node: Node, source: &str) -> Option<TriviaKind> {
    match node.kind() {
        "comment" => {
            let text = &source[node.start_byte()..node.end_byte()];
            Some(if text.starts_with("///") && !text.starts_with("////") {
                TriviaKind::DocumentationComment
            } else if text.starts_with("/*") {
                TriviaKind::MultiLineComment
            } else {
                TriviaKind::SingleLineComment
            })
        }
        kind if TRIVIA_DIRECTIVES.contains(&kind) => Some(TriviaKind::Directive),
        _ => None,
    }
}

fn is_token(node: Node) -> bool {
    node.child_count() == 0 || ATOMIC_KINDS.contains(&node.kind())
}

fn map_kind(kind: &str) -> NodeKind {
    match kind {
        "compilation_unit" => NodeKind::CompilationUnit,
        "namespace_declaration" | "file_scoped_namespace_declaration" => {
            NodeKind::NamespaceDeclaration
        }
        "class_declaration" => NodeKind::ClassDeclaration,
        "interface_declaration" => NodeKind::InterfaceDeclaration,
        "struct_declaration" => NodeKind::StructDeclaration,
        "record_declaration" | "record_struct_declaration" => NodeKind::RecordDeclaration,
        "enum_declaration" => NodeKind::EnumDeclaration,
        "method_declaration" => NodeKind::MethodDeclaration,
        "constructor_declaration" => NodeKind::ConstructorDeclaration,
        "parameter_list" => NodeKind::ParameterList,
        "parameter" => NodeKind::Parameter,
        "type_parameter_list" => NodeKind::TypeParameterList,
        "attribute_list" => NodeKind::AttributeList,
        "attribute" => NodeKind::Attribute,
        "base_list" => NodeKind::BaseList,
        _ => NodeKind::Other,
    }
}

/// A conditional compilation directive, by what it does to the branch stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conditional {
    If,
    Else,
    EndIf,
}

fn conditional_directive(line: &str) -> Option<Conditional> {
    let rest = line.trim_start().strip_prefix('#')?.trim_start();
    let word: String = rest.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    match word.as_str() {
        "if" => Some(Conditional::If),
        "elif" | "else" => Some(Conditional::Else),
        "endif" => Some(Conditional::EndIf),
        _ => None,
    }
}

/// Source taken out of the token stream by `#if` blocks.
///
/// No symbols are defined, so the first branch of every `#if` is the
/// compiled one and the rest are disabled text.
struct Conditionals {
    /// Directive lines and disabled runs, in source order.
    ranges: Vec<(usize, usize, TriviaKind)>,
    /// `ranges` with touching neighbours merged.
    covered: Vec<(usize, usize)>,
}

impl Conditionals {
    fn scan(source: &str) -> Self {
        let mut ranges: Vec<(usize, usize, TriviaKind)> = Vec::new();
        // One entry per open `#if`: whether its current branch is compiled.
        let mut branches: Vec<bool> = Vec::new();
        let mut offset = 0;

        for line in source.split_inclusive('\n') {
            let start = offset;
            offset += line.len();

            match conditional_directive(line) {
                Some(directive) => {
                    match directive {
                        Conditional::If => branches.push(true),
                        Conditional::Else => {
                            if let Some(top) = branches.last_mut() {
                                *top = false;
                            }
                        }
                        Conditional::EndIf => {
                            branches.pop();
                        }
                    }
                    ranges.push((start, offset, TriviaKind::Directive));
                }
                None if branches.iter().all(|b| *b) => {}
                None => match ranges.last_mut() {
                    Some((_, end, TriviaKind::DisabledText)) if *end == start => *end = offset,
                    _ => ranges.push((start, offset, TriviaKind::DisabledText)),
                },
            }
        }

        let mut covered: Vec<(usize, usize)> = Vec::new();
        for &(start, end, _) in &ranges {
            match covered.last_mut() {
                Some((_, last)) if *last == start => *last = end,
                _ => covered.push((start, end)),
            }
        }

        Self { ranges, covered }
    }

    /// Whether `start..end` lies inside directive lines or disabled text.
    fn covers(&self, start: usize, end: usize) -> bool {
        let i = self.covered.partition_point(|(s, _)| *s <= start);
        i > 0 && end <= self.covered[i - 1].1
    }
}

/// One piece of the file in document order.
enum Piece {
    Token { start: usize, end: usize },
    Island { start: usize, end: usize, line: usize, kind: TriviaKind },
}

/// Token trivia computed from the gaps between tokens.
struct Layout {
    /// Keyed by token start byte: (leading, trailing).
    trivia: HashMap<usize, (Vec<Trivia>, Vec<Trivia>)>,
    end_of_file: Vec<Trivia>,
    pragmas: Vec<PragmaDirective>,
}

impl Layout {
    fn scan(root: Node, source: &str, conditionals: &Conditionals) -> Self {
        let mut pieces = Vec::new();
        collect_pieces(root, source, conditionals, &mut pieces);
        for &(start, end, kind) in &conditionals.ranges {
            pieces.push(Piece::Island {
                start,
                end,
                line: source[..start].matches('\n').count() + 1,
                kind,
            });
        }
        pieces.sort_by_key(|p| match p {
            Piece::Token { start, .. } | Piece::Island { start, .. } => *start,
        });

        let mut layout = Layout {
            trivia: HashMap::new(),
            end_of_file: Vec::new(),
            pragmas: Vec::new(),
        };
        let mut pending: Vec<Trivia> = Vec::new();
        let mut previous: Option<usize> = None;
        let mut pos = 0;

        for piece in pieces {
            match piece {
                Piece::Island {
                    start,
                    end,
                    line,
                    kind,
                } => {
                    if start < pos {
                        continue;
                    }
                    lex_gap(&source[pos..start], &mut pending);
                    let mut end = end;
                    if matches!(kind, TriviaKind::DocumentationComment | TriviaKind::Directive)
                        && !source[start..end].ends_with('\n')
                    {
                        end += line_break_len(&source[end..]);
                    }
                    let text = &source[start..end];
                    if kind == TriviaKind::Directive {
                        if let Some(pragma) = parse_pragma(line, text) {
                            layout.pragmas.push(pragma);
                        }
                    }
                    pending.push(Trivia::new(kind, text));
                    pos = end;
                }
                Piece::Token { start, end } => {
                    if start < pos {
                        continue;
                    }
                    lex_gap(&source[pos..start], &mut pending);
                    let leading = layout.attach_trailing(previous, std::mem::take(&mut pending));
                    layout.trivia.entry(start).or_default().0 = leading;
                    previous = Some(start);
                    pos = end;
                }
            }
        }

        lex_gap(&source[pos..], &mut pending);
        layout.end_of_file = layout.attach_trailing(previous, pending);
        layout
    }

    /// Give the previous token its trailing share of `pieces` and return the
    /// rest.
    fn attach_trailing(&mut self, previous: Option<usize>, mut pieces: Vec<Trivia>) -> Vec<Trivia> {
        let Some(prev) = previous else {
            return pieces;
        };

        let mut split = 0;
        for (i, trivia) in pieces.iter().enumerate() {
            match trivia.kind {
                TriviaKind::Directive
                | TriviaKind::DocumentationComment
                | TriviaKind::DisabledText => break,
                TriviaKind::EndOfLine => {
                    split = i + 1;
                    break;
                }
                _ => split = i + 1,
            }
        }

        let rest = pieces.split_off(split);
        self.trivia.entry(prev).or_default().1 = pieces;
        rest
    }
}

/// Collect tokens and trivia islands in document order.
fn collect_pieces(node: Node, source: &str, conditionals: &Conditionals, out: &mut Vec<Piece>) {
    if conditionals.covers(node.start_byte(), node.end_byte()) {
        return;
    }

    if let Some(kind) = island_kind(node, source) {
        out.push(Piece::Island {
            start: node.start_byte(),
            end: node.end_byte(),
            line: node.start_position().row + 1,
            kind,
        });
        return;
    }

    if is_token(node) {
        if !node.is_missing() && node.end_byte() > node.start_byte() {
            out.push(Piece::Token {
                start: node.start_byte(),
                end: node.end_byte(),
            });
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_pieces(child, source, conditionals, out);
    }
}

/// Split gap text into whitespace and line-break trivia.
fn lex_gap(text: &str, out: &mut Vec<Trivia>) {
    let mut run_start: Option<usize> = None;
    let mut i = 0;
    let bytes = text.as_bytes();

    while i < bytes.len() {
        let len = line_break_len(&text[i..]);
        if len > 0 {
            if let Some(s) = run_start.take() {
                out.push(Trivia::whitespace(&text[s..i]));
            }
            out.push(Trivia::new(TriviaKind::EndOfLine, &text[i..i + len]));
            i += len;
        } else {
            run_start.get_or_insert(i);
            i += text[i..].chars().next().map(char::len_utf8).unwrap_or(1);
        }
    }

    if let Some(s) = run_start {
        out.push(Trivia::whitespace(&text[s..]));
    }
}

/// Length of the line break at the start of `text`, zero if none.
fn line_break_len(text: &str) -> usize {
    if text.starts_with("\r\n") {
        2
    } else if text.starts_with('\n') || text.starts_with('\r') {
        1
    } else {
        0
    }
}

struct Converter<'s> {
    source: &'s str,
    trivia: HashMap<usize, (Vec<Trivia>, Vec<Trivia>)>,
    conditionals: &'s Conditionals,
}

impl Converter<'_> {
    fn convert(&mut self, node: Node) -> Option<SyntaxNode> {
        if island_kind(node, self.source).is_some()
            || self.conditionals.covers(node.start_byte(), node.end_byte())
        {
            return None;
        }

        let span = Span::from_node(node);

        if is_token(node) {
            if node.is_missing() || node.end_byte() <= node.start_byte() {
                return None;
            }
            let (leading, trailing) = self.trivia.remove(&node.start_byte()).unwrap_or_default();
            return Some(
                SyntaxNode::token(self.text(node), span)
                    .with_leading_trivia(leading)
                    .with_trailing_trivia(trailing),
            );
        }

        let kind = map_kind(node.kind());
        let mut cursor = node.walk();
        let children: Vec<SyntaxNode> = node
            .children(&mut cursor)
            .filter_map(|child| self.convert(child))
            .collect();

        let mut converted = SyntaxNode::new(kind, span).with_children(children);

        let name = match kind {
            NodeKind::TypeParameterList => Some(self.text(node).to_string()),
            NodeKind::Other if NAMED_BY_TEXT.contains(&node.kind()) => {
                Some(self.text(node).to_string())
            }
            NodeKind::Other | NodeKind::Token | NodeKind::CompilationUnit => None,
            _ => node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string()),
        };
        if let Some(name) = name {
            converted = converted.with_name(name);
        }

        if (kind.is_type_declaration() || kind.is_member_declaration()) && has_generated_code_attribute(&converted) {
            converted = converted.mark_generated();
        }

        Some(converted)
    }

    fn text(&self, node: Node) -> &str {
        self.source.get(node.start_byte()..node.end_byte()).unwrap_or("")
    }
}

/// `[GeneratedCode(...)]` in any spelling.
fn has_generated_code_attribute(node: &SyntaxNode) -> bool {
    node.children_of_kind(NodeKind::AttributeList)
        .flat_map(|l| l.children_of_kind(NodeKind::Attribute))
        .filter_map(|a| a.identifier())
        .map(|name| name.rsplit('.').next().unwrap_or(name))
        .any(|name| name == "GeneratedCode" || name == "GeneratedCodeAttribute")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::PragmaAction;

    fn parse(content: &str) -> SyntaxTree {
        parse_source("Test.cs", content).unwrap().tree
    }

    fn first(tree: &SyntaxTree, kind: NodeKind) -> &SyntaxNode {
        tree.root.descendants().find(|n| n.kind == kind).unwrap()
    }

    #[test]
    fn test_declarations_are_mapped() {
        let tree = parse(
            "namespace Shop;\n\npublic class OrderService : IService\n{\n    public OrderService(int a, string b) { }\n    public void GetOrAdd() { }\n}\npublic interface IService { }\n",
        );

        let class = first(&tree, NodeKind::ClassDeclaration);
        assert_eq!(class.identifier(), Some("OrderService"));
        assert!(class.child(NodeKind::BaseList).is_some());

        let ctor = first(&tree, NodeKind::ConstructorDeclaration);
        assert_eq!(ctor.parameter_count(), Some(2));

        let method = first(&tree, NodeKind::MethodDeclaration);
        assert_eq!(method.identifier(), Some("GetOrAdd"));
        assert_eq!(method.parameter_count(), Some(0));

        let iface = first(&tree, NodeKind::InterfaceDeclaration);
        assert_eq!(iface.identifier(), Some("IService"));
        assert_eq!(first(&tree, NodeKind::NamespaceDeclaration).identifier(), Some("Shop"));
    }

    #[test]
    fn test_line_breaks_are_counted_per_declaration() {
        let tree = parse("class A\n{\n    void M()\n    {\n    }\n}\n");

        assert_eq!(first(&tree, NodeKind::MethodDeclaration).end_of_line_count(), 3);
        assert_eq!(first(&tree, NodeKind::ClassDeclaration).end_of_line_count(), 6);
        assert_eq!(tree.end_of_line_count(), 6);
    }

    #[test]
    fn test_comments_do_not_add_lines() {
        let plain = parse("class A\n{\n}\n");
        let commented = parse("class A\n{\n    /* one\n       two */\n}\n");
        assert_eq!(
            commented.end_of_line_count(),
            plain.end_of_line_count() + 1
        );

        let documented = parse("/// <summary>Docs</summary>\nclass A\n{\n}\n");
        assert_eq!(documented.end_of_line_count(), plain.end_of_line_count());
    }

    #[test]
    fn test_conditional_directives_do_not_add_lines() {
        let tree = parse(
            "class A\n{\n    void M()\n    {\n#if DEBUG\n        x++;\n#endif\n    }\n}\n",
        );
        // Signature, both braces and the statement; the directive lines
        // carry their own line breaks.
        assert_eq!(first(&tree, NodeKind::MethodDeclaration).end_of_line_count(), 4);
        assert_eq!(tree.end_of_line_count(), 7);
    }

    #[test]
    fn test_else_branch_is_disabled_text() {
        let tree = parse(
            "class A\n{\n    void M()\n    {\n#if DEBUG\n        x++;\n#else\n        y++;\n        z++;\n#endif\n    }\n}\n",
        );
        let method = first(&tree, NodeKind::MethodDeclaration);
        assert_eq!(method.end_of_line_count(), 4);
        assert!(method.descendants().all(|n| n.name.as_deref() != Some("y")));

        let disabled: Vec<_> = tree
            .root
            .descendants()
            .flat_map(|n| n.leading_trivia.iter())
            .filter(|t| t.kind == TriviaKind::DisabledText)
            .collect();
        assert_eq!(disabled.len(), 1);
        assert_eq!(disabled[0].text, "        y++;\n        z++;\n");
    }

    #[test]
    fn test_disabled_branch_hides_declarations() {
        let tree = parse(
            "class A\n{\n#if NET8_0\n    void Run() { }\n#elif NET6_0\n    void GetOrAdd() { }\n#else\n    void ReadOrWrite() { }\n#endif\n}\n",
        );
        let methods: Vec<_> = tree
            .root
            .descendants()
            .filter(|n| n.kind == NodeKind::MethodDeclaration)
            .filter_map(|n| n.identifier())
            .collect();
        assert_eq!(methods, vec!["Run"]);
        assert_eq!(first(&tree, NodeKind::ClassDeclaration).end_of_line_count(), 4);
    }

    #[test]
    fn test_nested_conditionals() {
        let conditionals = Conditionals::scan(
            "#if A\na\n#if B\nb\n#else\nc\n#endif\n#else\nd\n#if C\ne\n#endif\n#endif\nf\n",
        );
        let disabled: Vec<_> = conditionals
            .ranges
            .iter()
            .filter(|r| r.2 == TriviaKind::DisabledText)
            .map(|r| (r.0, r.1))
            .collect();
        // "c", "d" and "e"; nested directive lines split the last two.
        assert_eq!(disabled, vec![(22, 24), (37, 39), (45, 47)]);
        assert!(conditionals.covers(39, 54));
        assert!(!conditionals.covers(61, 62));
    }

    #[test]
    fn test_grammar_loads_into_parser() {
        let mut parser = TsParser::new();
        parser
            .set_language(&language())
            .expect("C# grammar ABI must be supported by the tree-sitter runtime");
        assert!(parse_source("T.cs", "class A {}").is_ok());
    }

    #[test]
    fn test_text_after_last_token_is_kept() {
        let tree = parse("class A { }\n\n\n");
        assert_eq!(tree.end_of_line_count(), 3);
    }

    #[test]
    fn test_generated_detection() {
        assert!(is_generated_path("Forms/Main.Designer.cs"));
        assert!(is_generated_path("obj/Api.g.cs"));
        assert!(!is_generated_path("Services/Gateway.cs"));

        let header = parse("// <auto-generated>\n// tool output\n// </auto-generated>\nclass A { }\n");
        assert!(header.generated);
        assert!(!parse("// hand written\nclass A { }\n").generated);

        let attributed = parse(
            "class A\n{\n    [System.CodeDom.Compiler.GeneratedCode(\"tool\", \"1.0\")]\n    void M() { }\n}\n",
        );
        assert!(first(&attributed, NodeKind::MethodDeclaration).generated);
        assert!(!first(&attributed, NodeKind::ClassDeclaration).generated);
    }

    #[test]
    fn test_usings_and_pragmas() {
        let parsed = parse_source(
            "Api.cs",
            "using System;\nusing Microsoft.AspNetCore.Mvc;\nusing static System.Math;\nusing Json = System.Text.Json;\n\n#pragma warning disable AP_4\nclass GetOrAdd { }\n#pragma warning restore AP_4\n",
        )
        .unwrap();

        assert_eq!(parsed.usings, vec!["System", "Microsoft.AspNetCore.Mvc"]);
        let pragmas = &parsed.tree.pragmas;
        assert_eq!(pragmas.len(), 2);
        assert_eq!(pragmas[0].line, 6);
        assert_eq!(pragmas[0].action, PragmaAction::Disable);
        assert_eq!(pragmas[1].action, PragmaAction::Restore);
    }

    #[test]
    fn test_imported_namespace() {
        assert_eq!(imported_namespace("using System.Linq;").as_deref(), Some("System.Linq"));
        assert_eq!(imported_namespace("global using Shop.Core;").as_deref(), Some("Shop.Core"));
        assert!(imported_namespace("using static System.Math;").is_none());
        assert!(imported_namespace("using X = System.Text;").is_none());
    }

    #[test]
    fn test_lex_gap() {
        let mut out = Vec::new();
        lex_gap("  \r\n\t\n", &mut out);
        let kinds: Vec<_> = out.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TriviaKind::Whitespace,
                TriviaKind::EndOfLine,
                TriviaKind::Whitespace,
                TriviaKind::EndOfLine
            ]
        );
        assert_eq!(out[1].text, "\r\n");
    }
}
