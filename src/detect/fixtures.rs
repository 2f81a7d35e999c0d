//! Syntax builders shared by detector tests.

use crate::analysis::{NodeKind, Program, Span, SyntaxNode, SyntaxTree, Trivia};

use super::detector::{Detector, NodeContext};
use super::state::AggregationState;
use super::types::Finding;

/// Run a detector's node check against a single node in a throwaway tree.
pub fn check(detector: &dyn Detector, node: &SyntaxNode) -> Option<Finding> {
    let program = Program::from_trees(vec![SyntaxTree::new("Test.cs", node.clone())]);
    let state = AggregationState::new();
    let ctx = NodeContext {
        tree: &program.trees()[0],
        node: &program.trees()[0].root,
        semantic: program.semantic(),
        state: &state,
    };
    detector.check_node(&ctx)
}

/// A constructor declaration with `count` parameters.
pub fn constructor(count: usize) -> SyntaxNode {
    let params = (0..count)
        .map(|_| SyntaxNode::new(NodeKind::Parameter, Span::default()))
        .collect();
    SyntaxNode::new(NodeKind::ConstructorDeclaration, Span::new(0, 10, 3, 5))
        .with_name("Service")
        .with_children(vec![
            SyntaxNode::new(NodeKind::ParameterList, Span::default()).with_children(params)
        ])
}

/// A declaration whose body contains exactly `eol` end-of-line trivia.
pub fn sized(kind: NodeKind, name: &str, eol: usize) -> SyntaxNode {
    SyntaxNode::new(kind, Span::new(0, 10, 1, 1))
        .with_name(name)
        .with_children(vec![
            SyntaxNode::token("{", Span::default())
                .with_trailing_trivia(vec![Trivia::end_of_line(); eol]),
            SyntaxNode::token("}", Span::default()),
        ])
}

/// A named declaration with no body.
pub fn named(kind: NodeKind, name: &str) -> SyntaxNode {
    SyntaxNode::new(kind, Span::new(0, 10, 1, 1)).with_name(name)
}
