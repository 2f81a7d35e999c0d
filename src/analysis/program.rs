//! A parsed and resolved program: the engine's whole input.

use super::semantic::SemanticModel;
use super::syntax::{SyntaxTree, TreeId};

/// Syntax trees plus the semantic model resolved over them.
///
/// Trees keep the order they were added in; each tree's `id` is its index.
#[derive(Debug, Clone, Default)]
pub struct Program {
    trees: Vec<SyntaxTree>,
    semantic: SemanticModel,
}

impl Program {
    /// Build a program from trees and a semantic model.
    ///
    /// Tree ids are reassigned to match their position, so the semantic
    /// model must have been built against the same ordering.
    pub fn new(trees: Vec<SyntaxTree>, semantic: SemanticModel) -> Self {
        let trees = trees
            .into_iter()
            .enumerate()
            .map(|(i, mut tree)| {
                tree.id = TreeId(i as u32);
                tree
            })
            .collect();
        Self { trees, semantic }
    }

    /// A program with syntax only.
    pub fn from_trees(trees: Vec<SyntaxTree>) -> Self {
        Self::new(trees, SemanticModel::empty())
    }

    pub fn trees(&self) -> &[SyntaxTree] {
        &self.trees
    }

    pub fn tree(&self, id: TreeId) -> Option<&SyntaxTree> {
        self.trees.get(id.0 as usize)
    }

    pub fn semantic(&self) -> &SemanticModel {
        &self.semantic
    }

    /// Total end-of-line trivia count across all trees.
    pub fn end_of_line_count(&self) -> usize {
        self.trees.iter().map(|t| t.end_of_line_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::syntax::{NodeKind, Span, SyntaxNode, Trivia};

    #[test]
    fn test_tree_ids_follow_order() {
        let trees = vec![
            SyntaxTree::new("b.cs", SyntaxNode::new(NodeKind::CompilationUnit, Span::default())),
            SyntaxTree::new("a.cs", SyntaxNode::new(NodeKind::CompilationUnit, Span::default())),
        ];
        let program = Program::from_trees(trees);

        assert_eq!(program.trees()[0].id, TreeId(0));
        assert_eq!(program.trees()[1].id, TreeId(1));
        assert_eq!(program.tree(TreeId(1)).unwrap().path, "a.cs");
        assert!(program.tree(TreeId(2)).is_none());
    }

    #[test]
    fn test_end_of_line_count_sums_trees() {
        let root = |n: usize| {
            SyntaxNode::new(NodeKind::CompilationUnit, Span::default()).with_children(vec![
                SyntaxNode::token("x", Span::default())
                    .with_trailing_trivia(vec![Trivia::end_of_line(); n]),
            ])
        };
        let program = Program::from_trees(vec![
            SyntaxTree::new("a.cs", root(3)),
            SyntaxTree::new("b.cs", root(4)),
        ]);
        assert_eq!(program.end_of_line_count(), 7);
    }
}
