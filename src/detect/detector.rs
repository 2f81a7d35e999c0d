//! The detector contract and the contexts handed to detectors.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::analysis::{NodeKind, Program, SemanticModel, SymbolId, SyntaxNode, SyntaxTree};

use super::state::AggregationState;
use super::types::{Finding, Location, RuleDescriptor};

/// One antipattern check.
///
/// A detector can react to syntax nodes (node pass), to the end of the whole
/// compilation (completion pass), or both. Detectors are shared across the
/// rayon pool, so any state they keep must live in the [`AggregationState`].
pub trait Detector: Send + Sync {
    fn descriptor(&self) -> &RuleDescriptor;

    /// Node kinds this detector wants to see in the node pass.
    fn node_kinds(&self) -> &[NodeKind] {
        &[]
    }

    /// Whether nodes inside generated code are passed to this detector.
    fn analyzes_generated_code(&self) -> bool {
        false
    }

    /// Inspect one node. Called concurrently for nodes of different trees.
    fn check_node(&self, _ctx: &NodeContext<'_>) -> Option<Finding> {
        None
    }

    /// Called once after every tree has been walked.
    fn complete(&self, _ctx: &CompilationContext<'_>) -> Option<Finding> {
        None
    }

    fn id(&self) -> &'static str {
        self.descriptor().id
    }
}

/// What a detector sees for a single node.
pub struct NodeContext<'a> {
    pub tree: &'a SyntaxTree,
    pub node: &'a SyntaxNode,
    pub semantic: &'a SemanticModel,
    pub state: &'a AggregationState,
}

impl NodeContext<'_> {
    /// Source location of the node.
    pub fn location(&self) -> Location {
        Location::Source {
            file: self.tree.path.clone(),
            line: self.node.span.start_line,
            column: self.node.span.start_col,
            start_byte: self.node.span.start_byte,
            end_byte: self.node.span.end_byte,
        }
    }

    /// The type declared by this node, if it declares one.
    pub fn declared_symbol(&self) -> Option<SymbolId> {
        self.semantic.declared_symbol(self.tree.id, self.node)
    }
}

/// What a detector sees in the completion pass.
pub struct CompilationContext<'a> {
    pub program: &'a Program,
    pub state: &'a AggregationState,
}

/// Cooperative cancellation flag, checked by the runner before each file.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
