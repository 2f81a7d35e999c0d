//! High-complexity detection: constructors that inject too many dependencies.

use crate::analysis::NodeKind;

use super::detector::{Detector, NodeContext};
use super::types::{Finding, RuleDescriptor, Severity};

pub const HIGH_COMPLEXITY: RuleDescriptor = RuleDescriptor {
    id: "AP_3",
    title: "Class has high complexity.",
    message_format:
        "Class has high complexity. Too much dependencies injected. {0} dependencies found, {1} allowed.",
    description: "A constructor with many parameters usually means the class has too many \
                  collaborators and more than one responsibility.",
    category: "Complexity",
    default_severity: Severity::Warning,
};

/// Flags constructors with more parameters than allowed.
#[derive(Debug, Clone)]
pub struct HighComplexityDetector {
    max_parameters: usize,
}

impl HighComplexityDetector {
    pub fn new(max_parameters: usize) -> Self {
        Self { max_parameters }
    }
}

impl Default for HighComplexityDetector {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Detector for HighComplexityDetector {
    fn descriptor(&self) -> &RuleDescriptor {
        &HIGH_COMPLEXITY
    }

    fn node_kinds(&self) -> &[NodeKind] {
        &[NodeKind::ConstructorDeclaration]
    }

    fn analyzes_generated_code(&self) -> bool {
        true
    }

    fn check_node(&self, ctx: &NodeContext<'_>) -> Option<Finding> {
        if ctx.node.kind != NodeKind::ConstructorDeclaration {
            return None;
        }

        let count = ctx.node.parameter_count()?;
        if count <= self.max_parameters {
            return None;
        }

        Some(HIGH_COMPLEXITY.finding(
            ctx.location(),
            vec![count.to_string(), self.max_parameters.to_string()],
        ))
    }
}
