//! Size detection for classes and methods.
//!
//! Size is the number of end-of-line trivia inside the declaration, not the
//! number of physical lines: blank lines count once each, and code sharing a
//! line with the declaration's first or last token adds nothing.

use crate::analysis::NodeKind;

use super::detector::{Detector, NodeContext};
use super::types::{Finding, RuleDescriptor, Severity};

pub const METHOD_SIZE: RuleDescriptor = RuleDescriptor {
    id: "AP_5",
    title: "Too much lines in method.",
    message_format: "Too much lines in method. {0} lines found, {1} allowed.",
    description: "Long methods tend to do more than one thing; split them.",
    category: "Complexity",
    default_severity: Severity::Warning,
};

pub const CLASS_SIZE: RuleDescriptor = RuleDescriptor {
    id: "AP_6",
    title: "Too much lines in class.",
    message_format: "Too much lines in class. {0} lines found, {1} allowed.",
    description: "Large classes usually carry more than one responsibility.",
    category: "Complexity",
    default_severity: Severity::Warning,
};

/// Flags class declarations spanning too many lines.
#[derive(Debug, Clone)]
pub struct ClassSizeDetector {
    max_lines: usize,
}

impl ClassSizeDetector {
    pub fn new(max_lines: usize) -> Self {
        Self { max_lines }
    }
}

impl Default for ClassSizeDetector {
    fn default() -> Self {
        Self::new(600)
    }
}

impl Detector for ClassSizeDetector {
    fn descriptor(&self) -> &RuleDescriptor {
        &CLASS_SIZE
    }

    fn node_kinds(&self) -> &[NodeKind] {
        &[NodeKind::ClassDeclaration]
    }

    fn analyzes_generated_code(&self) -> bool {
        true
    }

    fn check_node(&self, ctx: &NodeContext<'_>) -> Option<Finding> {
        if ctx.node.kind != NodeKind::ClassDeclaration {
            return None;
        }
        oversized(&CLASS_SIZE, ctx, self.max_lines)
    }
}

/// Flags method declarations spanning too many lines. Generated code is
/// skipped.
#[derive(Debug, Clone)]
pub struct MethodSizeDetector {
    max_lines: usize,
}

impl MethodSizeDetector {
    pub fn new(max_lines: usize) -> Self {
        Self { max_lines }
    }
}

impl Default for MethodSizeDetector {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Detector for MethodSizeDetector {
    fn descriptor(&self) -> &RuleDescriptor {
        &METHOD_SIZE
    }

    fn node_kinds(&self) -> &[NodeKind] {
        &[NodeKind::MethodDeclaration]
    }

    fn check_node(&self, ctx: &NodeContext<'_>) -> Option<Finding> {
        if ctx.node.kind != NodeKind::MethodDeclaration {
            return None;
        }
        oversized(&METHOD_SIZE, ctx, self.max_lines)
    }
}

fn oversized(rule: &RuleDescriptor, ctx: &NodeContext<'_>, max_lines: usize) -> Option<Finding> {
    let lines = ctx.node.end_of_line_count();
    if lines <= max_lines {
        return None;
    }
    Some(rule.finding(
        ctx.location(),
        vec![lines.to_string(), max_lines.to_string()],
    ))
}
