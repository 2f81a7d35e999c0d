//! Monolith detection: the whole program is too big for one microservice.

use rayon::prelude::*;

use super::detector::{CompilationContext, Detector};
use super::types::{Finding, Location, RuleDescriptor, Severity};

pub const MONOLITH: RuleDescriptor = RuleDescriptor {
    id: "AP_2",
    title: "Solution too big. Consider splitting it into many microservices.",
    message_format:
        "Solution too big. Consider splitting it into many microservices. {0} lines found, {1} allowed.",
    description: "A service this large is a monolith in disguise. Consider splitting it into \
                  many microservices.",
    category: "Size",
    default_severity: Severity::Warning,
};

/// Sums line breaks over every tree, generated ones included, at completion.
#[derive(Debug, Clone)]
pub struct MonolithDetector {
    max_total_lines: usize,
}

impl MonolithDetector {
    pub fn new(max_total_lines: usize) -> Self {
        Self { max_total_lines }
    }
}

impl Default for MonolithDetector {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl Detector for MonolithDetector {
    fn descriptor(&self) -> &RuleDescriptor {
        &MONOLITH
    }

    fn complete(&self, ctx: &CompilationContext<'_>) -> Option<Finding> {
        let total: usize = ctx
            .program
            .trees()
            .par_iter()
            .map(|tree| tree.end_of_line_count())
            .sum();

        if total <= self.max_total_lines {
            return None;
        }

        Some(MONOLITH.finding(
            Location::None,
            vec![total.to_string(), self.max_total_lines.to_string()],
        ))
    }
}
