//! Detection runner that orchestrates all detectors over a program.
//!
//! A run has two phases:
//! 1. Node pass: every tree is walked in document order (one rayon task per
//!    tree) and each node is handed to the detectors subscribed to its kind.
//! 2. Completion pass: once every tree is done, each detector's `complete`
//!    hook runs exactly once, in registration order.
//!
//! Every detector call is isolated with `catch_unwind`; a panic becomes an
//! [`AnalyzerFault`] and the rest of the run carries on.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::analysis::{NodeKind, Program, SyntaxNode, SyntaxTree};
use crate::config::Config;

use super::builtin::builtin_detectors;
use super::detector::{CancellationToken, CompilationContext, Detector, NodeContext};
use super::state::AggregationState;
use super::suppress::filter_suppressed;
use super::types::{AnalysisResult, AnalyzerFault, Finding, Severity};

/// Executes registered detectors against a program.
pub struct Runner {
    detectors: Vec<Box<dyn Detector>>,
    parallel: bool,
    include_generated: bool,
    cancellation: Option<CancellationToken>,
    severity_overrides: HashMap<String, Severity>,
}

/// A finding tagged with what the final ordering needs.
struct Tagged {
    tree: usize,
    detector: usize,
    finding: Finding,
}

#[derive(Default)]
struct TreeOutcome {
    findings: Vec<Tagged>,
    faults: Vec<AnalyzerFault>,
    walked: bool,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// Create a runner with no detectors.
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
            parallel: true,
            include_generated: false,
            cancellation: None,
            severity_overrides: HashMap::new(),
        }
    }

    /// Create a runner with every built-in detector the config enables.
    pub fn from_config(config: &Config) -> Self {
        let mut runner = Self::new()
            .include_generated(config.include_generated)
            .severity_overrides(config.severity_overrides());
        for detector in builtin_detectors(config) {
            runner.register(detector);
        }
        runner
    }

    /// Register a detector. Registration order drives completion order and
    /// tie-breaking between findings at the same position.
    pub fn register(&mut self, detector: Box<dyn Detector>) {
        debug!(rule = detector.id(), "registered detector");
        self.detectors.push(detector);
    }

    /// Walk trees on the rayon pool (default) or one after another.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Pass generated code to every detector, whatever it opts into.
    pub fn include_generated(mut self, include: bool) -> Self {
        self.include_generated = include;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Replace the severity of findings per rule id.
    pub fn severity_overrides(mut self, overrides: HashMap<String, Severity>) -> Self {
        self.severity_overrides = overrides;
        self
    }

    pub fn detectors(&self) -> impl Iterator<Item = &dyn Detector> {
        self.detectors.iter().map(|d| d.as_ref())
    }

    /// Run every detector over the program.
    ///
    /// Each run gets fresh aggregation state, so running twice over the same
    /// program yields the same result.
    pub fn run(&self, program: &Program) -> AnalysisResult {
        let state = AggregationState::new();
        let table = self.subscriptions();
        let trees = program.trees();

        debug!(
            trees = trees.len(),
            detectors = self.detectors.len(),
            parallel = self.parallel,
            "starting analysis"
        );

        let outcomes: Vec<TreeOutcome> = if self.parallel {
            trees
                .par_iter()
                .enumerate()
                .map(|(i, tree)| self.walk_tree(i, tree, program, &table, &state))
                .collect()
        } else {
            trees
                .iter()
                .enumerate()
                .map(|(i, tree)| self.walk_tree(i, tree, program, &table, &state))
                .collect()
        };

        let mut result = AnalysisResult::new();
        let mut tagged = Vec::new();
        for outcome in outcomes {
            if outcome.walked {
                result.files_analyzed += 1;
            }
            tagged.extend(outcome.findings);
            result.faults.extend(outcome.faults);
        }

        if self.is_cancelled() {
            warn!(
                files_analyzed = result.files_analyzed,
                "analysis cancelled, skipping completion pass"
            );
            result.cancelled = true;
        } else {
            tagged.extend(self.complete(program, &state, &mut result.faults));
        }

        let mut findings = order_findings(tagged);
        for finding in &mut findings {
            if let Some(severity) = self.severity_overrides.get(&finding.rule_id) {
                finding.severity = *severity;
            }
        }

        let (active, suppressed) = filter_suppressed(findings, trees);
        result.findings = active;
        result.suppressed = suppressed;

        debug!(
            findings = result.findings.len(),
            suppressed = result.suppressed.len(),
            faults = result.faults.len(),
            "analysis finished"
        );
        result
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Node kind to detector indices, in registration order.
    fn subscriptions(&self) -> HashMap<NodeKind, Vec<usize>> {
        let mut table: HashMap<NodeKind, Vec<usize>> = HashMap::new();
        for (i, detector) in self.detectors.iter().enumerate() {
            for kind in detector.node_kinds() {
                let entry = table.entry(*kind).or_default();
                if !entry.contains(&i) {
                    entry.push(i);
                }
            }
        }
        table
    }

    fn walk_tree(
        &self,
        index: usize,
        tree: &SyntaxTree,
        program: &Program,
        table: &HashMap<NodeKind, Vec<usize>>,
        state: &AggregationState,
    ) -> TreeOutcome {
        let mut outcome = TreeOutcome::default();
        if self.is_cancelled() {
            return outcome;
        }
        outcome.walked = true;
        if table.is_empty() {
            return outcome;
        }
        debug!(file = %tree.path, generated = tree.generated, "walking tree");

        // Pre-order with an explicit stack; the flag carries generated-ness
        // down from the tree or any generated ancestor.
        let mut stack: Vec<(&SyntaxNode, bool)> =
            vec![(&tree.root, tree.generated || tree.root.generated)];

        while let Some((node, generated)) = stack.pop() {
            stack.extend(
                node.children
                    .iter()
                    .rev()
                    .map(|c| (c, generated || c.generated)),
            );

            let Some(subscribers) = table.get(&node.kind) else {
                continue;
            };

            let ctx = NodeContext {
                tree,
                node,
                semantic: program.semantic(),
                state,
            };

            for &i in subscribers {
                let detector = &self.detectors[i];
                if generated && !self.include_generated && !detector.analyzes_generated_code() {
                    continue;
                }

                match catch_unwind(AssertUnwindSafe(|| detector.check_node(&ctx))) {
                    Ok(Some(finding)) => outcome.findings.push(Tagged {
                        tree: index,
                        detector: i,
                        finding,
                    }),
                    Ok(None) => {}
                    Err(payload) => {
                        let fault = panic_fault(detector.id(), Some(&tree.path), payload);
                        warn!(rule = %fault.rule_id, file = %tree.path, "detector panicked: {}", fault.message);
                        outcome.faults.push(fault);
                    }
                }
            }
        }

        outcome
    }

    fn complete(
        &self,
        program: &Program,
        state: &AggregationState,
        faults: &mut Vec<AnalyzerFault>,
    ) -> Vec<Tagged> {
        let ctx = CompilationContext { program, state };
        let tree_index: HashMap<&str, usize> = program
            .trees()
            .iter()
            .enumerate()
            .map(|(i, t)| (t.path.as_str(), i))
            .collect();

        let mut tagged = Vec::new();
        for (i, detector) in self.detectors.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| detector.complete(&ctx))) {
                Ok(Some(finding)) => {
                    let tree = finding
                        .location
                        .file()
                        .and_then(|f| tree_index.get(f).copied())
                        .unwrap_or(usize::MAX);
                    tagged.push(Tagged {
                        tree,
                        detector: i,
                        finding,
                    });
                }
                Ok(None) => {}
                Err(payload) => {
                    let fault = panic_fault(detector.id(), None, payload);
                    warn!(rule = %fault.rule_id, "detector panicked in completion: {}", fault.message);
                    faults.push(fault);
                }
            }
        }
        tagged
    }
}

/// Located findings by (tree, line, column, detector); program-level
/// findings after them by detector registration order.
fn order_findings(tagged: Vec<Tagged>) -> Vec<Finding> {
    let (mut located, mut global): (Vec<Tagged>, Vec<Tagged>) =
        tagged.into_iter().partition(|t| !t.finding.location.is_none());

    located.sort_by_key(|t| {
        (
            t.tree,
            t.finding.location.line().unwrap_or(0),
            t.finding.location.column().unwrap_or(0),
            t.detector,
        )
    });
    global.sort_by_key(|t| t.detector);

    located
        .into_iter()
        .chain(global)
        .map(|t| t.finding)
        .collect()
}

fn panic_fault(rule_id: &str, file: Option<&str>, payload: Box<dyn Any + Send>) -> AnalyzerFault {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "detector panicked".to_string()
    };

    AnalyzerFault {
        rule_id: rule_id.to_string(),
        file: file.map(String::from),
        message,
    }
}
