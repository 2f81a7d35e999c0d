//! Detection module: the rule framework and the built-in antipattern rules.

mod builtin;
mod complexity;
mod detector;
#[cfg(test)]
mod fixtures;
mod monolith;
mod nano_service;
mod naming;
mod runner;
mod size;
mod state;
mod suppress;
mod types;

pub use builtin::{builtin_detectors, builtin_rule, BUILTIN_RULES};
pub use complexity::{HighComplexityDetector, HIGH_COMPLEXITY};
pub use detector::{CancellationToken, CompilationContext, Detector, NodeContext};
pub use monolith::{MonolithDetector, MONOLITH};
pub use nano_service::{NanoServiceDetector, ENDPOINTS_COUNTER, NANO_SERVICE};
pub use naming::{has_preposition, PrepositionNamingDetector, PREPOSITION_NAMING};
pub use runner::Runner;
pub use size::{ClassSizeDetector, MethodSizeDetector, CLASS_SIZE, METHOD_SIZE};
pub use state::AggregationState;
pub use suppress::{filter_suppressed, parse_pragma};
pub use types::{
    format_message, AnalysisResult, AnalyzerFault, Finding, Location, RuleDescriptor, Severity,
    SuppressedFinding,
};
