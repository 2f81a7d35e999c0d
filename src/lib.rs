//! apcheck - antipattern detection for C# code bases.
//!
//! apcheck parses C# sources into syntax trees plus a semantic model and runs
//! a set of rules over them, node by node and then once per program. It
//! reports microservice antipatterns (nano services, monoliths) and
//! object-oriented ones (over-injected constructors, oversized classes and
//! methods, names joined with "And"/"Or").
//!
//! # Architecture
//!
//! - `analysis`: syntax trees, semantic model, type hierarchy queries
//! - `parser`: tree-sitter C# front-end and declaration binder
//! - `detect`: detector trait, analysis driver and the built-in rules
//! - `config`: YAML config schema
//! - `report`: output formatting (pretty, JSON, SARIF)
//!
//! # Adding a Rule
//!
//! Implement [`Detector`] and register it with [`Runner::register`], or add
//! it to `builtin_detectors` in `detect/builtin.rs`.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod detect;
pub mod parser;
pub mod report;

pub use analysis::{Program, SemanticModel, SyntaxNode, SyntaxTree};
pub use config::Config;
pub use detect::{AnalysisResult, Detector, Finding, Runner, Severity};
pub use parser::{build_program, load_program, ParsedFile};
