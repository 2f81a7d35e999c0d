//! Program model consumed by the detection engine.
//!
//! This module defines the language-agnostic view of a program that detectors
//! work against:
//! - Syntax trees with typed node kinds and trivia (for line counting)
//! - A semantic model of type symbols, members and attributes
//! - Hierarchy queries (`is_subtype_of`, `implements`) against `KnownType`s
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Source Files    │────▶│ Front-end    │────▶│ Program       │
//! └─────────────────┘     │ (parser)     │     │ (SyntaxTrees, │
//!                         └──────────────┘     │ SemanticModel)│
//!                                              └───────────────┘
//!                                                      │
//!                                                      ▼
//!                                              ┌───────────────┐
//!                                              │ detect::Runner│
//!                                              └───────────────┘
//! ```
//!
//! The engine never parses anything itself; any front-end that can produce a
//! [`Program`] can be plugged in.

mod hierarchy;
mod program;
mod semantic;
mod syntax;

pub use hierarchy::{KnownType, MAX_HIERARCHY_DEPTH};
pub use program::Program;
pub use semantic::{
    AttributeData, MemberKind, MemberSymbol, SemanticModel, SemanticModelBuilder, SpecialType,
    SymbolId, SyntaxRef, TypeKind, TypeSymbol,
};
pub use syntax::{
    Descendants, NodeKind, PragmaAction, PragmaDirective, Span, SyntaxNode, SyntaxTree, TreeId,
    Trivia, TriviaKind,
};
