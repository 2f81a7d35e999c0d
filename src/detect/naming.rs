//! Preposition naming: identifiers that join two concepts with `Or`/`And`.

use regex::Regex;

use crate::analysis::NodeKind;

use super::detector::{Detector, NodeContext};
use super::types::{Finding, RuleDescriptor, Severity};

lazy_static::lazy_static! {
    /// A lowercase letter or digit, then `Or`/`And`, then an uppercase letter
    /// or digit. Matched anywhere in the identifier.
    static ref PREPOSITION: Regex = Regex::new(r"[a-z0-9](Or|And)[A-Z0-9]").unwrap();
}

pub const PREPOSITION_NAMING: RuleDescriptor = RuleDescriptor {
    id: "AP_4",
    title: "'And' or 'Or' contained in name.",
    message_format: "'And' or 'Or' contained in name '{0}'.",
    description: "A name joining two concepts with 'And' or 'Or' hints that the \
                  declaration has more than one responsibility.",
    category: "Complexity",
    default_severity: Severity::Warning,
};

/// Whether an identifier joins two words with `Or`/`And`.
pub fn has_preposition(identifier: &str) -> bool {
    PREPOSITION.is_match(identifier)
}

/// Flags methods, classes and interfaces whose name contains a preposition.
#[derive(Debug, Clone, Default)]
pub struct PrepositionNamingDetector;

impl PrepositionNamingDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for PrepositionNamingDetector {
    fn descriptor(&self) -> &RuleDescriptor {
        &PREPOSITION_NAMING
    }

    fn node_kinds(&self) -> &[NodeKind] {
        &[
            NodeKind::MethodDeclaration,
            NodeKind::ClassDeclaration,
            NodeKind::InterfaceDeclaration,
        ]
    }

    fn analyzes_generated_code(&self) -> bool {
        true
    }

    fn check_node(&self, ctx: &NodeContext<'_>) -> Option<Finding> {
        if !self.node_kinds().contains(&ctx.node.kind) {
            return None;
        }

        let name = ctx.node.identifier()?;
        if !has_preposition(name) {
            return None;
        }

        Some(PREPOSITION_NAMING.finding(ctx.location(), vec![name.to_string()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::fixtures::{check, named};

    #[test]
    fn test_has_preposition() {
        assert!(has_preposition("GetOrAdd"));
        assert!(has_preposition("SaveAndExit"));
        assert!(has_preposition("v2Or3"));
        assert!(has_preposition("ReadAndWriteAll"));

        assert!(!has_preposition("Order"));
        assert!(!has_preposition("AndThen"));
        assert!(!has_preposition("Android"));
        assert!(!has_preposition("Coordinator"));
        assert!(!has_preposition("getorAdd"));
        assert!(!has_preposition("GetOR_Add"));
    }

    #[test]
    fn test_compound_names() {
        assert!(has_preposition("GetGeoOrGeoTree"));
        assert!(has_preposition("GetGeoAndGeoTree"));

        assert!(!has_preposition("GetGeoTree"));
        assert!(!has_preposition("GetOrdersAsync"));
        assert!(!has_preposition("GetAnderson"));
    }

    #[test]
    fn test_substring_match_inside_words() {
        assert!(has_preposition("ColdOrMore"));
        assert!(has_preposition("BrandAndModel"));
    }

    #[test]
    fn test_detector_reports_identifier() {
        let detector = PrepositionNamingDetector::new();
        for kind in [
            NodeKind::MethodDeclaration,
            NodeKind::ClassDeclaration,
            NodeKind::InterfaceDeclaration,
        ] {
            let finding = check(&detector, &named(kind, "GetOrAdd")).unwrap();
            assert_eq!(finding.rule_id, "AP_4");
            assert_eq!(finding.arguments, vec!["GetOrAdd"]);
            assert_eq!(finding.message, "'And' or 'Or' contained in name 'GetOrAdd'.");
        }
    }

    #[test]
    fn test_other_kinds_and_clean_names_are_ignored() {
        let detector = PrepositionNamingDetector::new();
        assert!(check(&detector, &named(NodeKind::StructDeclaration, "GetOrAdd")).is_none());
        assert!(check(&detector, &named(NodeKind::MethodDeclaration, "Order")).is_none());
        assert!(check(
            &detector,
            &crate::analysis::SyntaxNode::new(NodeKind::MethodDeclaration, Default::default())
        )
        .is_none());
    }
}
