//! The built-in rule table and detector construction from config.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::config::Config;

use super::complexity::{HighComplexityDetector, HIGH_COMPLEXITY};
use super::detector::Detector;
use super::monolith::{MonolithDetector, MONOLITH};
use super::nano_service::{NanoServiceDetector, NANO_SERVICE};
use super::naming::{PrepositionNamingDetector, PREPOSITION_NAMING};
use super::size::{ClassSizeDetector, MethodSizeDetector, CLASS_SIZE, METHOD_SIZE};
use super::types::RuleDescriptor;

/// Every built-in rule, ordered by id.
pub static BUILTIN_RULES: &[&RuleDescriptor] = &[
    &NANO_SERVICE,
    &MONOLITH,
    &HIGH_COMPLEXITY,
    &PREPOSITION_NAMING,
    &METHOD_SIZE,
    &CLASS_SIZE,
];

static RULES_BY_ID: Lazy<HashMap<&'static str, &'static RuleDescriptor>> =
    Lazy::new(|| BUILTIN_RULES.iter().map(|r| (r.id, *r)).collect());

/// Look up a built-in rule by id.
pub fn builtin_rule(id: &str) -> Option<&'static RuleDescriptor> {
    RULES_BY_ID.get(id).copied()
}

/// Instantiate every enabled built-in detector, in rule-id order.
pub fn builtin_detectors(config: &Config) -> Vec<Box<dyn Detector>> {
    let t = &config.thresholds;
    let all: Vec<Box<dyn Detector>> = vec![
        Box::new(NanoServiceDetector::from_known_types(
            &config.known_types,
            t.max_nano_service_endpoints,
        )),
        Box::new(MonolithDetector::new(t.max_total_lines)),
        Box::new(HighComplexityDetector::new(t.max_constructor_parameters)),
        Box::new(PrepositionNamingDetector::new()),
        Box::new(MethodSizeDetector::new(t.max_method_lines)),
        Box::new(ClassSizeDetector::new(t.max_class_lines)),
    ];

    all.into_iter()
        .filter(|d| config.is_rule_enabled(d.id()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_ids_are_stable() {
        let ids: Vec<_> = BUILTIN_RULES.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["AP_1", "AP_2", "AP_3", "AP_4", "AP_5", "AP_6"]);
        assert_eq!(builtin_rule("AP_4").map(|r| r.id), Some("AP_4"));
        assert!(builtin_rule("AP_7").is_none());
    }

    #[test]
    fn test_disabled_rules_are_not_built() {
        let config = Config::from_yaml("rules:\n  AP_2:\n    enabled: false\n").unwrap();
        let ids: Vec<_> = builtin_detectors(&config).iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["AP_1", "AP_3", "AP_4", "AP_5", "AP_6"]);
    }
}
