//! Nano-service detection: a service exposing too few HTTP endpoints.
//!
//! The node pass counts endpoints per controller class into the shared
//! `endpoints` counter; the completion pass decides once, behind a latch.

use crate::analysis::{KnownType, NodeKind, SyntaxRef};
use crate::config::KnownTypesConfig;

use super::detector::{CompilationContext, Detector, NodeContext};
use super::types::{Finding, Location, RuleDescriptor, Severity};

pub const NANO_SERVICE: RuleDescriptor = RuleDescriptor {
    id: "AP_1",
    title: "Only one API found in the service.",
    message_format: "Too few APIs found in the service. {0} endpoints found, more than {1} expected.",
    description: "Only one API found in the service. Service looks like a nano-service. \
                  Consider merging it with another service.",
    category: "Size",
    default_severity: Severity::Warning,
};

/// Counter holding the endpoint total for the run.
pub const ENDPOINTS_COUNTER: &str = "endpoints";
const FINALIZED_LATCH: &str = "nano_service.finalized";

/// Counts routed controller actions across the program.
#[derive(Debug, Clone)]
pub struct NanoServiceDetector {
    controller: KnownType,
    route_provider: KnownType,
    max_endpoints: u64,
}

impl NanoServiceDetector {
    pub fn new(controller: KnownType, route_provider: KnownType, max_endpoints: u64) -> Self {
        Self {
            controller,
            route_provider,
            max_endpoints,
        }
    }

    pub fn from_known_types(known: &KnownTypesConfig, max_endpoints: u64) -> Self {
        Self::new(
            KnownType::named(known.controller.clone()),
            KnownType::named(known.route_provider.clone()),
            max_endpoints,
        )
    }
}

impl Default for NanoServiceDetector {
    fn default() -> Self {
        Self::from_known_types(&KnownTypesConfig::default(), 1)
    }
}

impl Detector for NanoServiceDetector {
    fn descriptor(&self) -> &RuleDescriptor {
        &NANO_SERVICE
    }

    fn node_kinds(&self) -> &[NodeKind] {
        &[NodeKind::ClassDeclaration]
    }

    fn check_node(&self, ctx: &NodeContext<'_>) -> Option<Finding> {
        if ctx.node.kind != NodeKind::ClassDeclaration {
            return None;
        }

        let id = ctx.declared_symbol()?;
        let symbol = ctx.semantic.symbol(id)?;

        // Partial classes are counted at their first declaration only.
        if symbol.first_declaration() != Some(SyntaxRef::new(ctx.tree.id, ctx.node)) {
            return None;
        }
        if !ctx.semantic.is_subtype_of(Some(id), &self.controller) {
            return None;
        }

        let endpoints = symbol
            .members
            .iter()
            .filter(|m| {
                m.attributes
                    .iter()
                    .any(|a| ctx.semantic.implements(a.class, &self.route_provider))
            })
            .count() as u64;

        if endpoints > 0 {
            ctx.state.add(ENDPOINTS_COUNTER, endpoints);
        }
        None
    }

    fn complete(&self, ctx: &CompilationContext<'_>) -> Option<Finding> {
        if !ctx.state.try_latch(FINALIZED_LATCH) {
            return None;
        }

        let total = ctx.state.get(ENDPOINTS_COUNTER);
        if total > self.max_endpoints {
            return None;
        }

        Some(NANO_SERVICE.finding(
            Location::None,
            vec![total.to_string(), self.max_endpoints.to_string()],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{
        AttributeData, MemberKind, MemberSymbol, Program, SemanticModelBuilder, Span, SyntaxNode,
        SyntaxTree, TreeId, TypeKind,
    };
    use crate::detect::state::AggregationState;
    use rayon::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const CONTROLLER_BASE: &str = "Microsoft.AspNetCore.Mvc.ControllerBase";
    const ROUTE_PROVIDER: &str = "Microsoft.AspNetCore.Mvc.Routing.IRouteTemplateProvider";

    /// One tree per class; each class is a controller with `routed` routed
    /// actions plus one plain helper method.
    fn program(controllers: &[usize], plain: bool) -> Program {
        let mut b = SemanticModelBuilder::new();
        let base = b.add_type(CONTROLLER_BASE, TypeKind::Class);
        let provider = b.add_type(ROUTE_PROVIDER, TypeKind::Interface);
        let http_get = b.add_type("Microsoft.AspNetCore.Mvc.HttpGetAttribute", TypeKind::Class);
        b.add_interface(http_get, provider);
        let obsolete = b.add_type("System.ObsoleteAttribute", TypeKind::Class);

        let mut trees = Vec::new();
        for (i, &routed) in controllers.iter().enumerate() {
            let node = SyntaxNode::new(NodeKind::ClassDeclaration, Span::new(0, 50, 1, 1))
                .with_name(format!("C{}Controller", i));
            let id = b.add_type(&format!("Shop.C{}Controller", i), TypeKind::Class);
            b.set_base(id, base);
            for m in 0..routed {
                b.add_member(
                    id,
                    MemberSymbol::new(format!("Get{}", m), MemberKind::Method)
                        .with_attribute(AttributeData::new("HttpGet", Some(http_get))),
                );
            }
            b.add_member(
                id,
                MemberSymbol::new("Helper", MemberKind::Method)
                    .with_attribute(AttributeData::new("Obsolete", Some(obsolete))),
            );
            b.add_declaration(id, TreeId(i as u32), &node);
            trees.push(SyntaxTree::new(format!("C{}.cs", i), node));
        }

        if plain {
            let node = SyntaxNode::new(NodeKind::ClassDeclaration, Span::new(0, 50, 1, 1))
                .with_name("Helper");
            let id = b.add_type("Shop.Helper", TypeKind::Class);
            b.add_member(
                id,
                MemberSymbol::new("Get", MemberKind::Method)
                    .with_attribute(AttributeData::new("HttpGet", Some(http_get))),
            );
            b.add_declaration(id, TreeId(trees.len() as u32), &node);
            trees.push(SyntaxTree::new("Helper.cs", node));
        }

        Program::new(trees, b.build())
    }

    fn node_pass(detector: &NanoServiceDetector, program: &Program, state: &AggregationState) {
        for tree in program.trees() {
            let ctx = NodeContext {
                tree,
                node: &tree.root,
                semantic: program.semantic(),
                state,
            };
            assert!(detector.check_node(&ctx).is_none());
        }
    }

    fn run(controllers: &[usize], plain: bool) -> (u64, Option<Finding>) {
        let detector = NanoServiceDetector::default();
        let program = program(controllers, plain);
        let state = AggregationState::new();
        node_pass(&detector, &program, &state);
        let finding = detector.complete(&CompilationContext {
            program: &program,
            state: &state,
        });
        (state.get(ENDPOINTS_COUNTER), finding)
    }

    #[test]
    fn test_single_endpoint_is_reported() {
        let (total, finding) = run(&[1], false);
        assert_eq!(total, 1);
        let finding = finding.unwrap();
        assert_eq!(finding.rule_id, "AP_1");
        assert!(finding.location.is_none());
        assert_eq!(finding.arguments, vec!["1", "1"]);
    }

    #[test]
    fn test_no_controllers_is_reported() {
        let (total, finding) = run(&[], false);
        assert_eq!(total, 0);
        assert!(finding.is_some());
    }

    #[test]
    fn test_endpoints_sum_across_controllers() {
        let (total, finding) = run(&[1, 1], false);
        assert_eq!(total, 2);
        assert!(finding.is_none());

        let (total, finding) = run(&[3], false);
        assert_eq!(total, 3);
        assert!(finding.is_none());
    }

    #[test]
    fn test_non_controller_classes_do_not_count() {
        let (total, finding) = run(&[1], true);
        assert_eq!(total, 1);
        assert!(finding.is_some());
    }

    #[test]
    fn test_partial_class_counts_once() {
        let mut b = SemanticModelBuilder::new();
        let base = b.add_type(CONTROLLER_BASE, TypeKind::Class);
        let provider = b.add_type(ROUTE_PROVIDER, TypeKind::Interface);
        let route = b.add_type("Microsoft.AspNetCore.Mvc.RouteAttribute", TypeKind::Class);
        b.add_interface(route, provider);

        let first = SyntaxNode::new(NodeKind::ClassDeclaration, Span::new(0, 40, 1, 1));
        let second = SyntaxNode::new(NodeKind::ClassDeclaration, Span::new(0, 60, 1, 1));
        let id = b.add_type("Shop.OrdersController", TypeKind::Class);
        b.set_base(id, base);
        for name in ["List", "Create"] {
            b.add_member(
                id,
                MemberSymbol::new(name, MemberKind::Method)
                    .with_attribute(AttributeData::new("Route", Some(route))),
            );
        }
        b.add_declaration(id, TreeId(0), &first);
        b.add_declaration(id, TreeId(1), &second);

        let program = Program::new(
            vec![
                SyntaxTree::new("Orders.cs", first),
                SyntaxTree::new("Orders.Part.cs", second),
            ],
            b.build(),
        );
        let state = AggregationState::new();
        node_pass(&NanoServiceDetector::default(), &program, &state);
        assert_eq!(state.get(ENDPOINTS_COUNTER), 2);
    }

    #[test]
    fn test_double_completion_emits_once() {
        let detector = NanoServiceDetector::default();
        let program = program(&[1], false);
        let state = AggregationState::new();
        node_pass(&detector, &program, &state);

        let ctx = CompilationContext {
            program: &program,
            state: &state,
        };
        assert!(detector.complete(&ctx).is_some());
        assert!(detector.complete(&ctx).is_none());
    }

    #[test]
    fn test_repeated_node_pass_finalizes_once() {
        let detector = NanoServiceDetector::from_known_types(&KnownTypesConfig::default(), 5);
        let program = program(&[1], false);
        let state = AggregationState::new();
        node_pass(&detector, &program, &state);
        node_pass(&detector, &program, &state);

        let ctx = CompilationContext {
            program: &program,
            state: &state,
        };
        let emitted: Vec<_> = (0..2).filter_map(|_| detector.complete(&ctx)).collect();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].arguments, vec!["2", "5"]);
    }

    #[test]
    fn test_zero_threshold_flags_only_empty_services() {
        let detector = NanoServiceDetector::from_known_types(&KnownTypesConfig::default(), 0);
        for (controllers, expected) in [(&[][..], true), (&[1][..], false)] {
            let program = program(controllers, false);
            let state = AggregationState::new();
            node_pass(&detector, &program, &state);
            let finding = detector.complete(&CompilationContext {
                program: &program,
                state: &state,
            });
            assert_eq!(finding.is_some(), expected);
        }
    }

    #[test]
    fn test_concurrent_completion_emits_once() {
        let detector = NanoServiceDetector::default();
        let program = program(&[], false);
        let state = AggregationState::new();
        let emitted = AtomicUsize::new(0);

        (0..32).into_par_iter().for_each(|_| {
            let ctx = CompilationContext {
                program: &program,
                state: &state,
            };
            if detector.complete(&ctx).is_some() {
                emitted.fetch_add(1, Ordering::SeqCst);
            }
        });
        assert_eq!(emitted.load(Ordering::SeqCst), 1);
    }
}
