//! In-source suppression of findings via pragma directives.
//!
//! Supports the usual C# directives:
//! - `#pragma warning disable AP_4, AP_5`
//! - `#pragma warning restore AP_4`
//! - `#pragma warning disable` (every rule)
//!
//! A directive applies from its own line to the next directive that changes
//! the same rule. Program-level findings cannot be suppressed.

use std::collections::HashMap;

use regex::Regex;

use crate::analysis::{PragmaAction, PragmaDirective, SyntaxTree};

use super::types::{Finding, SuppressedFinding};

lazy_static::lazy_static! {
    static ref PRAGMA_WARNING: Regex =
        Regex::new(r"^\s*#\s*pragma\s+warning\s+(disable|restore)\b([^/\r\n]*)").unwrap();
}

/// Parse a single directive line, e.g. the text of a directive trivia.
pub fn parse_pragma(line_number: usize, text: &str) -> Option<PragmaDirective> {
    let caps = PRAGMA_WARNING.captures(text)?;
    let action = match caps.get(1)?.as_str() {
        "disable" => PragmaAction::Disable,
        _ => PragmaAction::Restore,
    };
    let rules = caps
        .get(2)
        .map(|m| {
            m.as_str()
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Some(PragmaDirective {
        line: line_number,
        action,
        rules,
    })
}

/// The disabling directive in effect for `rule_id` at `line`, if any.
fn active_disable<'a>(
    pragmas: &'a [PragmaDirective],
    rule_id: &str,
    line: usize,
) -> Option<&'a PragmaDirective> {
    pragmas
        .iter()
        .filter(|p| p.line <= line)
        .filter(|p| p.rules.is_empty() || p.rules.iter().any(|r| r == rule_id))
        .last()
        .filter(|p| p.action == PragmaAction::Disable)
}

/// Split findings into active and suppressed using the pragmas of each tree.
pub fn filter_suppressed(
    findings: Vec<Finding>,
    trees: &[SyntaxTree],
) -> (Vec<Finding>, Vec<SuppressedFinding>) {
    let by_path: HashMap<&str, &[PragmaDirective]> = trees
        .iter()
        .filter(|t| !t.pragmas.is_empty())
        .map(|t| (t.path.as_str(), t.pragmas.as_slice()))
        .collect();

    if by_path.is_empty() {
        return (findings, Vec::new());
    }

    let mut active = Vec::new();
    let mut suppressed = Vec::new();

    for finding in findings {
        let directive = match (finding.location.file(), finding.location.line()) {
            (Some(file), Some(line)) => by_path
                .get(file)
                .and_then(|pragmas| active_disable(pragmas, &finding.rule_id, line)),
            _ => None,
        };

        match directive {
            Some(pragma) => suppressed.push(SuppressedFinding {
                pragma_line: pragma.line,
                finding,
            }),
            None => active.push(finding),
        }
    }

    (active, suppressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{NodeKind, Span, SyntaxNode};
    use crate::detect::types::{Location, Severity};

    fn finding_at(rule: &str, file: &str, line: usize) -> Finding {
        Finding {
            rule_id: rule.to_string(),
            severity: Severity::Warning,
            message: "m".to_string(),
            arguments: Vec::new(),
            location: Location::Source {
                file: file.to_string(),
                line,
                column: 1,
                start_byte: 0,
                end_byte: 0,
            },
            additional_locations: Vec::new(),
        }
    }

    fn parse_pragmas(content: &str) -> Vec<PragmaDirective> {
        content
            .lines()
            .enumerate()
            .filter_map(|(i, line)| parse_pragma(i + 1, line))
            .collect()
    }

    fn tree_with(content: &str) -> SyntaxTree {
        SyntaxTree::new(
            "Svc.cs",
            SyntaxNode::new(NodeKind::CompilationUnit, Span::default()),
        )
        .with_pragmas(parse_pragmas(content))
    }

    #[test]
    fn test_parse_pragmas() {
        let pragmas = parse_pragmas(
            "using System;\n#pragma warning disable AP_4, AP_5 // naming\nclass A {}\n  #pragma warning restore\n",
        );
        assert_eq!(pragmas.len(), 2);
        assert_eq!(pragmas[0].line, 2);
        assert_eq!(pragmas[0].action, PragmaAction::Disable);
        assert_eq!(pragmas[0].rules, vec!["AP_4", "AP_5"]);
        assert_eq!(pragmas[1].line, 4);
        assert_eq!(pragmas[1].action, PragmaAction::Restore);
        assert!(pragmas[1].rules.is_empty());
    }

    #[test]
    fn test_not_a_warning_pragma() {
        assert!(parse_pragma(1, "#pragma checksum \"a.cs\"").is_none());
        assert!(parse_pragma(1, "// #pragma warning disable AP_4").is_none());
    }

    #[test]
    fn test_suppression_only_in_range() {
        let tree = tree_with(
            "class A {\n#pragma warning disable AP_4\nvoid GetOrAdd() {}\n#pragma warning restore AP_4\nvoid SaveAndExit() {}\n}\n",
        );
        let findings = vec![
            finding_at("AP_4", "Svc.cs", 3),
            finding_at("AP_4", "Svc.cs", 5),
            finding_at("AP_5", "Svc.cs", 3),
        ];

        let (active, suppressed) = filter_suppressed(findings, &[tree]);
        assert_eq!(suppressed.len(), 1);
        assert_eq!(suppressed[0].finding.location.line(), Some(3));
        assert_eq!(suppressed[0].pragma_line, 2);
        assert_eq!(active.len(), 2);
    }

    #[test]
    fn test_blanket_disable_and_other_files() {
        let tree = tree_with("#pragma warning disable\nclass A {}\n");
        let findings = vec![
            finding_at("AP_6", "Svc.cs", 2),
            finding_at("AP_6", "Other.cs", 2),
        ];

        let (active, suppressed) = filter_suppressed(findings, &[tree]);
        assert_eq!(suppressed.len(), 1);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].location.file(), Some("Other.cs"));
    }

    #[test]
    fn test_program_level_findings_are_never_suppressed() {
        let tree = tree_with("#pragma warning disable\n");
        let mut finding = finding_at("AP_2", "Svc.cs", 1);
        finding.location = Location::None;

        let (active, suppressed) = filter_suppressed(vec![finding], &[tree]);
        assert_eq!(active.len(), 1);
        assert!(suppressed.is_empty());
    }
}
