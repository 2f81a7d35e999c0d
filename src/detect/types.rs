//! Core types for detection results.

use serde::{Deserialize, Serialize};

/// Severity levels for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Static description of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDescriptor {
    /// Stable rule id, e.g. `AP_3`.
    pub id: &'static str,
    pub title: &'static str,
    /// Message with positional `{0}`, `{1}` placeholders.
    pub message_format: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub default_severity: Severity,
}

impl RuleDescriptor {
    /// Build a finding for this rule with the default severity.
    pub fn finding(&self, location: Location, arguments: Vec<String>) -> Finding {
        Finding {
            rule_id: self.id.to_string(),
            severity: self.default_severity,
            message: format_message(self.message_format, &arguments),
            arguments,
            location,
            additional_locations: Vec::new(),
        }
    }
}

/// Where a finding points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Location {
    /// Program-level finding.
    None,
    Source {
        file: String,
        line: usize,
        column: usize,
        start_byte: usize,
        end_byte: usize,
    },
}

impl Location {
    pub fn file(&self) -> Option<&str> {
        match self {
            Location::None => None,
            Location::Source { file, .. } => Some(file),
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Location::None => None,
            Location::Source { line, .. } => Some(*line),
        }
    }

    pub fn column(&self) -> Option<usize> {
        match self {
            Location::None => None,
            Location::Source { column, .. } => Some(*column),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Location::None)
    }
}

/// A single detected antipattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    /// Raw message arguments, in placeholder order.
    pub arguments: Vec<String>,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_locations: Vec<Location>,
}

/// A diagnostic about the analysis itself, raised when a detector panics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerFault {
    pub rule_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub message: String,
}

/// A finding silenced by a `#pragma warning disable` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressedFinding {
    pub finding: Finding,
    /// Line of the disabling pragma.
    pub pragma_line: usize,
}

/// Results of one analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub findings: Vec<Finding>,
    /// Findings that were suppressed by pragmas
    #[serde(default)]
    pub suppressed: Vec<SuppressedFinding>,
    #[serde(default)]
    pub faults: Vec<AnalyzerFault>,
    /// Number of syntax trees walked by the node pass
    pub files_analyzed: usize,
    /// The run was cancelled; findings are partial and no completion pass ran
    #[serde(default)]
    pub cancelled: bool,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if there are any error-severity findings.
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    /// Number of suppressed findings.
    pub fn suppressed_count(&self) -> usize {
        self.suppressed.len()
    }

    /// Findings of one rule.
    pub fn findings_for<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a Finding> {
        self.findings.iter().filter(move |f| f.rule_id == rule_id)
    }
}

/// Substitute `{0}`, `{1}`, ... in `format` with `arguments`.
///
/// Placeholders without a matching argument are left as written.
pub fn format_message(format: &str, arguments: &[String]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut rest = format;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            after[..close]
                .parse::<usize>()
                .ok()
                .and_then(|i| arguments.get(i))
                .map(|arg| (arg, close))
        });
        match replaced {
            Some((arg, close)) => {
                out.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        let args = vec!["11".to_string(), "10".to_string()];
        assert_eq!(
            format_message("{0} dependencies found, {1} allowed.", &args),
            "11 dependencies found, 10 allowed."
        );
        assert_eq!(format_message("{2} and {x}", &args), "{2} and {x}");
        assert_eq!(format_message("no placeholders", &args), "no placeholders");
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!("Warning".parse::<Severity>(), Ok(Severity::Warning));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_descriptor_builds_finding() {
        let rule = RuleDescriptor {
            id: "AP_X",
            title: "t",
            message_format: "{0} found",
            description: "d",
            category: "Design",
            default_severity: Severity::Warning,
        };
        let finding = rule.finding(Location::None, vec!["3".into()]);
        assert_eq!(finding.rule_id, "AP_X");
        assert_eq!(finding.message, "3 found");
        assert_eq!(finding.severity, Severity::Warning);
        assert!(finding.location.is_none());
    }
}
