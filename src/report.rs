//! Output formatting for apcheck results.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

use colored::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::detect::{
    builtin_rule, AnalysisResult, AnalyzerFault, Finding, Location, Severity, SuppressedFinding,
};

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pretty,
    Json,
    Sarif,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(Format::Pretty),
            "json" => Ok(Format::Json),
            "sarif" => Ok(Format::Sarif),
            _ => Err(format!(
                "invalid format {:?}, must be 'pretty', 'json', or 'sarif'",
                s
            )),
        }
    }
}

/// Whether a result fails the gate: any error-severity finding.
pub fn passed(result: &AnalysisResult) -> bool {
    !result.has_errors()
}

// =============================================================================
// JSON Format
// =============================================================================

#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    pub passed: bool,
    pub files_analyzed: usize,
    pub cancelled: bool,
    pub findings: Vec<JsonFinding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<JsonSuppressedFinding>,
    pub suppressed_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faults: Vec<AnalyzerFault>,
}

#[derive(Serialize, Deserialize)]
pub struct JsonFinding {
    pub rule: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    pub message: String,
    pub arguments: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct JsonSuppressedFinding {
    pub finding: JsonFinding,
    pub pragma_line: usize,
}

/// Build the JSON report. Suppressed findings are listed only when asked for.
pub fn json_report(
    path: &str,
    config_path: Option<&str>,
    result: &AnalysisResult,
    show_suppressed: bool,
) -> JsonReport {
    let suppressed = if show_suppressed {
        result
            .suppressed
            .iter()
            .map(|s| JsonSuppressedFinding {
                finding: finding_to_json(&s.finding),
                pragma_line: s.pragma_line,
            })
            .collect()
    } else {
        Vec::new()
    };

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        config: config_path.map(str::to_string),
        passed: passed(result),
        files_analyzed: result.files_analyzed,
        cancelled: result.cancelled,
        findings: result.findings.iter().map(finding_to_json).collect(),
        suppressed,
        suppressed_count: result.suppressed_count(),
        faults: result.faults.clone(),
    }
}

/// Write results in JSON format.
pub fn write_json(
    path: &str,
    config_path: Option<&str>,
    result: &AnalysisResult,
    show_suppressed: bool,
) -> anyhow::Result<()> {
    let report = json_report(path, config_path, result, show_suppressed);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

fn finding_to_json(f: &Finding) -> JsonFinding {
    JsonFinding {
        rule: f.rule_id.clone(),
        severity: f.severity,
        file: f.location.file().map(str::to_string),
        line: f.location.line(),
        column: f.location.column(),
        message: f.message.clone(),
        arguments: f.arguments.clone(),
    }
}

// =============================================================================
// SARIF Format
// =============================================================================

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const TOOL_NAME: &str = "apcheck";

#[derive(Serialize, Deserialize)]
pub struct SarifReport {
    version: String,
    #[serde(rename = "$schema")]
    schema: String,
    runs: Vec<SarifRun>,
}

#[derive(Serialize, Deserialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize, Deserialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize, Deserialize)]
struct SarifDriver {
    name: String,
    version: String,
    rules: Vec<SarifRule>,
}

#[derive(Serialize, Deserialize)]
struct SarifRule {
    id: String,
    name: String,
    #[serde(rename = "shortDescription")]
    short_description: SarifMessage,
    #[serde(rename = "fullDescription")]
    full_description: SarifMessage,
    #[serde(rename = "defaultConfiguration")]
    default_config: SarifRuleConfig,
}

#[derive(Serialize, Deserialize)]
struct SarifRuleConfig {
    level: String,
}

#[derive(Serialize, Deserialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: String,
    message: SarifMessage,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    locations: Vec<SarifLocation>,
}

#[derive(Serialize, Deserialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize, Deserialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize, Deserialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifact,
    region: SarifRegion,
}

#[derive(Serialize, Deserialize)]
struct SarifArtifact {
    uri: String,
}

#[derive(Serialize, Deserialize)]
struct SarifRegion {
    #[serde(rename = "startLine")]
    start_line: usize,
    #[serde(rename = "startColumn")]
    start_column: usize,
}

fn map_severity_to_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

/// Program-level findings carry no location; SARIF allows results without one.
fn sarif_locations(location: &Location) -> Vec<SarifLocation> {
    match location {
        Location::None => Vec::new(),
        Location::Source {
            file, line, column, ..
        } => vec![SarifLocation {
            physical_location: SarifPhysicalLocation {
                artifact_location: SarifArtifact { uri: file.clone() },
                region: SarifRegion {
                    start_line: (*line).max(1),
                    start_column: (*column).max(1),
                },
            },
        }],
    }
}

pub fn sarif_report(result: &AnalysisResult) -> SarifReport {
    let rule_ids: BTreeSet<&str> = result.findings.iter().map(|f| f.rule_id.as_str()).collect();

    let rules = rule_ids
        .into_iter()
        .filter_map(builtin_rule)
        .map(|rule| SarifRule {
            id: rule.id.to_string(),
            name: rule.title.to_string(),
            short_description: SarifMessage {
                text: rule.title.to_string(),
            },
            full_description: SarifMessage {
                text: rule.description.to_string(),
            },
            default_config: SarifRuleConfig {
                level: map_severity_to_level(rule.default_severity).to_string(),
            },
        })
        .collect();

    let results = result
        .findings
        .iter()
        .map(|f| SarifResult {
            rule_id: f.rule_id.clone(),
            level: map_severity_to_level(f.severity).to_string(),
            message: SarifMessage {
                text: f.message.clone(),
            },
            locations: sarif_locations(&f.location),
        })
        .collect();

    SarifReport {
        version: SARIF_VERSION.to_string(),
        schema: SARIF_SCHEMA.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    rules,
                },
            },
            results,
        }],
    }
}

/// Write results in SARIF format.
pub fn write_sarif(result: &AnalysisResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&sarif_report(result))?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(
    path: &str,
    config_path: Option<&str>,
    result: &AnalysisResult,
    show_suppressed: bool,
) {
    println!();
    print!("  ");
    print!("{}", "apcheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Analyzing: ".dimmed());
    println!("{}", path);
    print!("  {}", "Config:    ".dimmed());
    println!("{}", config_path.unwrap_or("(defaults)"));
    println!();

    write_result_summary(result);
    println!();

    if !result.findings.is_empty() {
        write_findings(&result.findings);
        println!();
    }

    if !result.suppressed.is_empty() {
        write_suppressed_summary(&result.suppressed, show_suppressed);
        println!();
    }

    if !result.faults.is_empty() {
        write_faults(&result.faults);
        println!();
    }
}

fn write_result_summary(result: &AnalysisResult) {
    if passed(result) {
        print!("  {}", "✓ PASS".green());
    } else {
        print!("  {}", "✗ FAIL".red());
    }

    let count = |severity| {
        result
            .findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    };
    print!(
        "  {} files  {} errors  {} warnings  {} info",
        result.files_analyzed,
        count(Severity::Error),
        count(Severity::Warning),
        count(Severity::Info)
    );

    if !result.suppressed.is_empty() {
        print!(
            "  {}",
            format!("({} suppressed)", result.suppressed.len()).dimmed()
        );
    }
    if result.cancelled {
        print!("  {}", "(cancelled)".yellow());
    }

    println!();
}

fn write_location(location: &Location) {
    match location {
        Location::None => print!("{}", "(program)".blue()),
        Location::Source {
            file, line, column, ..
        } => {
            print!("{}", file.blue());
            print!("{}", format!(":{}:{}", line, column).dimmed());
        }
    }
}

fn write_findings(findings: &[Finding]) {
    println!("  {} ({}):", "Findings".bold(), findings.len());
    println!();

    for f in findings {
        write_severity_tag(f.severity);
        print!("   ");
        print!("{:<8}", f.rule_id.dimmed());
        write_location(&f.location);
        println!();

        println!("            {}", f.message);
        println!();
    }
}

fn write_severity_tag(severity: Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
        Severity::Info => print!("    {} ", "INFO ".blue()),
    }
}

fn write_suppressed_summary(suppressed: &[SuppressedFinding], show_details: bool) {
    println!("  {} ({}):", "Suppressed".dimmed(), suppressed.len());

    if !show_details {
        println!("    {}", "(use --show-suppressed to see details)".dimmed());
        return;
    }

    println!();
    for s in suppressed {
        print!("    {:<8}", s.finding.rule_id.dimmed());
        write_location(&s.finding.location);
        println!();
        println!(
            "            {}",
            format!("pragma at line {}", s.pragma_line).dimmed()
        );
    }
}

fn write_faults(faults: &[AnalyzerFault]) {
    println!("  {} ({}):", "Analyzer faults".yellow().bold(), faults.len());
    for fault in faults {
        print!("    {:<8}", fault.rule_id.dimmed());
        if let Some(file) = &fault.file {
            print!("{}  ", file.blue());
        }
        println!("{}", fault.message);
    }
}
