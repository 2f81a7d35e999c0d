//! Command-line interface for apcheck.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::Config;
use crate::detect::{Runner, BUILTIN_RULES};
use crate::parser;
use crate::report::{self, Format};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Antipattern detector for C# code bases.
///
/// apcheck flags microservice and object-oriented antipatterns: nano
/// services, monoliths, constructors with too many injected dependencies,
/// oversized classes and methods, and names joined with "And"/"Or".
#[derive(Parser)]
#[command(name = "apcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze C# sources for antipatterns
    #[command(visible_alias = "check")]
    Lint(LintArgs),
    /// List the built-in rules
    Rules,
    /// Write a default apcheck.yaml
    Init(InitArgs),
}

/// Arguments for the lint command.
#[derive(Parser)]
pub struct LintArgs {
    /// Path to analyze (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover in PATH)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty, json, or sarif
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Parse and analyze files on one thread
    #[arg(long)]
    pub sequential: bool,

    /// Show suppressed findings in output
    #[arg(long)]
    pub show_suppressed: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "apcheck.yaml")]
    pub output: PathBuf,
}

/// Load the explicit config, or the one found next to the analyzed sources,
/// or the defaults.
fn load_config(explicit: Option<&Path>, root: &Path) -> anyhow::Result<(Config, Option<PathBuf>)> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => {
            let dir = if root.is_file() {
                root.parent().unwrap_or(root)
            } else {
                root
            };
            Config::discover(dir)
        }
    };

    match path {
        Some(p) => {
            debug!(config = %p.display(), "loading config");
            let config = Config::parse_file(&p)?;
            Ok((config, Some(p)))
        }
        None => Ok((Config::default(), None)),
    }
}

/// Run the lint command.
pub fn run_lint(args: &LintArgs) -> anyhow::Result<i32> {
    let format = match args.format.parse::<Format>() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if !args.path.exists() {
        eprintln!("Error: cannot access path {:?}", args.path);
        return Ok(EXIT_ERROR);
    }

    let (config, config_path) = match load_config(args.config.as_deref(), &args.path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: invalid config: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let loaded = parser::load_program(&args.path, &config, !args.sequential)?;
    for (path, reason) in &loaded.skipped {
        warn!(path = %path.display(), reason = %reason, "file not analyzed");
    }

    if loaded.program.trees().is_empty() {
        eprintln!("Warning: no C# files to analyze");
    }

    let runner = Runner::from_config(&config).parallel(!args.sequential);
    let result = runner.run(&loaded.program);

    let path_str = args.path.to_string_lossy().to_string();
    let config_str = config_path.map(|p| p.to_string_lossy().to_string());

    match format {
        Format::Json => {
            report::write_json(&path_str, config_str.as_deref(), &result, args.show_suppressed)?
        }
        Format::Sarif => report::write_sarif(&result)?,
        Format::Pretty => report::write_pretty(
            &path_str,
            config_str.as_deref(),
            &result,
            args.show_suppressed,
        ),
    }

    if report::passed(&result) {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the rules command.
pub fn run_rules() -> anyhow::Result<i32> {
    println!("Built-in rules:");
    println!();

    for rule in BUILTIN_RULES {
        println!(
            "  {:<6} {:<8} {:<11} {}",
            rule.id.bold(),
            rule.default_severity.to_string(),
            rule.category.dimmed(),
            rule.title
        );
        println!("         {}", rule.description.dimmed());
    }

    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, Config::default_yaml()) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to tune thresholds and rules", args.output.display());
    println!("  2. Run: apcheck lint . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parses_lint() {
        let cli = Cli::try_parse_from([
            "apcheck",
            "lint",
            "src",
            "--format",
            "json",
            "--sequential",
        ])
        .unwrap();
        match cli.command {
            Commands::Lint(args) => {
                assert_eq!(args.path, PathBuf::from("src"));
                assert_eq!(args.format, "json");
                assert!(args.sequential);
                assert!(!args.show_suppressed);
            }
            _ => panic!("expected lint"),
        }
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("conf/apcheck.yaml");

        let code = run_init(&InitArgs {
            output: output.clone(),
        })
        .unwrap();
        assert_eq!(code, EXIT_SUCCESS);
        assert!(Config::parse_file(&output).is_ok());

        let again = run_init(&InitArgs { output }).unwrap();
        assert_eq!(again, EXIT_ERROR);
    }

    #[test]
    fn test_config_discovery_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let (config, path) = load_config(None, temp.path()).unwrap();
        assert!(path.is_none());
        assert_eq!(config.thresholds.max_class_lines, 600);

        std::fs::write(
            temp.path().join("apcheck.yaml"),
            "thresholds:\n  max_class_lines: 50\n",
        )
        .unwrap();
        let (config, path) = load_config(None, temp.path()).unwrap();
        assert!(path.is_some());
        assert_eq!(config.thresholds.max_class_lines, 50);
    }

    #[test]
    fn test_bad_format_is_usage_error() {
        let temp = TempDir::new().unwrap();
        let args = LintArgs {
            path: temp.path().to_path_buf(),
            config: None,
            format: "xml".to_string(),
            sequential: true,
            show_suppressed: false,
        };
        assert_eq!(run_lint(&args).unwrap(), EXIT_ERROR);
    }
}
