//! C# front-end: turns source files into the engine's [`Program`].
//!
//! This module provides:
//! - `csharp`: tree-sitter based conversion of one file into a `SyntaxTree`
//! - `binder`: declaration binding across files into a `SemanticModel`
//! - `catalog`: framework types known without reference assemblies
//! - [`load_program`]: directory walk, parallel parsing and binding
//! - [`parse_csharp`]: one in-memory file, parsed and bound

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::analysis::{Program, SyntaxTree};
use crate::config::Config;

pub mod binder;
pub mod catalog;

#[cfg(feature = "tree-sitter")]
pub mod csharp;

/// File extension handled by the front-end.
pub const SOURCE_EXTENSION: &str = "cs";

/// Errors raised while reading or parsing a single source file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "tree-sitter")]
    #[error("failed to load the C# grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[cfg(feature = "tree-sitter")]
    #[error("invalid tree-sitter query: {0}")]
    Query(#[from] tree_sitter::QueryError),

    #[error("parser produced no tree for {0}")]
    NoTree(String),
}

/// One parsed source file: its syntax tree plus what the binder needs that
/// the tree does not carry.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub tree: SyntaxTree,
    /// Namespaces imported with `using` directives (aliases excluded).
    pub usings: Vec<String>,
}

impl ParsedFile {
    pub fn new(tree: SyntaxTree, usings: Vec<String>) -> Self {
        Self { tree, usings }
    }
}

/// A loaded program plus what was left out of it.
#[derive(Debug)]
pub struct LoadedProgram {
    pub program: Program,
    /// Files that could not be read or parsed, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

/// Bind parsed files into a program. File order is preserved.
pub fn build_program(files: Vec<ParsedFile>) -> Program {
    let semantic = binder::bind(&files);
    let trees = files.into_iter().map(|f| f.tree).collect();
    Program::new(trees, semantic)
}

/// Parse and bind a single in-memory source file.
#[cfg(feature = "tree-sitter")]
pub fn parse_csharp(path: &str, content: &str) -> Result<Program, ParseError> {
    let file = csharp::parse_source(path, content)?;
    Ok(build_program(vec![file]))
}

/// Find every C# source file under `root`, honoring the config excludes.
///
/// Paths are returned sorted so that runs are reproducible.
pub fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let excludes = config.exclude_matcher()?;
    let mut files = Vec::new();

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if excludes.is_match(relative) || excludes.is_match(path) {
            debug!(path = %path.display(), "excluded by config");
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Walk `root`, parse every C# file and bind the result.
///
/// Files that fail to read or parse are logged and skipped; they never abort
/// the load.
#[cfg(feature = "tree-sitter")]
pub fn load_program(root: &Path, config: &Config, parallel: bool) -> anyhow::Result<LoadedProgram> {
    let paths = collect_files(root, config)?;
    debug!(root = %root.display(), files = paths.len(), "loading program");

    let parse = |path: &PathBuf| -> (PathBuf, Result<ParsedFile, ParseError>) {
        let display = display_path(root, path);
        let result = fs::read_to_string(path)
            .map_err(|source| ParseError::Io {
                path: path.clone(),
                source,
            })
            .and_then(|content| csharp::parse_source(&display, &content));
        (path.clone(), result)
    };

    let results: Vec<_> = if parallel {
        paths.par_iter().map(parse).collect()
    } else {
        paths.iter().map(parse).collect()
    };

    let mut files = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();
    for (path, result) in results {
        match result {
            Ok(file) => files.push(file),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping file");
                skipped.push((path, e.to_string()));
            }
        }
    }

    Ok(LoadedProgram {
        program: build_program(files),
        skipped,
    })
}

/// Without the tree-sitter feature there is no C# front-end.
#[cfg(not(feature = "tree-sitter"))]
pub fn load_program(_root: &Path, _config: &Config, _parallel: bool) -> anyhow::Result<LoadedProgram> {
    anyhow::bail!("apcheck was built without the tree-sitter feature; no C# front-end available")
}

/// Path as shown in findings: relative to the analyzed root when possible.
fn display_path(root: &Path, path: &Path) -> String {
    let relative = if root.is_file() {
        path.file_name().map(Path::new).unwrap_or(path)
    } else {
        path.strip_prefix(root).unwrap_or(path)
    };
    relative.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_files_filters_and_sorts() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src/obj")).unwrap();
        fs::write(temp.path().join("src/B.cs"), "class B {}").unwrap();
        fs::write(temp.path().join("src/A.cs"), "class A {}").unwrap();
        fs::write(temp.path().join("src/notes.txt"), "not code").unwrap();
        fs::write(temp.path().join("src/obj/Gen.cs"), "class G {}").unwrap();

        let config = Config {
            excluded_paths: vec!["**/obj/**".to_string()],
            ..Default::default()
        };
        let files = collect_files(temp.path(), &config).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["A.cs", "B.cs"]);
    }

    #[test]
    fn test_display_path_is_relative() {
        let root = Path::new("/repo");
        assert_eq!(display_path(root, Path::new("/repo/src/A.cs")), "src/A.cs");
    }
}
