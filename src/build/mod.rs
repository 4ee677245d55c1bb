//! Multi-file parse driver.
//!
//! Discovers source files via glob patterns, reads them, and parses every
//! unit in parallel. Units share nothing but the identifier interner, so
//! each worker's result is independent of the others.

pub mod error;

use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;

use crate::options::ParseOptions;
use crate::parser::{parse_bytes, Parsed};

pub use error::BuildError;

// ===== Build options =====

/// Configuration options for the build pipeline.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// File extension (without the dot) that glob matches must carry
    pub extension: String,
    /// Stop reporting once this many errors have been seen. Units after the
    /// one that reaches the limit are parsed but their results dropped.
    /// `None` means no limit (the default).
    pub error_limit: Option<usize>,
    pub parse: ParseOptions,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            extension: "silt".to_string(),
            error_limit: None,
            parse: ParseOptions::default(),
        }
    }
}

// ===== Public types =====

pub struct UnitResult {
    pub path: PathBuf,
    pub parsed: Parsed,
}

pub struct BuildResult {
    /// Parsed units, in input order
    pub units: Vec<UnitResult>,
    pub build_errors: Vec<BuildError>,
    /// Units whose results were dropped because of the error limit
    pub skipped: usize,
}

impl BuildResult {
    /// Diagnostics over all units plus unit-level failures
    pub fn error_count(&self) -> usize {
        self.build_errors.len()
            + self
                .units
                .iter()
                .map(|u| u.parsed.diagnostics.len())
                .sum::<usize>()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

// ===== Public API =====

/// Parse all source files matching the given glob patterns.
pub fn build(globs: &[&str], options: &BuildOptions) -> BuildResult {
    let build_start = Instant::now();
    let mut build_errors = Vec::new();

    // Phase 1: Glob resolution
    log::debug!("Phase 1: Resolving glob patterns: {:?}", globs);
    let phase_start = Instant::now();
    let paths = resolve_globs(globs, &options.extension, &mut build_errors);
    log::debug!(
        "Phase 1 complete: found {} files in {:.2?}",
        paths.len(),
        phase_start.elapsed()
    );
    for path in &paths {
        log::debug!("  discovered: {}", path.display());
    }

    // Phase 2: Read sources
    log::debug!("Phase 2: Reading source files");
    let phase_start = Instant::now();
    let mut inputs = Vec::new();
    for path in paths {
        match std::fs::read(&path) {
            Ok(bytes) => {
                log::debug!("  read {} ({} bytes)", path.display(), bytes.len());
                inputs.push((path, bytes));
            }
            Err(e) => {
                log::debug!("  failed to read {}: {}", path.display(), e);
                build_errors.push(BuildError::FileReadError {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }
    log::debug!(
        "Phase 2 complete: read {} source files in {:.2?}",
        inputs.len(),
        phase_start.elapsed()
    );

    let result = parse_inputs(&inputs, options, build_errors);
    log::debug!("Build finished in {:.2?}", build_start.elapsed());
    result
}

/// Parse in-memory `(name, source)` units in parallel.
pub fn parse_sources(sources: &[(&str, &str)], options: &BuildOptions) -> BuildResult {
    let inputs: Vec<(PathBuf, &[u8])> = sources
        .iter()
        .map(|(name, source)| (PathBuf::from(name), source.as_bytes()))
        .collect();
    parse_inputs(&inputs, options, Vec::new())
}

fn parse_inputs<S>(
    inputs: &[(PathBuf, S)],
    options: &BuildOptions,
    mut build_errors: Vec<BuildError>,
) -> BuildResult
where
    S: AsRef<[u8]> + Sync,
{
    // Phase 3: Parse every unit in parallel; collect keeps input order
    log::debug!("Phase 3: Parsing {} units", inputs.len());
    let phase_start = Instant::now();
    let outcomes: Vec<(PathBuf, Result<Parsed, _>)> = inputs
        .par_iter()
        .map(|(path, bytes)| (path.clone(), parse_bytes(bytes.as_ref(), &options.parse)))
        .collect();
    log::debug!(
        "Phase 3 complete: parsed {} units in {:.2?}",
        outcomes.len(),
        phase_start.elapsed()
    );

    // Phase 4: Apply the error limit in input order
    let mut errors_seen = build_errors.len();
    let mut units = Vec::with_capacity(outcomes.len());
    let mut skipped = 0;
    for (path, outcome) in outcomes {
        if options.error_limit.map_or(false, |limit| errors_seen >= limit) {
            skipped += 1;
            continue;
        }
        match outcome {
            Ok(parsed) => {
                errors_seen += parsed.diagnostics.len();
                units.push(UnitResult { path, parsed });
            }
            Err(diagnostic) => {
                log::debug!("  {} is not valid UTF-8: {}", path.display(), diagnostic);
                errors_seen += 1;
                build_errors.push(BuildError::InvalidEncoding { path, diagnostic });
            }
        }
    }
    if skipped > 0 {
        log::debug!("Error limit reached: dropped {} units", skipped);
    }

    BuildResult {
        units,
        build_errors,
        skipped,
    }
}

// ===== Glob resolution =====

fn resolve_globs(patterns: &[&str], extension: &str, errors: &mut Vec<BuildError>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for &pattern in patterns {
        match glob::glob(pattern) {
            Ok(entries) => {
                for entry in entries {
                    match entry {
                        Ok(path) => {
                            if path.extension().map_or(false, |ext| ext == extension) {
                                paths.push(path);
                            }
                        }
                        Err(e) => errors.push(BuildError::FileReadError {
                            path: e.path().to_path_buf(),
                            error: e.to_string(),
                        }),
                    }
                }
            }
            Err(e) => errors.push(BuildError::InvalidGlob {
                pattern: pattern.to_string(),
                error: e.to_string(),
            }),
        }
    }
    paths.sort();
    paths.dedup();
    paths
}
