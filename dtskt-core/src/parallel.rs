//! Parallel file parsing using Rayon

use rayon::prelude::*;
use std::path::Path;

use crate::ast::SourceFile;
use crate::parser::{is_typescript_path, parse_file, ParseError};

/// Parse multiple files in parallel; results keep the input order
pub fn parse_files_parallel<P: AsRef<Path> + Sync>(
    files: &[P],
    concurrency: Option<usize>,
) -> Vec<Result<SourceFile, ParseError>> {
    // Configure thread pool
    if let Some(num_threads) = concurrency {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if pool already initialized
    }

    files
        .par_iter()
        .map(|path| parse_file(path.as_ref()))
        .collect()
}

/// Expand glob patterns to file paths
pub fn expand_globs(patterns: &[String]) -> Vec<String> {
    let mut files = Vec::new();

    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') {
            match glob::glob(pattern) {
                Ok(paths) => {
                    for entry in paths.flatten() {
                        if entry.is_file() {
                            if let Some(path) = entry.to_str() {
                                files.push(path.to_string());
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(pattern = %pattern, error = %e, "invalid glob pattern");
                }
            }
        } else {
            // Not a glob, use as-is
            files.push(pattern.clone());
        }
    }

    files
}

/// Keep only TypeScript inputs
pub fn filter_typescript_files(files: Vec<String>) -> Vec<String> {
    files
        .into_iter()
        .filter(|f| is_typescript_path(f))
        .collect()
}
