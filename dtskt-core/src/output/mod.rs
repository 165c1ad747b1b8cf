//! Publishing generated files
//!
//! A run produces one [`OutputUnit`] per module scope. Publishing writes each
//! unit, then optionally runs an external formatter over it and copies it to
//! a mirror root:
//! - write failures are counted and reported
//! - format and mirror failures are warnings only

mod formatter;
mod writer;

pub use formatter::{CommandFormatter, Formatter};
pub use writer::{ArtifactWriter, FsWriter};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// One generated file, relative to the output root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputUnit {
    pub path: String,
    pub text: String,
}

/// Errors that can occur while publishing
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Formatter failed on {path}: {message}")]
    Format { path: String, message: String },
    #[error("Failed to mirror {path}: {source}")]
    Mirror {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// What happened during [`publish`]
#[derive(Debug, Default)]
pub struct PublishSummary {
    pub written: usize,
    pub formatted: usize,
    pub mirrored: usize,
    /// Write failures; these units were not produced
    pub failures: Vec<OutputError>,
}

impl PublishSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Where and how units are published
pub struct PublishOptions<'a> {
    pub out_dir: &'a Path,
    pub mirror_dir: Option<&'a Path>,
    pub formatter: Option<&'a dyn Formatter>,
}

/// Write every unit, format and mirror it when configured
pub fn publish(units: &[OutputUnit], writer: &dyn ArtifactWriter, options: &PublishOptions) -> PublishSummary {
    let mut summary = PublishSummary::default();

    for unit in units {
        let target = options.out_dir.join(&unit.path);
        if let Err(e) = writer.write(&target, &unit.text) {
            tracing::error!(error = %e, "write failed");
            summary.failures.push(e);
            continue;
        }
        summary.written += 1;
        tracing::info!(path = %target.display(), "wrote");

        if let Some(formatter) = options.formatter {
            match formatter.format_in_place(&target) {
                Ok(()) => summary.formatted += 1,
                Err(e) => tracing::warn!(error = %e, "formatting skipped"),
            }
        }

        if let Some(mirror_dir) = options.mirror_dir {
            let destination = mirror_dir.join(&unit.path);
            match writer::mirror(&target, &destination) {
                Ok(()) => summary.mirrored += 1,
                Err(e) => tracing::warn!(error = %e, "mirror copy skipped"),
            }
        }
    }

    summary
}

/// Path a unit would be written to, for dry runs and messages
pub fn target_path(out_dir: &Path, unit: &OutputUnit) -> PathBuf {
    out_dir.join(&unit.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn unit(path: &str, text: &str) -> OutputUnit {
        OutputUnit {
            path: path.to_string(),
            text: text.to_string(),
        }
    }

    struct FailingFormatter;

    impl Formatter for FailingFormatter {
        fn format_in_place(&self, path: &Path) -> Result<(), OutputError> {
            Err(OutputError::Format {
                path: path.display().to_string(),
                message: "exit status 1".to_string(),
            })
        }
    }

    #[test]
    fn test_publish_writes_and_mirrors() {
        let out = tempfile::tempdir().unwrap();
        let mirror = tempfile::tempdir().unwrap();
        let units = vec![
            unit("org/node/global.kt", "package org.node\n"),
            unit("org/node/events/events.kt", "package org.node.events\n"),
        ];
        let options = PublishOptions {
            out_dir: out.path(),
            mirror_dir: Some(mirror.path()),
            formatter: None,
        };

        let summary = publish(&units, &FsWriter, &options);
        assert!(summary.is_success());
        assert_eq!(summary.written, 2);
        assert_eq!(summary.mirrored, 2);
        assert_eq!(summary.formatted, 0);
        assert_eq!(
            fs::read_to_string(mirror.path().join("org/node/events/events.kt")).unwrap(),
            "package org.node.events\n"
        );
    }

    #[test]
    fn test_formatter_failure_is_not_fatal() {
        let out = tempfile::tempdir().unwrap();
        let units = vec![unit("org/node/global.kt", "package org.node\n")];
        let formatter = FailingFormatter;
        let options = PublishOptions {
            out_dir: out.path(),
            mirror_dir: None,
            formatter: Some(&formatter),
        };

        let summary = publish(&units, &FsWriter, &options);
        assert!(summary.is_success());
        assert_eq!(summary.written, 1);
        assert_eq!(summary.formatted, 0);
        assert!(out.path().join("org/node/global.kt").exists());
    }

    #[test]
    fn test_write_failure_is_counted() {
        let out = tempfile::tempdir().unwrap();
        // a file where a directory is needed
        fs::write(out.path().join("org"), "").unwrap();
        let units = vec![unit("org/node/global.kt", "package org.node\n")];
        let options = PublishOptions {
            out_dir: out.path(),
            mirror_dir: None,
            formatter: None,
        };

        let summary = publish(&units, &FsWriter, &options);
        assert!(!summary.is_success());
        assert_eq!(summary.written, 0);
        assert!(matches!(summary.failures[0], OutputError::Write { .. }));
    }

    #[test]
    fn test_target_path() {
        let u = unit("org/node/global.kt", "");
        assert_eq!(target_path(Path::new("generated"), &u), PathBuf::from("generated/org/node/global.kt"));
    }
}
