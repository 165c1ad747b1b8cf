//! External source formatters

use std::path::Path;
use std::process::Command;

use super::OutputError;
use crate::config::FormatterConfig;

/// Reformats a written file in place
pub trait Formatter {
    fn format_in_place(&self, path: &Path) -> Result<(), OutputError>;
}

/// Runs `program [args...] <path>`
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl From<&FormatterConfig> for CommandFormatter {
    fn from(config: &FormatterConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }
}

impl Formatter for CommandFormatter {
    fn format_in_place(&self, path: &Path) -> Result<(), OutputError> {
        let failure = |message: String| OutputError::Format {
            path: path.display().to_string(),
            message,
        };
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .output()
            .map_err(|e| failure(format!("{}: {}", self.program, e)))?;
        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(failure(format!("{} ({})", output.status, stderr.trim())))
        }
    }
}
