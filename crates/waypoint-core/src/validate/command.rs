//! External validator speaking the write-hook protocol.
//!
//! The command receives one JSON object on stdin:
//!
//! ```json
//! {"tool_name": "Write", "tool_input": {"file_path": "...", "content": "..."}}
//! ```
//!
//! Exit status 0 passes, 1 passes with warnings, 2 blocks. Each non-empty
//! stderr line becomes one issue. Any other outcome means the validator is
//! unavailable.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, warn};
use serde_json::json;

use super::{Issue, Rule, Severity, Unavailable, ValidationReport, Validator};

/// Runs an external program as the post-write validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandValidator {
    program: String,
    args: Vec<String>,
}

impl CommandValidator {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds a validator from an argv list, `None` when it is empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.iter().cloned()))
    }

    fn report_from(severity: Severity, stderr: &str) -> ValidationReport {
        let mut report = ValidationReport::new();
        for line in stderr.lines().map(str::trim).filter(|l| !l.is_empty()) {
            report.push(Issue {
                severity,
                rule: Rule::External,
                location: String::new(),
                message: line.to_string(),
                hint: None,
            });
        }
        if severity == Severity::Blocking && report.is_clean() {
            report.push(Issue::blocking(
                Rule::External,
                "",
                "External validator rejected the document",
            ));
        }
        report
    }
}

impl Validator for CommandValidator {
    fn validate(&self, path: &Path, content: &str) -> Result<ValidationReport, Unavailable> {
        let payload = json!({
            "tool_name": "Write",
            "tool_input": {
                "file_path": path.to_string_lossy(),
                "content": content,
            }
        })
        .to_string();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Unavailable::new(format!("cannot start '{}': {e}", self.program)))?;

        // stdin must be fed while stderr drains
        let writer = child.stdin.take().map(|mut stdin| {
            std::thread::spawn(move || {
                if let Err(e) = stdin.write_all(payload.as_bytes()) {
                    debug!("Validator closed stdin early: {e}");
                }
            })
        });

        let output = child
            .wait_with_output()
            .map_err(|e| Unavailable::new(format!("'{}' failed: {e}", self.program)))?;
        if let Some(writer) = writer {
            if writer.join().is_err() {
                warn!("Stdin writer for '{}' panicked", self.program);
            }
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        match output.status.code() {
            Some(0) => Ok(ValidationReport::new()),
            Some(1) => Ok(Self::report_from(Severity::Warning, &stderr)),
            Some(2) => Ok(Self::report_from(Severity::Blocking, &stderr)),
            Some(code) => Err(Unavailable::new(format!(
                "'{}' exited with unexpected status {code}",
                self.program
            ))),
            None => Err(Unavailable::new(format!(
                "'{}' was terminated by a signal",
                self.program
            ))),
        }
    }
}
