//! An observer validating every imported record.

use log::warn;

use crate::{config::ValidationMode, record::Record, violation::Violation};

use super::{Observer, Report, StreamError};

/// Validate each record as it is imported, logging and collecting the
/// violations found.
///
/// Records are validated under the validator's own mode, which defaults to
/// strict regardless of the importer's configuration.
#[derive(Debug)]
pub struct Validator {
    mode: ValidationMode,
    violations: Vec<Violation>,
    failures: usize,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self::with_mode(ValidationMode::Strict)
    }

    pub fn with_mode(mode: ValidationMode) -> Self {
        Self {
            mode,
            violations: vec![],
            failures: 0,
        }
    }

    /// Violations collected so far.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// Number of lines skipped by the importer.
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Whether nothing has been found.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.failures == 0
    }
}

impl Observer for Validator {
    fn notice(&mut self, record: &Record, report: &Report) {
        for violation in record.validate(self.mode) {
            warn!(
                "Record {} (line {}): {violation}",
                report.number, report.first_line
            );
            self.violations.push(violation);
        }
    }

    fn notice_failure(&mut self, _: &StreamError) {
        self.failures += 1;
    }
}
