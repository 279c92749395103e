//! Run results

use serde::Serialize;

use crate::features::c_ir::ParseInputError;
use crate::features::reporting::{Finding, Reporter, SeverityCounts};

/// Result of one function unit
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionOutcome {
    Analyzed {
        function: String,
        findings: Vec<Finding>,
    },
    /// Rejected before analysis; contributes no findings
    Failed {
        function: String,
        error: ParseInputError,
    },
}

impl FunctionOutcome {
    pub fn function(&self) -> &str {
        match self {
            FunctionOutcome::Analyzed { function, .. } | FunctionOutcome::Failed { function, .. } => {
                function
            }
        }
    }

    pub fn findings(&self) -> &[Finding] {
        match self {
            FunctionOutcome::Analyzed { findings, .. } => findings,
            FunctionOutcome::Failed { .. } => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FunctionOutcome::Failed { .. })
    }
}

/// Counts for display and exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub analyzed: usize,
    pub failed: usize,
    /// Units never started because the run was cancelled
    pub skipped: usize,
    pub duplicates: usize,
    pub cancelled: bool,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RunSummary {
    pub fn total_findings(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} functions analyzed, {} failed, {} findings (critical {}, high {}, medium {}, low {})",
            self.analyzed,
            self.failed,
            self.total_findings(),
            self.critical,
            self.high,
            self.medium,
            self.low
        )?;
        if self.cancelled {
            write!(f, "; cancelled, {} skipped", self.skipped)?;
        }
        Ok(())
    }
}

/// Outcome of an analysis run
#[derive(Debug)]
pub struct AnalysisRun {
    pub outcomes: Vec<FunctionOutcome>,
    pub reporter: Reporter,
    pub skipped: usize,
    pub cancelled: bool,
}

impl AnalysisRun {
    /// Merged findings in function order
    pub fn findings(&self) -> &[Finding] {
        self.reporter.findings()
    }

    pub fn findings_for(&self, function: &str) -> Vec<&Finding> {
        self.reporter
            .findings()
            .iter()
            .filter(|f| f.function() == function)
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ParseInputError)> {
        self.outcomes.iter().filter_map(|o| match o {
            FunctionOutcome::Failed { function, error } => Some((function.as_str(), error)),
            FunctionOutcome::Analyzed { .. } => None,
        })
    }

    pub fn summary(&self) -> RunSummary {
        let SeverityCounts {
            critical,
            high,
            medium,
            low,
        } = self.reporter.counts();
        let failed = self.outcomes.iter().filter(|o| o.is_failed()).count();
        RunSummary {
            analyzed: self.outcomes.len() - failed,
            failed,
            skipped: self.skipped,
            duplicates: self.reporter.duplicates(),
            cancelled: self.cancelled,
            critical,
            high,
            medium,
            low,
        }
    }
}
