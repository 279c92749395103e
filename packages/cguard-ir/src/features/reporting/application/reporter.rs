/*
 * Reporter
 *
 * Append-only sink for one analysis run.
 * - Deduplicates on (rule id, function, location, subject)
 * - Drops findings below the configured minimum severity
 * - Keeps insertion order; `ranked()` gives the severity view
 */

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::features::reporting::domain::{Finding, RuleId, Severity};
use crate::shared::models::Location;

/// Per-severity finding counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }
}

#[derive(Debug, Clone)]
pub struct Reporter {
    findings: Vec<Finding>,
    seen: FxHashSet<(RuleId, String, Location, Option<String>)>,
    min_severity: Severity,
    duplicates: usize,
}

impl Reporter {
    pub fn new() -> Self {
        Self::with_min_severity(Severity::Low)
    }

    pub fn with_min_severity(min_severity: Severity) -> Self {
        Self {
            findings: Vec::new(),
            seen: FxHashSet::default(),
            min_severity,
            duplicates: 0,
        }
    }

    /// Append a finding. Returns false when it was filtered or a duplicate.
    pub fn push(&mut self, finding: Finding) -> bool {
        if !finding.severity().at_least(self.min_severity) {
            return false;
        }

        let key = (
            finding.rule_id().clone(),
            finding.function().to_string(),
            finding.location(),
            finding.subject().map(str::to_string),
        );
        if !self.seen.insert(key) {
            self.duplicates += 1;
            return false;
        }

        tracing::debug!(
            rule = %finding.rule_id(),
            function = finding.function(),
            line = finding.location().line,
            "finding recorded"
        );
        self.findings.push(finding);
        true
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        for finding in findings {
            self.push(finding);
        }
    }

    /// Findings in insertion order
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Findings ordered by severity (Critical first); stable within a
    /// severity
    pub fn ranked(&self) -> Vec<&Finding> {
        let mut ranked: Vec<&Finding> = self.findings.iter().collect();
        ranked.sort_by_key(|f| f.severity());
        ranked
    }

    pub fn counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for finding in &self.findings {
            match finding.severity() {
                Severity::Critical => counts.critical += 1,
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
            }
        }
        counts
    }

    /// Most severe finding, if any (drives CLI exit codes)
    pub fn highest_severity(&self) -> Option<Severity> {
        self.findings.iter().map(|f| f.severity()).min()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}
