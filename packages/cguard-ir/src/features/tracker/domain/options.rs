use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;

/// Tracker switches derived from the analysis configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerOptions {
    /// Passing an unchecked allocation to a dereferencing library call
    /// counts as a use
    pub strict_null_checks: bool,
    pub loop_bounds: bool,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            strict_null_checks: false,
            loop_bounds: true,
        }
    }
}

impl From<&AnalysisConfig> for TrackerOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            strict_null_checks: config.strict_null_checks,
            loop_bounds: config.loop_bounds,
        }
    }
}
