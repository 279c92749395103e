//! Configuration file schema (YAML v1)

use serde::{Deserialize, Serialize};

use crate::features::reporting::Severity;

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileV1 {
    /// Schema version (always 1 for v1)
    pub version: u32,

    /// Base preset
    pub preset: String,

    /// Field overrides on top of the preset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<AnalysisOverrides>,
}

/// Optional field overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_null_checks: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_bounds: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_severity: Option<Severity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_threads: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_allocators: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_deallocators: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_input_sources: Option<Vec<String>>,
}
