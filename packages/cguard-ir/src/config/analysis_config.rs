//! Analysis configuration
//!
//! A flat settings struct built from a preset; YAML files override
//! individual fields.

use std::path::Path;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{ConfigError, ConfigResult};
use super::io::{AnalysisOverrides, ConfigFileV1};
use super::preset::Preset;
use crate::features::reporting::Severity;

/// Upper bound accepted for `num_threads`
const MAX_THREADS: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub preset: Preset,

    /// Unchecked allocations passed to dereferencing library calls count as
    /// uses
    pub strict_null_checks: bool,

    /// Off-by-one checks on counted loops
    pub loop_bounds: bool,

    /// Findings below this severity are dropped
    pub min_severity: Severity,

    /// Analyze functions on the rayon pool
    pub parallel: bool,

    /// Worker threads (`None` = one per core)
    pub num_threads: Option<usize>,

    pub extra_allocators: Vec<String>,
    pub extra_deallocators: Vec<String>,
    /// Functions whose return value is externally controlled
    pub extra_input_sources: Vec<String>,
}

impl AnalysisConfig {
    /// Start from a preset
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            strict_null_checks: preset.strict_null_checks(),
            loop_bounds: preset.loop_bounds(),
            min_severity: Severity::Low,
            parallel: true,
            num_threads: None,
            extra_allocators: Vec::new(),
            extra_deallocators: Vec::new(),
            extra_input_sources: Vec::new(),
        }
    }

    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_strict_null_checks(mut self, strict: bool) -> Self {
        self.strict_null_checks = strict;
        self
    }

    /// Worker count actually used
    pub fn effective_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Check ranges and API-name consistency
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(threads) = self.num_threads {
            if threads == 0 || threads > MAX_THREADS {
                return Err(ConfigError::Range {
                    field: "num_threads".to_string(),
                    value: threads.to_string(),
                    min: "1".to_string(),
                    max: MAX_THREADS.to_string(),
                    hint: "Omit the field to use one thread per core.".to_string(),
                });
            }
        }

        let lists = [
            ("extra_allocators", &self.extra_allocators),
            ("extra_deallocators", &self.extra_deallocators),
            ("extra_input_sources", &self.extra_input_sources),
        ];
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for (field, names) in lists {
            for name in names {
                let name = name.trim();
                if name.is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "empty function name in '{}'",
                        field
                    )));
                }
                if !seen.insert(name) {
                    return Err(ConfigError::Validation(format!(
                        "function '{}' is listed more than once across allocator, deallocator and input-source lists",
                        name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Apply file overrides on top of this configuration
    pub fn apply(mut self, overrides: AnalysisOverrides) -> Self {
        if let Some(v) = overrides.strict_null_checks {
            self.strict_null_checks = v;
        }
        if let Some(v) = overrides.loop_bounds {
            self.loop_bounds = v;
        }
        if let Some(v) = overrides.min_severity {
            self.min_severity = v;
        }
        if let Some(v) = overrides.parallel {
            self.parallel = v;
        }
        if overrides.num_threads.is_some() {
            self.num_threads = overrides.num_threads;
        }
        if let Some(v) = overrides.extra_allocators {
            self.extra_allocators = v;
        }
        if let Some(v) = overrides.extra_deallocators {
            self.extra_deallocators = v;
        }
        if let Some(v) = overrides.extra_input_sources {
            self.extra_input_sources = v;
        }
        self
    }

    /// Load from YAML text (v1 schema)
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let file: ConfigFileV1 = serde_yaml::from_str(content)?;

        if file.version != 1 {
            return Err(ConfigError::UnsupportedVersion {
                found: file.version,
            });
        }

        let preset = Preset::from_str(&file.preset)
            .map_err(|_| ConfigError::UnknownPreset(file.preset.clone()))?;

        let config = Self::preset(preset).apply(file.overrides.unwrap_or_default());
        config.validate()?;
        debug!(preset = %config.preset, "configuration loaded");
        Ok(config)
    }

    /// Load from a YAML file (v1 schema)
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Export as a YAML v1 document
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = ConfigFileV1 {
            version: 1,
            preset: self.preset.to_string(),
            overrides: Some(AnalysisOverrides {
                strict_null_checks: Some(self.strict_null_checks),
                loop_bounds: Some(self.loop_bounds),
                min_severity: Some(self.min_severity),
                parallel: Some(self.parallel),
                num_threads: self.num_threads,
                extra_allocators: Some(self.extra_allocators.clone()),
                extra_deallocators: Some(self.extra_deallocators.clone()),
                extra_input_sources: Some(self.extra_input_sources.clone()),
            }),
        };
        Ok(serde_yaml::to_string(&file)?)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::preset(Preset::Balanced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_loading() {
        let yaml = r#"
version: 1
preset: fast
overrides:
  min_severity: high
  extra_allocators: [xmalloc, pool_alloc]
"#;
        let config = AnalysisConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.preset, Preset::Fast);
        assert!(!config.loop_bounds);
        assert_eq!(config.min_severity, Severity::High);
        assert_eq!(config.extra_allocators, vec!["xmalloc", "pool_alloc"]);
    }

    #[test]
    fn test_yaml_export_reloads() {
        let config = AnalysisConfig::preset(Preset::Thorough).with_min_severity(Severity::Medium);
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("version: 1"));
        assert!(yaml.contains("preset: thorough"));
        assert_eq!(AnalysisConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_unknown_preset_and_version() {
        let err = AnalysisConfig::from_yaml_str("version: 1\npreset: turbo\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPreset(p) if p == "turbo"));

        let err = AnalysisConfig::from_yaml_str("version: 2\npreset: fast\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion { found: 2 }));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "version: 1\npreset: fast\noverrides:\n  max_depth: 3\n";
        assert!(matches!(
            AnalysisConfig::from_yaml_str(yaml),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_validate_rejects_collisions() {
        let config = AnalysisConfig {
            extra_allocators: vec!["pool_get".to_string()],
            extra_deallocators: vec!["pool_get".to_string()],
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_thread_range() {
        let config = AnalysisConfig {
            num_threads: Some(0),
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Range { .. })));
        assert!(AnalysisConfig::default().validate().is_ok());
        assert!(AnalysisConfig::default().effective_threads() >= 1);
    }
}
