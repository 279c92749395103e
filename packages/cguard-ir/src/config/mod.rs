//! Analysis configuration
//!
//! Two levels:
//! - Preset: `AnalysisConfig::preset(Preset::Thorough)`
//! - YAML v1 file: a preset plus field overrides
//!
//! # Examples
//!
//! ```rust,ignore
//! use cguard_ir::config::{AnalysisConfig, Preset};
//!
//! let config = AnalysisConfig::preset(Preset::Fast);
//!
//! let config = AnalysisConfig::from_yaml_str(r#"
//! version: 1
//! preset: thorough
//! overrides:
//!   min_severity: high
//!   extra_allocators: [xmalloc]
//! "#)?;
//! ```

pub mod analysis_config;
pub mod error;
pub mod io;
pub mod preset;

pub use analysis_config::AnalysisConfig;
pub use error::{ConfigError, ConfigResult};
pub use io::{AnalysisOverrides, ConfigFileV1};
pub use preset::Preset;
