/*
 * cguard IR - Intraprocedural C Vulnerability Detection Engine
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (Location)
 * - features/    : Vertical slices (c_ir → facts → evaluator → tracker → rules → bounds → reporting)
 * - pipeline/    : Per-function scheduling and finding merge
 * - config/      : Presets + YAML configuration
 *
 * Analysis is a pure function of the lowered input: one fact table per
 * function, findings merged into a single reporter at the end of a run.
 */

#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::upper_case_acronyms)] // NULL naming
#![allow(clippy::should_implement_trait)] // from_str naming intentional

/// Shared models and utilities
pub mod shared;

/// Feature modules
pub mod features;

/// Pipeline orchestration
pub mod pipeline;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{AnalysisConfig, Preset};
pub use errors::{CguardError, Result};
pub use features::c_ir::{CFrontend, FunctionUnit, ParseInputError};
pub use features::reporting::{BugClass, Finding, Reporter, RuleId, Severity};
pub use pipeline::{AnalysisEngine, AnalysisRun, CancellationToken, FunctionOutcome};
