/*
 * Finding Reporter
 *
 * - Domain: Finding (immutable), RuleId, Severity, BugClass
 * - Application: Reporter (append-only, deduplicating, severity ranking)
 */

pub mod application;
pub mod domain;

pub use application::{Reporter, SeverityCounts};
pub use domain::{BugClass, Finding, RuleId, Severity};
