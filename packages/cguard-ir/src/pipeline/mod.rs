//! Analysis pipeline
//!
//! One task per function unit on the rayon pool; each task owns its fact
//! table, so the only shared step is the ordered merge into the Reporter.
//!
//! ```text
//! units ──par_iter──▶ [validate → track → findings] ──ordered merge──▶ Reporter
//! ```

mod cancellation;
mod engine;
mod run;

pub use cancellation::CancellationToken;
pub use engine::AnalysisEngine;
pub use run::{AnalysisRun, FunctionOutcome, RunSummary};
