/*
 * Analysis Engine
 *
 * Entry point of the library: validates units, runs one LifetimeTracker
 * per function and merges the results in input order.
 *
 * # Example
 * ```ignore
 * let engine = AnalysisEngine::new(AnalysisConfig::default())?;
 * let run = engine.analyze_source(&std::fs::read_to_string("vuln.c")?)?;
 * for finding in run.reporter.ranked() {
 *     println!("{}", finding);
 * }
 * ```
 */

use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::cancellation::CancellationToken;
use super::run::{AnalysisRun, FunctionOutcome};
use crate::config::AnalysisConfig;
use crate::errors::Result;
use crate::features::c_ir::{CFrontend, FrontEnd, FunctionUnit};
use crate::features::reporting::Reporter;
use crate::features::rules::RuleRegistry;
use crate::features::tracker::{LifetimeTracker, TrackerOptions};

pub struct AnalysisEngine {
    config: AnalysisConfig,
    registry: RuleRegistry,
}

impl AnalysisEngine {
    /// Engine with the built-in rules plus the configured extra APIs
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let registry = RuleRegistry::from_config(&config);
        Ok(Self { config, registry })
    }

    /// Engine with a caller-built registry
    pub fn with_registry(config: AnalysisConfig, registry: RuleRegistry) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, registry })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Register additional APIs or rules before running
    pub fn registry_mut(&mut self) -> &mut RuleRegistry {
        &mut self.registry
    }

    /// Analyze one unit; a malformed unit yields `Failed` and no findings
    pub fn analyze_function(&self, unit: &FunctionUnit) -> FunctionOutcome {
        if let Err(error) = unit.validate() {
            warn!(function = %unit.name, %error, "skipping malformed function");
            return FunctionOutcome::Failed {
                function: unit.name.clone(),
                error,
            };
        }

        let options = TrackerOptions::from(&self.config);
        let findings = LifetimeTracker::run(unit, &self.registry, options)
            .into_iter()
            .filter(|f| f.severity().at_least(self.config.min_severity))
            .collect();

        FunctionOutcome::Analyzed {
            function: unit.name.clone(),
            findings,
        }
    }

    pub fn analyze(&self, units: &[FunctionUnit]) -> AnalysisRun {
        self.analyze_with_cancel(units, &CancellationToken::new())
    }

    /// Analyze all units; once `token` fires, units not yet started are
    /// skipped
    pub fn analyze_with_cancel(&self, units: &[FunctionUnit], token: &CancellationToken) -> AnalysisRun {
        let task = |unit: &FunctionUnit| {
            if token.is_cancelled() {
                debug!(function = %unit.name, "cancelled before start");
                return None;
            }
            Some(self.analyze_function(unit))
        };

        let results: Vec<Option<FunctionOutcome>> = self.schedule(units, task);

        let mut reporter = Reporter::with_min_severity(self.config.min_severity);
        let mut outcomes = Vec::with_capacity(results.len());
        let mut skipped = 0;
        for result in results {
            match result {
                Some(outcome) => {
                    reporter.extend(outcome.findings().iter().cloned());
                    outcomes.push(outcome);
                }
                None => skipped += 1,
            }
        }

        let run = AnalysisRun {
            outcomes,
            reporter,
            skipped,
            cancelled: token.is_cancelled(),
        };
        if run.cancelled {
            warn!(skipped, "analysis cancelled");
        }
        info!(summary = %run.summary(), "analysis finished");
        run
    }

    /// Lower C source through the tree-sitter front end and analyze it
    pub fn analyze_source(&self, source: &str) -> Result<AnalysisRun> {
        let mut frontend = CFrontend::new()?;
        let units = frontend.lower(source)?;
        Ok(self.analyze(&units))
    }

    #[cfg(feature = "parallel")]
    fn schedule<F>(&self, units: &[FunctionUnit], task: F) -> Vec<Option<FunctionOutcome>>
    where
        F: Fn(&FunctionUnit) -> Option<FunctionOutcome> + Sync + Send,
    {
        if !self.config.parallel || units.len() < 2 {
            return units.iter().map(task).collect();
        }

        let threads = self.config.effective_threads().min(units.len());
        debug!(threads, units = units.len(), "scheduling functions");
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| units.par_iter().map(&task).collect()),
            Err(error) => {
                warn!(%error, "thread pool unavailable, analyzing sequentially");
                units.iter().map(task).collect()
            }
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn schedule<F>(&self, units: &[FunctionUnit], task: F) -> Vec<Option<FunctionOutcome>>
    where
        F: Fn(&FunctionUnit) -> Option<FunctionOutcome> + Sync + Send,
    {
        units.iter().map(task).collect()
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        let config = AnalysisConfig::default();
        let registry = RuleRegistry::from_config(&config);
        Self { config, registry }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::c_ir::{Declaration, Expr, Stmt};
    use crate::features::reporting::Severity;
    use crate::shared::models::Location;

    fn overflow_unit(name: &str) -> FunctionUnit {
        FunctionUnit::new(name, Location::line(1)).with_body(vec![
            Stmt::declare(Declaration::char_array("tiny", 4, Location::line(2))),
            Stmt::call(
                "strcpy",
                vec![Expr::ident("tiny"), Expr::str("too long")],
                Location::line(3),
            ),
        ])
    }

    #[test]
    fn test_malformed_unit_does_not_stop_run() {
        let mut broken = FunctionUnit::new("broken", Location::line(10));
        broken.syntax_errors.push(Location::new(11, 3));
        let units = vec![overflow_unit("a"), broken, overflow_unit("b")];

        let run = AnalysisEngine::default().analyze(&units);
        let summary = run.summary();
        assert_eq!(summary.analyzed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(run.findings().len(), 2);
        assert_eq!(run.failures().next().map(|(f, _)| f), Some("broken"));
    }

    #[test]
    fn test_order_is_stable_across_runs() {
        let units: Vec<FunctionUnit> = (0..16).map(|i| overflow_unit(&format!("f{}", i))).collect();
        let engine = AnalysisEngine::default();
        let first = engine.analyze(&units);
        let second = engine.analyze(&units);
        assert_eq!(first.findings(), second.findings());
        let names: Vec<&str> = first.findings().iter().map(|f| f.function()).collect();
        let expected: Vec<String> = (0..16).map(|i| format!("f{}", i)).collect();
        assert_eq!(names, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn test_cancelled_run_skips_everything() {
        let token = CancellationToken::new();
        token.cancel();
        let run = AnalysisEngine::default().analyze_with_cancel(&[overflow_unit("a")], &token);
        assert!(run.cancelled);
        assert_eq!(run.skipped, 1);
        assert!(run.findings().is_empty());
    }

    #[test]
    fn test_sized_pool_matches_sequential() {
        let units: Vec<FunctionUnit> = (0..8).map(|i| overflow_unit(&format!("f{}", i))).collect();
        let mut config = AnalysisConfig::default().with_parallel(true);
        config.num_threads = Some(2);
        assert_eq!(config.effective_threads(), 2);

        let pooled = AnalysisEngine::new(config).unwrap().analyze(&units);
        let sequential = AnalysisEngine::new(AnalysisConfig::default().with_parallel(false))
            .unwrap()
            .analyze(&units);
        assert_eq!(pooled.findings(), sequential.findings());
        assert_eq!(pooled.findings().len(), 8);
    }

    #[test]
    fn test_min_severity_filters() {
        let config = AnalysisConfig::default().with_min_severity(Severity::Critical);
        let engine = AnalysisEngine::new(config).unwrap();
        let run = engine.analyze(&[overflow_unit("a")]);
        assert!(run.findings().is_empty());
        assert!(run.outcomes[0].findings().is_empty());
    }
}
