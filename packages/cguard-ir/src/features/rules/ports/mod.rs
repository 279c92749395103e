/*
 * Rule Ports
 *
 * Extension point: implement CallRule (or wrap a closure in PatternRule)
 * and register it with the RuleRegistry. Rules never see the fact table,
 * only the resolved call.
 */

use crate::features::reporting::{Finding, RuleId};
use crate::features::rules::domain::{ApiSpec, ResolvedCall};

pub trait CallRule: Send + Sync {
    fn id(&self) -> RuleId;

    /// Whether the rule runs for this call site
    fn applies(&self, callee: &str, spec: Option<&ApiSpec>) -> bool;

    /// Inspect resolved facts; at most one finding per call site
    fn check(&self, call: &ResolvedCall<'_>) -> Option<Finding>;
}
