/*
 * Closure-backed rule
 *
 * Lets callers attach a check to a callee pattern without writing a type:
 *
 *   registry.register_rule(Box::new(PatternRule::new(
 *       RuleId::Custom("no-system".into()),
 *       CalleePattern::exact("system"),
 *       |call| Some(Finding::new(...)),
 *   )));
 */

use crate::features::reporting::{Finding, RuleId};
use crate::features::rules::domain::{ApiSpec, CalleePattern, ResolvedCall};
use crate::features::rules::ports::CallRule;

pub struct PatternRule<F>
where
    F: Fn(&ResolvedCall<'_>) -> Option<Finding> + Send + Sync,
{
    id: RuleId,
    pattern: CalleePattern,
    check: F,
}

impl<F> PatternRule<F>
where
    F: Fn(&ResolvedCall<'_>) -> Option<Finding> + Send + Sync,
{
    pub fn new(id: RuleId, pattern: CalleePattern, check: F) -> Self {
        Self { id, pattern, check }
    }
}

impl<F> CallRule for PatternRule<F>
where
    F: Fn(&ResolvedCall<'_>) -> Option<Finding> + Send + Sync,
{
    fn id(&self) -> RuleId {
        self.id.clone()
    }

    fn applies(&self, callee: &str, _spec: Option<&ApiSpec>) -> bool {
        self.pattern.matches(callee)
    }

    fn check(&self, call: &ResolvedCall<'_>) -> Option<Finding> {
        (self.check)(call)
    }
}
