/*
 * Rule Registry
 *
 * Resolution order for a callee: exact entries, then patterns in
 * registration order. Rules run in registration order; the first
 * built-in rules are registered by `with_builtins`.
 */

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::features::reporting::Finding;
use crate::features::rules::domain::{ApiSpec, CalleePattern, ResolvedCall};
use crate::features::rules::infrastructure::{
    builtin_apis, DangerousInputRule, FormatStringInjectionRule, OversizedBoundRule,
    UnboundedCopyRule, UnboundedFormatRule,
};
use crate::features::rules::ports::CallRule;

pub struct RuleRegistry {
    exact: FxHashMap<String, ApiSpec>,
    patterns: Vec<(CalleePattern, ApiSpec)>,
    rules: Vec<Box<dyn CallRule>>,
}

impl RuleRegistry {
    /// Registry with no APIs and no rules
    pub fn empty() -> Self {
        Self {
            exact: FxHashMap::default(),
            patterns: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Built-in API table and rules
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for (name, spec) in builtin_apis() {
            registry.exact.insert(name.to_string(), spec);
        }
        registry.register_rule(Box::new(UnboundedCopyRule));
        registry.register_rule(Box::new(OversizedBoundRule));
        registry.register_rule(Box::new(UnboundedFormatRule));
        registry.register_rule(Box::new(FormatStringInjectionRule));
        registry.register_rule(Box::new(DangerousInputRule));
        registry
    }

    /// Built-ins plus the configured extra allocators, deallocators and
    /// input sources
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let mut registry = Self::with_builtins();
        for name in &config.extra_allocators {
            registry.register_api(CalleePattern::exact(name.as_str()), ApiSpec::allocator());
        }
        for name in &config.extra_deallocators {
            registry.register_api(CalleePattern::exact(name.as_str()), ApiSpec::deallocator());
        }
        for name in &config.extra_input_sources {
            registry.register_api(CalleePattern::exact(name.as_str()), ApiSpec::taint_source());
        }
        debug!(
            apis = registry.api_count(),
            rules = registry.rules.len(),
            "rule registry built"
        );
        registry
    }

    /// Add or replace an API description
    pub fn register_api(&mut self, pattern: CalleePattern, spec: ApiSpec) {
        match pattern {
            CalleePattern::Exact(name) => {
                self.exact.insert(name, spec);
            }
            other => self.patterns.push((other, spec)),
        }
    }

    pub fn register_rule(&mut self, rule: Box<dyn CallRule>) {
        self.rules.push(rule);
    }

    pub fn resolve(&self, callee: &str) -> Option<&ApiSpec> {
        self.exact.get(callee).or_else(|| {
            self.patterns
                .iter()
                .find(|(pattern, _)| pattern.matches(callee))
                .map(|(_, spec)| spec)
        })
    }

    /// Findings of every applicable rule, in registration order
    pub fn check(&self, call: &ResolvedCall<'_>) -> Vec<Finding> {
        self.rules
            .iter()
            .filter(|rule| rule.applies(call.callee, call.spec))
            .filter_map(|rule| rule.check(call))
            .collect()
    }

    pub fn api_count(&self) -> usize {
        self.exact.len() + self.patterns.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("apis", &self.api_count())
            .field("rules", &self.rules.iter().map(|r| r.id()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reporting::RuleId;
    use crate::features::rules::domain::{ApiClass, ArgFact};
    use crate::features::rules::infrastructure::PatternRule;
    use crate::shared::models::Location;

    #[test]
    fn test_exact_before_pattern() {
        let mut registry = RuleRegistry::with_builtins();
        registry.register_api(CalleePattern::prefix("str"), ApiSpec::library());
        assert_eq!(registry.resolve("strcpy").unwrap().class, ApiClass::Copy);
        assert_eq!(registry.resolve("strfoo").unwrap().class, ApiClass::Library);
        assert!(registry.resolve("do_stuff").is_none());
    }

    #[test]
    fn test_config_extras() {
        let config = AnalysisConfig {
            extra_allocators: vec!["xmalloc".to_string()],
            extra_deallocators: vec!["xfree".to_string()],
            ..AnalysisConfig::default()
        };
        let registry = RuleRegistry::from_config(&config);
        assert_eq!(registry.resolve("xmalloc").unwrap().class, ApiClass::Allocator);
        assert_eq!(registry.resolve("xfree").unwrap().class, ApiClass::Deallocator);
    }

    #[test]
    fn test_custom_rule_runs_on_unknown_callee() {
        let mut registry = RuleRegistry::with_builtins();
        registry.register_rule(Box::new(PatternRule::new(
            RuleId::Custom("no-system".to_string()),
            CalleePattern::exact("system"),
            |call| {
                Some(Finding::new(
                    RuleId::Custom("no-system".to_string()),
                    call.function,
                    call.location,
                    "system() call",
                ))
            },
        )));
        let call = ResolvedCall {
            callee: "system",
            spec: registry.resolve("system"),
            function: "main",
            location: Location::line(4),
            args: vec![ArgFact::opaque("cmd")],
        };
        let findings = registry.check(&call);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id().as_str(), "no-system");
    }
}
