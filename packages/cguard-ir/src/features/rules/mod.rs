/*
 * Call-Site Rule Engine
 *
 * A registry keyed by callee name. Each call site is resolved once to an
 * `ApiSpec` (argument roles + API class); every rule that applies to the
 * class then inspects the resolved argument facts and returns at most one
 * finding.
 *
 * Architecture:
 * - Domain: ApiClass, ApiSpec, CalleePattern, ResolvedCall, ArgFact
 * - Ports: CallRule trait (extension point)
 * - Infrastructure: built-in API table and rules
 * - Application: RuleRegistry
 *
 * | Rule                      | Classes                         | Severity |
 * |---------------------------|---------------------------------|----------|
 * | unbounded-copy            | Copy                            | High     |
 * | oversized-bound           | BoundedCopy/Input/Format        | High     |
 * | unbounded-format          | Format                          | Medium   |
 * | format-string-injection   | Format/BoundedFormat/Print/Scan | High     |
 * | dangerous-input-function  | UnboundedInput/Scan             | Critical |
 */

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::RuleRegistry;
pub use domain::{ApiClass, ApiSpec, ArgFact, CalleePattern, ResolvedCall};
pub use infrastructure::{
    DangerousInputRule, FormatStringInjectionRule, OversizedBoundRule, PatternRule,
    UnboundedCopyRule, UnboundedFormatRule,
};
pub use ports::CallRule;
