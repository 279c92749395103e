/*
 * Formatting rules
 */

use crate::features::reporting::{Finding, RuleId};
use crate::features::rules::domain::{ApiClass, ApiSpec, ResolvedCall};
use crate::features::rules::ports::CallRule;

/// Formatting into a buffer of known capacity with no size argument. A
/// destination whose capacity is unknown (a pointer parameter) abstains.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnboundedFormatRule;

impl CallRule for UnboundedFormatRule {
    fn id(&self) -> RuleId {
        RuleId::UnboundedFormat
    }

    fn applies(&self, _callee: &str, spec: Option<&ApiSpec>) -> bool {
        matches!(spec.map(|s| s.class), Some(ApiClass::Format))
    }

    fn check(&self, call: &ResolvedCall<'_>) -> Option<Finding> {
        let dest = call.dest()?;
        let capacity = dest.byte_capacity().known()?;
        Some(
            Finding::new(
                self.id(),
                call.function,
                call.location,
                format!(
                    "{}() writes into '{}' (capacity {}) without a size limit",
                    call.callee, dest.rendered, capacity
                ),
            )
            .with_subject(dest.rendered.as_str()),
        )
    }
}

/// Format argument not known to be a literal
#[derive(Debug, Default, Clone, Copy)]
pub struct FormatStringInjectionRule;

impl CallRule for FormatStringInjectionRule {
    fn id(&self) -> RuleId {
        RuleId::FormatStringInjection
    }

    fn applies(&self, _callee: &str, spec: Option<&ApiSpec>) -> bool {
        matches!(
            spec.map(|s| s.class),
            Some(ApiClass::Format | ApiClass::BoundedFormat | ApiClass::Print | ApiClass::ScanInput)
        )
    }

    fn check(&self, call: &ResolvedCall<'_>) -> Option<Finding> {
        let format = call.format()?;
        if format.label.is_literal() {
            return None;
        }
        Some(
            Finding::new(
                self.id(),
                call.function,
                call.location,
                format!(
                    "format string of {}() is '{}' ({}), not a literal",
                    call.callee, format.rendered, format.label
                ),
            )
            .with_subject(format.rendered.as_str()),
        )
    }
}
