/*
 * Copy rules
 *
 * unbounded-copy: a length-unaware copy whose source may not fit.
 *   - literal source: compare literal length (terminator included) with
 *     the destination byte capacity; an exact fit is safe; an unknown
 *     destination abstains
 *   - non-literal source: flagged unless its label is Literal
 *
 * oversized-bound: a bounded call whose constant bound exceeds the
 * destination's byte capacity.
 */

use crate::features::facts::TaintLabel;
use crate::features::reporting::{Finding, RuleId};
use crate::features::rules::domain::{ApiClass, ApiSpec, ResolvedCall};
use crate::features::rules::ports::CallRule;

#[derive(Debug, Default, Clone, Copy)]
pub struct UnboundedCopyRule;

impl CallRule for UnboundedCopyRule {
    fn id(&self) -> RuleId {
        RuleId::UnboundedCopy
    }

    fn applies(&self, _callee: &str, spec: Option<&ApiSpec>) -> bool {
        matches!(spec.map(|s| s.class), Some(ApiClass::Copy))
    }

    fn check(&self, call: &ResolvedCall<'_>) -> Option<Finding> {
        let dest = call.dest()?;
        let source = call.source()?;

        let message = if let Some(literal) = source.literal {
            let capacity = dest.byte_capacity().known()?;
            // appending keeps the destination's current contents
            let existing = match (call.spec.is_some_and(|s| s.appends), dest.literal) {
                (true, Some(current)) => current.byte_len().saturating_sub(1),
                _ => 0,
            };
            let needed = literal.byte_len().saturating_add(existing);
            if needed <= capacity {
                return None;
            }
            format!(
                "{}() needs {} bytes (terminator included) in '{}' which holds {}",
                call.callee, needed, dest.rendered, capacity
            )
        } else {
            if source.label == TaintLabel::Literal {
                return None;
            }
            let origin = match source.label {
                TaintLabel::ExternalInput => "externally controlled",
                _ => "unknown-length",
            };
            format!(
                "{}() copies {} data from '{}' into '{}' without a length limit",
                call.callee, origin, source.rendered, dest.rendered
            )
        };

        Some(
            Finding::new(self.id(), call.function, call.location, message)
                .with_subject(dest.rendered.as_str()),
        )
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OversizedBoundRule;

impl CallRule for OversizedBoundRule {
    fn id(&self) -> RuleId {
        RuleId::OversizedBound
    }

    fn applies(&self, _callee: &str, spec: Option<&ApiSpec>) -> bool {
        matches!(
            spec.map(|s| s.class),
            Some(ApiClass::BoundedCopy | ApiClass::BoundedInput | ApiClass::BoundedFormat)
        )
    }

    fn check(&self, call: &ResolvedCall<'_>) -> Option<Finding> {
        let dest = call.dest()?;
        let bound = call.bound()?.constant?;
        let capacity = dest.byte_capacity().known()?;
        if bound < 0 || (bound as u64) <= capacity {
            return None;
        }
        Some(
            Finding::new(
                self.id(),
                call.function,
                call.location,
                format!(
                    "{}() is given a bound of {} bytes but '{}' holds {}",
                    call.callee, bound, dest.rendered, capacity
                ),
            )
            .with_subject(dest.rendered.as_str()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::facts::{Buffer, StringLiteralFact};
    use crate::features::rules::domain::ArgFact;
    use crate::shared::models::Location;

    fn buffer_arg(name: &str, bytes: u64) -> ArgFact {
        ArgFact {
            buffer: Some(Buffer::fixed(name, bytes, Some(1))),
            ..ArgFact::opaque(name)
        }
    }

    fn call<'a>(callee: &'a str, spec: &'a ApiSpec, args: Vec<ArgFact>) -> ResolvedCall<'a> {
        ResolvedCall {
            callee,
            spec: Some(spec),
            function: "f",
            location: Location::line(7),
            args,
        }
    }

    #[test]
    fn test_literal_fit_boundary() {
        let spec = ApiSpec::copy(0, 1);
        // "Hello" needs 6 bytes
        let exact = call("strcpy", &spec, vec![buffer_arg("b", 6), ArgFact::string_literal("Hello")]);
        assert!(UnboundedCopyRule.check(&exact).is_none());

        let short = call("strcpy", &spec, vec![buffer_arg("b", 5), ArgFact::string_literal("Hello")]);
        let finding = UnboundedCopyRule.check(&short).unwrap();
        assert_eq!(finding.rule_id(), &RuleId::UnboundedCopy);
        assert_eq!(finding.location(), Location::line(7));
    }

    #[test]
    fn test_unknown_destination_abstains_for_literal() {
        let spec = ApiSpec::copy(0, 1);
        let c = call("strcpy", &spec, vec![ArgFact::opaque("p"), ArgFact::string_literal("x")]);
        assert!(UnboundedCopyRule.check(&c).is_none());
    }

    #[test]
    fn test_non_literal_source_flagged_unless_literal_labeled() {
        let spec = ApiSpec::copy(0, 1);
        let input = ArgFact {
            label: TaintLabel::ExternalInput,
            ..ArgFact::opaque("input")
        };
        let c = call("strcpy", &spec, vec![buffer_arg("b", 10), input]);
        assert!(UnboundedCopyRule.check(&c).is_some());

        let constant = ArgFact {
            label: TaintLabel::Literal,
            literal: Some(StringLiteralFact::of("ok")),
            ..ArgFact::opaque("msg")
        };
        let c = call("strcpy", &spec, vec![buffer_arg("b", 10), constant]);
        assert!(UnboundedCopyRule.check(&c).is_none());
    }

    #[test]
    fn test_append_counts_existing_contents() {
        let spec = ApiSpec::copy(0, 1).appending();
        let dest = ArgFact {
            literal: Some(StringLiteralFact::of("abcd")),
            ..buffer_arg("b", 8)
        };
        // 4 existing + 4 appended + terminator = 9 > 8
        let c = call("strcat", &spec, vec![dest.clone(), ArgFact::string_literal("efgh")]);
        assert!(UnboundedCopyRule.check(&c).is_some());
        let c = call("strcat", &spec, vec![dest, ArgFact::string_literal("efg")]);
        assert!(UnboundedCopyRule.check(&c).is_none());
    }

    #[test]
    fn test_oversized_bound() {
        let spec = ApiSpec::bounded_copy(0, Some(1), 2);
        let bound = |n: i64| ArgFact {
            constant: Some(n),
            ..ArgFact::opaque(n.to_string())
        };
        let ok = call("strncpy", &spec, vec![buffer_arg("b", 16), ArgFact::opaque("s"), bound(16)]);
        assert!(OversizedBoundRule.check(&ok).is_none());
        let bad = call("strncpy", &spec, vec![buffer_arg("b", 16), ArgFact::opaque("s"), bound(17)]);
        assert!(OversizedBoundRule.check(&bad).is_some());
        let unknown = call("strncpy", &spec, vec![buffer_arg("b", 16), ArgFact::opaque("s"), ArgFact::opaque("n")]);
        assert!(OversizedBoundRule.check(&unknown).is_none());
    }
}
