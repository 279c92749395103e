/*
 * Dangerous input rule
 *
 * `gets` has no bound at all. A scan-family call is equally unbounded
 * when its literal format has a `%s` or `%[` conversion without a width.
 */

use crate::features::reporting::{Finding, RuleId};
use crate::features::rules::domain::{ApiClass, ApiSpec, ResolvedCall};
use crate::features::rules::ports::CallRule;

#[derive(Debug, Default, Clone, Copy)]
pub struct DangerousInputRule;

impl CallRule for DangerousInputRule {
    fn id(&self) -> RuleId {
        RuleId::DangerousInputFunction
    }

    fn applies(&self, _callee: &str, spec: Option<&ApiSpec>) -> bool {
        matches!(
            spec.map(|s| s.class),
            Some(ApiClass::UnboundedInput | ApiClass::ScanInput)
        )
    }

    fn check(&self, call: &ResolvedCall<'_>) -> Option<Finding> {
        let spec = call.spec?;
        let message = match spec.class {
            ApiClass::UnboundedInput => format!(
                "{}() reads input with no length limit; use fgets() with the buffer size",
                call.callee
            ),
            ApiClass::ScanInput => {
                let format = call.format()?.literal_text.as_deref()?;
                let count = unbounded_scan_conversions(format);
                if count == 0 {
                    return None;
                }
                format!(
                    "{}() format \"{}\" has {} string conversion(s) without a field width",
                    call.callee, format, count
                )
            }
            _ => return None,
        };
        Some(Finding::new(self.id(), call.function, call.location, message))
    }
}

/// Number of `%s` / `%[` conversions without a maximum field width
pub fn unbounded_scan_conversions(format: &str) -> usize {
    let mut count = 0;
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            continue;
        }
        let suppressed = chars.next_if_eq(&'*').is_some();
        let mut has_width = false;
        while chars.next_if(|c| c.is_ascii_digit()).is_some() {
            has_width = true;
        }
        while chars
            .next_if(|c| matches!(*c, 'h' | 'l' | 'L' | 'z' | 'j' | 't' | 'q' | 'm'))
            .is_some()
        {}
        if let Some(conv) = chars.next() {
            if matches!(conv, 's' | '[') && !has_width && !suppressed {
                count += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_conversions() {
        assert_eq!(unbounded_scan_conversions("%s"), 1);
        assert_eq!(unbounded_scan_conversions("%99s"), 0);
        assert_eq!(unbounded_scan_conversions("%d %s %[^\n]"), 2);
        assert_eq!(unbounded_scan_conversions("%*s %ls"), 1);
        assert_eq!(unbounded_scan_conversions("100%% %d"), 0);
    }
}
