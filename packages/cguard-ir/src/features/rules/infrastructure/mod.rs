mod api_table;
mod copy_rules;
mod format_rules;
mod input_rules;
mod pattern_rule;

pub use api_table::{builtin_apis, BUILTIN_APIS};
pub use copy_rules::{OversizedBoundRule, UnboundedCopyRule};
pub use format_rules::{FormatStringInjectionRule, UnboundedFormatRule};
pub use input_rules::{unbounded_scan_conversions, DangerousInputRule};
pub use pattern_rule::PatternRule;
