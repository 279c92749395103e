mod finding;
mod rule_id;
mod severity;

pub use finding::Finding;
pub use rule_id::RuleId;
pub use severity::{BugClass, Severity};
