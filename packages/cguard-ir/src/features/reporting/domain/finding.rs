/*
 * Finding
 *
 * One reported violation at one call or access site. Fields are private:
 * a finding is never mutated after it is emitted.
 */

use serde::{Deserialize, Serialize};

use super::{BugClass, RuleId, Severity};
use crate::shared::models::Location;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finding {
    rule_id: RuleId,
    severity: Severity,
    bug_class: BugClass,
    function: String,
    location: Location,
    message: String,
    /// Variable or access path the finding is about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
}

impl Finding {
    /// Finding with the rule's default severity and bug class
    pub fn new(
        rule_id: RuleId,
        function: impl Into<String>,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        let severity = rule_id.default_severity();
        let bug_class = rule_id.bug_class();
        Self::classified(rule_id, severity, bug_class, function, location, message)
    }

    /// Finding with explicit classification (custom rules)
    pub fn classified(
        rule_id: RuleId,
        severity: Severity,
        bug_class: BugClass,
        function: impl Into<String>,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id,
            severity,
            bug_class,
            function: function.into(),
            location,
            message: message.into(),
            subject: None,
        }
    }

    /// Attach the variable or access path the finding is about. Findings on
    /// the same statement stay distinct when their subjects differ.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn rule_id(&self) -> &RuleId {
        &self.rule_id
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn bug_class(&self) -> BugClass {
        self.bug_class
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Format for display
    pub fn format_message(&self) -> String {
        format!(
            "{} [{}] {}() line {}: {}",
            self.severity.as_str().to_uppercase(),
            self.rule_id,
            self.function,
            self.location.line,
            self.message
        )
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_rule_defaults() {
        let finding = Finding::new(
            RuleId::DoubleFree,
            "double_free_bug",
            Location::line(188),
            "'data' freed twice",
        );
        assert_eq!(finding.severity(), Severity::High);
        assert_eq!(finding.bug_class(), BugClass::DoubleFree);
        assert_eq!(finding.function(), "double_free_bug");
        assert_eq!(finding.subject(), None);
    }

    #[test]
    fn test_subject_is_serialized_only_when_set() {
        let bare = Finding::new(RuleId::UseAfterFree, "f", Location::line(3), "msg");
        let json = serde_json::to_string(&bare).unwrap();
        assert!(!json.contains("subject"));

        let named = bare.with_subject("q");
        assert_eq!(named.subject(), Some("q"));
        let json = serde_json::to_string(&named).unwrap();
        assert!(json.contains("\"subject\":\"q\""));
        let back: Finding = serde_json::from_str(&json).unwrap();
        assert_eq!(back, named);
    }

    #[test]
    fn test_format_message() {
        let finding = Finding::new(
            RuleId::DangerousInputFunction,
            "f",
            Location::line(42),
            "gets() has no bound",
        );
        let msg = finding.format_message();
        assert!(msg.contains("CRITICAL"));
        assert!(msg.contains("dangerous-input-function"));
        assert!(msg.contains("line 42"));
    }
}
