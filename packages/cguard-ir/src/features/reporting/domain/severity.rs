//! Severity and bug classes

use serde::{Deserialize, Serialize};

/// Finding severity. Declaration order is display order: `Critical` sorts
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// Numeric weight (higher is more severe)
    pub fn weight(&self) -> u8 {
        match self {
            Severity::Critical => 3,
            Severity::High => 2,
            Severity::Medium => 1,
            Severity::Low => 0,
        }
    }

    /// Whether `self` is at least as severe as `threshold`
    pub fn at_least(&self, threshold: Severity) -> bool {
        self.weight() >= threshold.weight()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    /// Parse severity from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            _ => Err(format!(
                "Unknown severity '{}'. Valid: critical, high, medium, low",
                s
            )),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Defect class a finding belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BugClass {
    UnsafeCopy,
    OutOfBoundsAccess,
    MemoryLeak,
    UseAfterFree,
    DoubleFree,
    NullDereference,
    FormatStringInjection,
    DangerousInput,
    UnboundedFormatting,
    /// Classes contributed by custom rules
    Other,
}

impl std::fmt::Display for BugClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BugClass::UnsafeCopy => "unsafe copy",
            BugClass::OutOfBoundsAccess => "out-of-bounds access",
            BugClass::MemoryLeak => "memory leak",
            BugClass::UseAfterFree => "use after free",
            BugClass::DoubleFree => "double free",
            BugClass::NullDereference => "null dereference",
            BugClass::FormatStringInjection => "format-string injection",
            BugClass::DangerousInput => "dangerous input function",
            BugClass::UnboundedFormatting => "unbounded formatting",
            BugClass::Other => "other",
        };
        f.write_str(s)
    }
}
