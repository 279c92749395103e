//! Rule identifiers

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{BugClass, Severity};

/// Identifier of the rule that produced a finding
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleId {
    UnboundedCopy,
    OversizedBound,
    UnboundedFormat,
    FormatStringInjection,
    DangerousInputFunction,
    UncheckedAllocationUse,
    LeakedAllocation,
    UseAfterFree,
    DoubleFree,
    ArrayIndexOutOfBounds,
    LoopOffByOne,
    /// Rule registered through the extension point
    Custom(String),
}

impl RuleId {
    pub const BUILT_IN: [RuleId; 11] = [
        RuleId::UnboundedCopy,
        RuleId::OversizedBound,
        RuleId::UnboundedFormat,
        RuleId::FormatStringInjection,
        RuleId::DangerousInputFunction,
        RuleId::UncheckedAllocationUse,
        RuleId::LeakedAllocation,
        RuleId::UseAfterFree,
        RuleId::DoubleFree,
        RuleId::ArrayIndexOutOfBounds,
        RuleId::LoopOffByOne,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            RuleId::UnboundedCopy => "unbounded-copy",
            RuleId::OversizedBound => "oversized-bound",
            RuleId::UnboundedFormat => "unbounded-format",
            RuleId::FormatStringInjection => "format-string-injection",
            RuleId::DangerousInputFunction => "dangerous-input-function",
            RuleId::UncheckedAllocationUse => "unchecked-allocation-use",
            RuleId::LeakedAllocation => "leaked-allocation",
            RuleId::UseAfterFree => "use-after-free",
            RuleId::DoubleFree => "double-free",
            RuleId::ArrayIndexOutOfBounds => "array-index-out-of-bounds",
            RuleId::LoopOffByOne => "loop-off-by-one",
            RuleId::Custom(id) => id,
        }
    }

    /// Parse a rule id; unrecognized ids become `Custom`
    pub fn parse(s: &str) -> Self {
        RuleId::BUILT_IN
            .iter()
            .find(|id| id.as_str() == s)
            .cloned()
            .unwrap_or_else(|| RuleId::Custom(s.to_string()))
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            RuleId::DangerousInputFunction => Severity::Critical,
            RuleId::UnboundedCopy
            | RuleId::OversizedBound
            | RuleId::FormatStringInjection
            | RuleId::UseAfterFree
            | RuleId::DoubleFree
            | RuleId::ArrayIndexOutOfBounds
            | RuleId::LoopOffByOne => Severity::High,
            RuleId::UnboundedFormat
            | RuleId::UncheckedAllocationUse
            | RuleId::LeakedAllocation
            | RuleId::Custom(_) => Severity::Medium,
        }
    }

    pub fn bug_class(&self) -> BugClass {
        match self {
            RuleId::UnboundedCopy | RuleId::OversizedBound => BugClass::UnsafeCopy,
            RuleId::UnboundedFormat => BugClass::UnboundedFormatting,
            RuleId::FormatStringInjection => BugClass::FormatStringInjection,
            RuleId::DangerousInputFunction => BugClass::DangerousInput,
            RuleId::UncheckedAllocationUse => BugClass::NullDereference,
            RuleId::LeakedAllocation => BugClass::MemoryLeak,
            RuleId::UseAfterFree => BugClass::UseAfterFree,
            RuleId::DoubleFree => BugClass::DoubleFree,
            RuleId::ArrayIndexOutOfBounds | RuleId::LoopOffByOne => BugClass::OutOfBoundsAccess,
            RuleId::Custom(_) => BugClass::Other,
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RuleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RuleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(RuleId::parse(&s))
    }
}
