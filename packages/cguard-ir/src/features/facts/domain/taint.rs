//! Value provenance

use serde::{Deserialize, Serialize};

use super::StringLiteralFact;

/// Provenance tag on a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaintLabel {
    /// Compile-time constant data
    Literal,
    /// Parameters, input APIs and other uncontrolled sources
    ExternalInput,
    Unknown,
}

impl TaintLabel {
    /// Join of two labels: `ExternalInput` dominates, then `Unknown`
    pub fn join(self, other: TaintLabel) -> TaintLabel {
        match (self, other) {
            (TaintLabel::ExternalInput, _) | (_, TaintLabel::ExternalInput) => {
                TaintLabel::ExternalInput
            }
            (TaintLabel::Unknown, _) | (_, TaintLabel::Unknown) => TaintLabel::Unknown,
            _ => TaintLabel::Literal,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, TaintLabel::Literal)
    }
}

impl std::fmt::Display for TaintLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaintLabel::Literal => write!(f, "literal"),
            TaintLabel::ExternalInput => write!(f, "external input"),
            TaintLabel::Unknown => write!(f, "unknown"),
        }
    }
}

/// What is known about the contents of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueFact {
    pub label: TaintLabel,
    /// Set when the value is (a copy of) a known literal
    pub literal: Option<StringLiteralFact>,
}

impl ValueFact {
    pub fn literal(fact: StringLiteralFact) -> Self {
        Self {
            label: TaintLabel::Literal,
            literal: Some(fact),
        }
    }

    pub fn labeled(label: TaintLabel) -> Self {
        Self {
            label,
            literal: None,
        }
    }

    pub fn external() -> Self {
        Self::labeled(TaintLabel::ExternalInput)
    }

    pub fn unknown() -> Self {
        Self::labeled(TaintLabel::Unknown)
    }

    pub fn join(&self, other: &ValueFact) -> ValueFact {
        ValueFact {
            label: self.label.join(other.label),
            literal: if self.literal == other.literal {
                self.literal
            } else {
                None
            },
        }
    }
}
