/*
 * Resolved call sites
 *
 * The tracker resolves every argument against the current fact table before
 * any rule runs; rules are pure functions of this value.
 */

use super::ApiSpec;
use crate::features::facts::{Buffer, Capacity, StringLiteralFact, TaintLabel};
use crate::shared::models::Location;

/// Facts about one argument
#[derive(Debug, Clone, PartialEq)]
pub struct ArgFact {
    /// Source-like rendering for messages
    pub rendered: String,
    /// Literal contents when the argument is a string literal
    pub literal_text: Option<String>,
    /// Known literal value (direct literal or variable holding one)
    pub literal: Option<StringLiteralFact>,
    pub label: TaintLabel,
    /// Storage the argument designates, when it names a buffer
    pub buffer: Option<Buffer>,
    /// Folded integer value
    pub constant: Option<i64>,
}

impl ArgFact {
    /// Argument with nothing known but its rendering
    pub fn opaque(rendered: impl Into<String>) -> Self {
        Self {
            rendered: rendered.into(),
            literal_text: None,
            literal: None,
            label: TaintLabel::Unknown,
            buffer: None,
            constant: None,
        }
    }

    /// String literal argument
    pub fn string_literal(text: &str) -> Self {
        Self {
            rendered: format!("{:?}", text),
            literal_text: Some(text.to_string()),
            literal: Some(StringLiteralFact::of(text)),
            label: TaintLabel::Literal,
            buffer: None,
            constant: None,
        }
    }

    /// Byte capacity of the designated buffer
    pub fn byte_capacity(&self) -> Capacity {
        self.buffer
            .as_ref()
            .map(|b| b.byte_capacity())
            .unwrap_or(Capacity::Unknown)
    }
}

/// Call site with resolved argument facts
#[derive(Debug, Clone)]
pub struct ResolvedCall<'a> {
    pub callee: &'a str,
    pub spec: Option<&'a ApiSpec>,
    pub function: &'a str,
    pub location: Location,
    pub args: Vec<ArgFact>,
}

impl<'a> ResolvedCall<'a> {
    pub fn arg(&self, index: usize) -> Option<&ArgFact> {
        self.args.get(index)
    }

    fn role(&self, pick: impl Fn(&ApiSpec) -> Option<usize>) -> Option<&ArgFact> {
        self.spec.and_then(pick).and_then(|i| self.args.get(i))
    }

    pub fn dest(&self) -> Option<&ArgFact> {
        self.role(|s| s.dest)
    }

    pub fn source(&self) -> Option<&ArgFact> {
        self.role(|s| s.source)
    }

    pub fn bound(&self) -> Option<&ArgFact> {
        self.role(|s| s.bound)
    }

    pub fn format(&self) -> Option<&ArgFact> {
        self.role(|s| s.format)
    }
}
