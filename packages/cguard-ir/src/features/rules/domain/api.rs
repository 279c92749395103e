/*
 * API descriptions
 *
 * An ApiSpec names the role of each argument position so rules can ask for
 * "the destination" or "the format string" without knowing the callee.
 */

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Behavioral class of a library API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiClass {
    /// Copy without a length argument (`strcpy`, `strcat`)
    Copy,
    /// Copy with an explicit length (`strncpy`, `memcpy`)
    BoundedCopy,
    /// Formatting into a buffer without a size (`sprintf`)
    Format,
    /// Formatting into a buffer with a size (`snprintf`)
    BoundedFormat,
    /// Formatting to a stream (`printf`, `fprintf`)
    Print,
    /// Input with no caller-supplied bound (`gets`)
    UnboundedInput,
    /// Input with a caller-supplied bound (`fgets`, `read`)
    BoundedInput,
    /// Format-driven input (`scanf` family)
    ScanInput,
    Allocator,
    Deallocator,
    /// Returns uncontrolled data (`getenv`)
    TaintSource,
    /// Known routine that neither retains nor frees its arguments
    Library,
}

/// Argument roles of an API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSpec {
    pub class: ApiClass,
    pub dest: Option<usize>,
    pub source: Option<usize>,
    pub bound: Option<usize>,
    pub format: Option<usize>,
    /// First argument written by a scan-style input call
    pub first_output: Option<usize>,
    /// Writes after the existing contents (`strcat`, `strncat`)
    pub appends: bool,
}

impl ApiSpec {
    fn of(class: ApiClass) -> Self {
        Self {
            class,
            dest: None,
            source: None,
            bound: None,
            format: None,
            first_output: None,
            appends: false,
        }
    }

    /// Mark a copy as appending to its destination
    pub fn appending(mut self) -> Self {
        self.appends = true;
        self
    }

    pub fn copy(dest: usize, source: usize) -> Self {
        Self {
            dest: Some(dest),
            source: Some(source),
            ..Self::of(ApiClass::Copy)
        }
    }

    pub fn bounded_copy(dest: usize, source: Option<usize>, bound: usize) -> Self {
        Self {
            dest: Some(dest),
            source,
            bound: Some(bound),
            ..Self::of(ApiClass::BoundedCopy)
        }
    }

    pub fn format(dest: usize, format: usize) -> Self {
        Self {
            dest: Some(dest),
            format: Some(format),
            ..Self::of(ApiClass::Format)
        }
    }

    pub fn bounded_format(dest: usize, bound: usize, format: usize) -> Self {
        Self {
            dest: Some(dest),
            bound: Some(bound),
            format: Some(format),
            ..Self::of(ApiClass::BoundedFormat)
        }
    }

    pub fn print(format: usize) -> Self {
        Self {
            format: Some(format),
            ..Self::of(ApiClass::Print)
        }
    }

    pub fn unbounded_input(dest: usize) -> Self {
        Self {
            dest: Some(dest),
            ..Self::of(ApiClass::UnboundedInput)
        }
    }

    pub fn bounded_input(dest: usize, bound: Option<usize>) -> Self {
        Self {
            dest: Some(dest),
            bound,
            ..Self::of(ApiClass::BoundedInput)
        }
    }

    pub fn scan(format: usize, first_output: usize) -> Self {
        Self {
            format: Some(format),
            first_output: Some(first_output),
            ..Self::of(ApiClass::ScanInput)
        }
    }

    pub fn allocator() -> Self {
        Self::of(ApiClass::Allocator)
    }

    pub fn deallocator() -> Self {
        Self::of(ApiClass::Deallocator)
    }

    pub fn taint_source() -> Self {
        Self::of(ApiClass::TaintSource)
    }

    pub fn library() -> Self {
        Self::of(ApiClass::Library)
    }

    /// Whether the routine reads or writes through its pointer arguments
    pub fn dereferences_args(&self) -> bool {
        !matches!(
            self.class,
            ApiClass::Allocator | ApiClass::Deallocator | ApiClass::TaintSource
        )
    }

    /// Argument indices the call fills with uncontrolled data
    pub fn input_targets(&self, arg_count: usize) -> Vec<usize> {
        match self.class {
            ApiClass::UnboundedInput | ApiClass::BoundedInput => self.dest.into_iter().collect(),
            ApiClass::ScanInput => match self.first_output {
                Some(first) => (first..arg_count).collect(),
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }
}

/// Callee-name matcher
#[derive(Debug, Clone)]
pub enum CalleePattern {
    Exact(String),
    Prefix(String),
    Regex(Regex),
}

impl CalleePattern {
    pub fn exact(name: impl Into<String>) -> Self {
        CalleePattern::Exact(name.into())
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        CalleePattern::Prefix(prefix.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(CalleePattern::Regex(Regex::new(pattern)?))
    }

    pub fn matches(&self, callee: &str) -> bool {
        match self {
            CalleePattern::Exact(name) => name == callee,
            CalleePattern::Prefix(prefix) => callee.starts_with(prefix.as_str()),
            CalleePattern::Regex(re) => re.is_match(callee),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns() {
        assert!(CalleePattern::exact("strcpy").matches("strcpy"));
        assert!(!CalleePattern::exact("strcpy").matches("strncpy"));
        assert!(CalleePattern::prefix("xml_").matches("xml_alloc"));
        let re = CalleePattern::regex(r"^my_(str|mem)cpy$").unwrap();
        assert!(re.matches("my_memcpy"));
        assert!(!re.matches("my_memcpy2"));
    }

    #[test]
    fn test_input_targets() {
        assert_eq!(ApiSpec::bounded_input(0, Some(1)).input_targets(3), vec![0]);
        assert_eq!(ApiSpec::scan(1, 2).input_targets(4), vec![2, 3]);
        assert!(ApiSpec::copy(0, 1).input_targets(2).is_empty());
    }

    #[test]
    fn test_dereferences_args() {
        assert!(ApiSpec::copy(0, 1).dereferences_args());
        assert!(ApiSpec::print(0).dereferences_args());
        assert!(!ApiSpec::deallocator().dereferences_args());
    }
}
