//! Malformed-input errors
//!
//! Fatal for the offending function only; the pipeline records a failure
//! entry and continues with the remaining units.

use thiserror::Error;

/// Function unit rejected before analysis
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseInputError {
    /// Front end reported a syntax error inside the function body
    #[error("syntax error in function '{function}' at line {line}")]
    SyntaxError { function: String, line: u32 },

    /// Unit without a function name
    #[error("function unit has no name")]
    EmptyName,

    /// Array declared with a zero dimension
    #[error("array '{name}' in function '{function}' has a zero dimension")]
    InvalidDimension { function: String, name: String },

    /// Two parameters share a name
    #[error("duplicate parameter '{parameter}' in function '{function}'")]
    DuplicateParameter { function: String, parameter: String },
}
