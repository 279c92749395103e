/*
 * C IR Ports
 *
 * Interfaces for external front ends.
 */

use crate::errors::Result;
use crate::features::c_ir::domain::FunctionUnit;

/// Producer of function units from source text.
///
/// Implementations report malformed functions through
/// `FunctionUnit::syntax_errors` rather than failing the whole file.
pub trait FrontEnd {
    fn lower(&mut self, source: &str) -> Result<Vec<FunctionUnit>>;
}
