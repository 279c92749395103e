/*
 * Evaluator Ports
 */

/// Variable sizes visible to the evaluator.
///
/// The tracker implements this over its fact table so `sizeof(buf)` folds
/// to the declared size of `buf`.
pub trait ConstEnv {
    /// `sizeof(name)` in bytes for a declared variable
    fn sizeof_var(&self, name: &str) -> Option<u64>;
}

/// Environment without variables (types and literals only)
pub struct EmptyEnv;

impl ConstEnv for EmptyEnv {
    fn sizeof_var(&self, _name: &str) -> Option<u64> {
        None
    }
}
