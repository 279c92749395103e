mod buffer;
mod index;
mod literal;
mod pointer;
mod taint;

pub use buffer::{Buffer, BufferOrigin, Capacity};
pub use index::IndexFact;
pub use literal::StringLiteralFact;
pub use pointer::{LifecycleViolation, PointerEvent, PointerState, Transition};
pub use taint::{TaintLabel, ValueFact};
