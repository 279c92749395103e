/*
 * Fact Model
 *
 * Typed facts the tracker records per function:
 * - Buffer / Capacity: storage locations and how much they hold
 * - PointerState: allocation lifecycle (finite-state machine)
 * - TaintLabel / ValueFact: provenance of values
 * - StringLiteralFact: literal byte lengths
 * - IndexFact: classification of array index expressions
 *
 * All facts are scoped to one function analysis and discarded afterwards.
 */

pub mod domain;

pub use domain::{
    Buffer, BufferOrigin, Capacity, IndexFact, LifecycleViolation, PointerEvent, PointerState,
    StringLiteralFact, TaintLabel, Transition, ValueFact,
};
