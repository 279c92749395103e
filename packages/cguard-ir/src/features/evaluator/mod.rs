/*
 * Literal & Capacity Evaluator
 *
 * Static sizes for arrays, struct members and heap blocks, and byte lengths
 * for string literals:
 * - literal_length: decoded length + 1 for literals, None otherwise
 * - capacity_of: capacity recorded on a Buffer fact
 * - eval_const: integer folding over literals, sizeof and + - * / %
 * - allocation_bytes: size argument(s) of an allocator call
 */

pub mod infrastructure;
pub mod ports;

pub use infrastructure::{allocation_bytes, capacity_of, eval_const, literal_length, sizeof_type};
pub use ports::{ConstEnv, EmptyEnv};
