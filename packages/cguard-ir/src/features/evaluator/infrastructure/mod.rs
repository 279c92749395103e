mod const_eval;
mod type_sizes;

pub use const_eval::{allocation_bytes, capacity_of, eval_const, literal_length};
pub use type_sizes::sizeof_type;
