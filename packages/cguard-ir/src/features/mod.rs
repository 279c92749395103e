//! Feature slices
//!
//! Leaves first: `c_ir` (input contract) and `facts` (fact model) have no
//! dependencies on the other slices; `tracker` drives `rules` and `bounds`
//! and streams into `reporting`.

pub mod bounds;
pub mod c_ir;
pub mod evaluator;
pub mod facts;
pub mod reporting;
pub mod rules;
pub mod tracker;
