/*
 * Array-Index Range Checker
 *
 * Constant indices are compared with the declared capacity directly. An
 * index driven by a counted loop's variable is checked through the
 * interval the loop header admits for that variable:
 *
 *   for (i = 0; i <  N; i++)  →  i ∈ [0, N-1]
 *   for (i = 0; i <= N; i++)  →  i ∈ [0, N]      (reaches N: off by one)
 *   for (i = N; i >= 0; i--)  →  i ∈ [0, N]
 *
 * Unknown capacities and unknown bounds abstain.
 */

pub mod application;
pub mod domain;

pub use application::{LoopContext, RangeChecker};
pub use domain::Interval;
