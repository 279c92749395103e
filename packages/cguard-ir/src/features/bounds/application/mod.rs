mod range_checker;

pub use range_checker::{LoopContext, RangeChecker};
