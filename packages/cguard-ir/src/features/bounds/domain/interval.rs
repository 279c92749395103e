//! Loop-variable intervals

use serde::{Deserialize, Serialize};

use crate::features::c_ir::{CmpOp, LoopHeader, LoopStep};
use crate::features::evaluator::{eval_const, ConstEnv};

/// Values a loop variable takes inside the body; either end may be unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub lo: Option<i64>,
    pub hi: Option<i64>,
}

impl Interval {
    pub fn new(lo: i64, hi: i64) -> Self {
        Self {
            lo: Some(lo),
            hi: Some(hi),
        }
    }

    /// Interval admitted by a counted-loop header
    pub fn from_header(header: &LoopHeader, env: &dyn ConstEnv) -> Option<Interval> {
        let bound = eval_const(&header.bound, env)?;
        let init = header.init.as_ref().and_then(|e| eval_const(e, env));

        let (lo, hi) = match (header.step, header.op) {
            (LoopStep::Increment, CmpOp::Lt | CmpOp::Ne) => (init, bound.checked_sub(1)),
            (LoopStep::Increment, CmpOp::Le) => (init, Some(bound)),
            (LoopStep::Decrement, CmpOp::Gt | CmpOp::Ne) => (bound.checked_add(1), init),
            (LoopStep::Decrement, CmpOp::Ge) => (Some(bound), init),
            // direction unknown: only the side the condition guards
            (LoopStep::Unknown, CmpOp::Lt) => (None, bound.checked_sub(1)),
            (LoopStep::Unknown, CmpOp::Le) => (None, Some(bound)),
            (LoopStep::Unknown, CmpOp::Gt) => (bound.checked_add(1), None),
            (LoopStep::Unknown, CmpOp::Ge) => (Some(bound), None),
            _ => return None,
        };

        if lo.is_none() && hi.is_none() {
            return None;
        }
        Some(Interval { lo, hi })
    }

    /// Interval of `var + offset`
    pub fn shift(self, offset: i64) -> Option<Interval> {
        let lo = match self.lo {
            Some(v) => Some(v.checked_add(offset)?),
            None => None,
        };
        let hi = match self.hi {
            Some(v) => Some(v.checked_add(offset)?),
            None => None,
        };
        Some(Interval { lo, hi })
    }

    pub fn is_empty(&self) -> bool {
        matches!((self.lo, self.hi), (Some(lo), Some(hi)) if lo > hi)
    }

    /// Whether some value falls outside `[0, capacity)`
    pub fn exceeds(&self, capacity: u64) -> bool {
        if self.is_empty() {
            return false;
        }
        let cap = i64::try_from(capacity).unwrap_or(i64::MAX);
        self.hi.is_some_and(|hi| hi >= cap) || self.lo.is_some_and(|lo| lo < 0)
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |v: Option<i64>| v.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string());
        write!(f, "[{}, {}]", show(self.lo), show(self.hi))
    }
}
