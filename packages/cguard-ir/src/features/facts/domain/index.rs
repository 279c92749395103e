//! Array index classification

use serde::{Deserialize, Serialize};

use crate::features::c_ir::{CmpOp, Expr};

/// Classification of the index in `name[expr]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexFact {
    ConstantInBounds(i64),
    ConstantOutOfBounds(i64),
    /// Index driven by a counted loop's variable; `offset` is the constant
    /// added to it (`arr[i + 1]` → 1)
    LoopBound {
        var: String,
        op: CmpOp,
        bound: Expr,
        offset: i64,
    },
    Unknown,
}

impl IndexFact {
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, IndexFact::ConstantOutOfBounds(_))
    }
}
