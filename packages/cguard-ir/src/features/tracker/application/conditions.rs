//! Null-test recognition for branch refinement

use crate::features::c_ir::{CmpOp, Expr};

/// What a condition proves about a pointer when it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NullTest {
    IsNull(String),
    NotNull(String),
}

impl NullTest {
    pub fn negate(self) -> NullTest {
        match self {
            NullTest::IsNull(name) => NullTest::NotNull(name),
            NullTest::NotNull(name) => NullTest::IsNull(name),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            NullTest::IsNull(name) | NullTest::NotNull(name) => name,
        }
    }
}

/// `p == NULL`, `NULL == p`, `!p` → IsNull; `p != NULL`, `NULL != p`,
/// `p` → NotNull. Anything else (including calls compared with NULL)
/// proves nothing.
pub fn null_test(condition: &Expr) -> Option<NullTest> {
    match condition {
        Expr::Ident(name) => Some(NullTest::NotNull(name.clone())),
        Expr::Not(inner) => null_test(inner).map(NullTest::negate),
        Expr::Cmp { op, lhs, rhs } => {
            let name = match (lhs.as_ident(), rhs.as_ident()) {
                (Some(name), None) if rhs.is_null_constant() => name,
                (None, Some(name)) if lhs.is_null_constant() => name,
                _ => return None,
            };
            match op {
                CmpOp::Eq => Some(NullTest::IsNull(name.to_string())),
                CmpOp::Ne => Some(NullTest::NotNull(name.to_string())),
                _ => None,
            }
        }
        _ => None,
    }
}
