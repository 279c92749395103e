/*
 * Constant folding
 *
 * Folding never wraps: an overflowing operation yields `None`, which the
 * callers treat as an unknown fact.
 */

use super::sizeof_type;
use crate::features::c_ir::{BinOp, Expr};
use crate::features::evaluator::ports::ConstEnv;
use crate::features::facts::{Buffer, Capacity, StringLiteralFact};

/// Byte length of a string literal (terminator included); `None` for any
/// non-literal expression
pub fn literal_length(expr: &Expr) -> Option<StringLiteralFact> {
    match expr {
        Expr::StrLit(text) => Some(StringLiteralFact::of(text)),
        _ => None,
    }
}

/// Capacity recorded on a buffer fact, in elements
pub fn capacity_of(buffer: &Buffer) -> Capacity {
    buffer.element_capacity()
}

/// Fold an integer constant expression
pub fn eval_const(expr: &Expr, env: &dyn ConstEnv) -> Option<i64> {
    match expr {
        Expr::IntLit(value) => Some(*value),
        Expr::Null => Some(0),
        Expr::SizeofType(name) => env
            .sizeof_var(name)
            .or_else(|| sizeof_type(name))
            .and_then(|n| i64::try_from(n).ok()),
        Expr::SizeofExpr(inner) => match inner.as_ref() {
            Expr::Ident(name) => env.sizeof_var(name).and_then(|n| i64::try_from(n).ok()),
            Expr::StrLit(text) => i64::try_from(StringLiteralFact::of(text).byte_len()).ok(),
            _ => None,
        },
        Expr::Binary { op, lhs, rhs } => {
            let l = eval_const(lhs, env)?;
            let r = eval_const(rhs, env)?;
            match op {
                BinOp::Add => l.checked_add(r),
                BinOp::Sub => l.checked_sub(r),
                BinOp::Mul => l.checked_mul(r),
                BinOp::Div => l.checked_div(r),
                BinOp::Rem => l.checked_rem(r),
                BinOp::Other => None,
            }
        }
        _ => None,
    }
}

/// Bytes requested by an allocator call
pub fn allocation_bytes(callee: &str, args: &[Expr], env: &dyn ConstEnv) -> Capacity {
    let folded = match callee {
        "calloc" => match args {
            [count, size] => eval_const(count, env)
                .zip(eval_const(size, env))
                .and_then(|(c, s)| c.checked_mul(s)),
            _ => None,
        },
        "realloc" => args.get(1).and_then(|size| eval_const(size, env)),
        "strdup" | "strndup" => None,
        _ => args.first().and_then(|size| eval_const(size, env)),
    };

    match folded {
        Some(n) if n >= 0 => Capacity::Known(n as u64),
        _ => Capacity::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::evaluator::ports::EmptyEnv;

    struct OneVar;

    impl ConstEnv for OneVar {
        fn sizeof_var(&self, name: &str) -> Option<u64> {
            (name == "source").then_some(100)
        }
    }

    #[test]
    fn test_literal_length() {
        assert_eq!(literal_length(&Expr::str("Hello")).map(|f| f.byte_len()), Some(6));
        assert_eq!(literal_length(&Expr::ident("input")), None);
    }

    #[test]
    fn test_fold_sizeof_product() {
        let e = Expr::binary(BinOp::Mul, Expr::int(100), Expr::sizeof_type("int"));
        assert_eq!(eval_const(&e, &EmptyEnv), Some(400));
    }

    #[test]
    fn test_sizeof_variable_shadows_type_lookup() {
        assert_eq!(eval_const(&Expr::sizeof_type("source"), &OneVar), Some(100));
        assert_eq!(
            eval_const(&Expr::SizeofExpr(Box::new(Expr::ident("source"))), &OneVar),
            Some(100)
        );
        assert_eq!(eval_const(&Expr::sizeof_type("source"), &EmptyEnv), None);
    }

    #[test]
    fn test_overflow_is_unknown() {
        let e = Expr::binary(BinOp::Mul, Expr::int(i64::MAX), Expr::int(2));
        assert_eq!(eval_const(&e, &EmptyEnv), None);
        let e = Expr::binary(BinOp::Div, Expr::int(1), Expr::int(0));
        assert_eq!(eval_const(&e, &EmptyEnv), None);
    }

    #[test]
    fn test_allocation_bytes() {
        assert_eq!(
            allocation_bytes("malloc", &[Expr::int(1024)], &EmptyEnv),
            Capacity::Known(1024)
        );
        assert_eq!(
            allocation_bytes("calloc", &[Expr::int(10), Expr::sizeof_type("int")], &EmptyEnv),
            Capacity::Known(40)
        );
        assert_eq!(
            allocation_bytes("malloc", &[Expr::ident("n")], &EmptyEnv),
            Capacity::Unknown
        );
        assert_eq!(
            allocation_bytes("malloc", &[Expr::int(-1)], &EmptyEnv),
            Capacity::Unknown
        );
        assert_eq!(
            allocation_bytes("strdup", &[Expr::str("x")], &EmptyEnv),
            Capacity::Unknown
        );
    }
}
