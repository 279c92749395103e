/*
 * Expressions
 *
 * String literals hold their decoded contents (escape sequences resolved),
 * so byte lengths can be computed without re-lexing.
 */

use serde::{Deserialize, Serialize};

/// Arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    /// Bitwise, shift and logical operators (not folded)
    Other,
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CmpOp {
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "<" => Some(CmpOp::Lt),
            "<=" => Some(CmpOp::Le),
            ">" => Some(CmpOp::Gt),
            ">=" => Some(CmpOp::Ge),
            "==" => Some(CmpOp::Eq),
            "!=" => Some(CmpOp::Ne),
            _ => None,
        }
    }

    /// Operator with operands swapped (`a < b` ⇔ `b > a`)
    pub fn flipped(self) -> Self {
        match self {
            CmpOp::Lt => CmpOp::Gt,
            CmpOp::Le => CmpOp::Ge,
            CmpOp::Gt => CmpOp::Lt,
            CmpOp::Ge => CmpOp::Le,
            CmpOp::Eq => CmpOp::Eq,
            CmpOp::Ne => CmpOp::Ne,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
        }
    }
}

impl std::fmt::Display for CmpOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Call expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub callee: String,
    pub args: Vec<Expr>,
}

/// Expression tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    Ident(String),
    StrLit(String),
    IntLit(i64),
    /// `NULL` / `nullptr`
    Null,
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Field {
        base: Box<Expr>,
        field: String,
        arrow: bool,
    },
    Deref(Box<Expr>),
    AddrOf(Box<Expr>),
    Not(Box<Expr>),
    Call(Call),
    /// `sizeof(T)`; the name may also denote a variable when the grammar
    /// cannot tell the two apart
    SizeofType(String),
    SizeofExpr(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Cmp {
        op: CmpOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Unmodelled expression; children are still visited
    Opaque(Vec<Expr>),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn str(text: impl Into<String>) -> Self {
        Expr::StrLit(text.into())
    }

    pub fn int(value: i64) -> Self {
        Expr::IntLit(value)
    }

    pub fn call(callee: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call(Call {
            callee: callee.into(),
            args,
        })
    }

    pub fn index(base: Expr, index: Expr) -> Self {
        Expr::Index {
            base: Box::new(base),
            index: Box::new(index),
        }
    }

    pub fn field(base: Expr, field: impl Into<String>) -> Self {
        Expr::Field {
            base: Box::new(base),
            field: field.into(),
            arrow: false,
        }
    }

    pub fn arrow(base: Expr, field: impl Into<String>) -> Self {
        Expr::Field {
            base: Box::new(base),
            field: field.into(),
            arrow: true,
        }
    }

    pub fn deref(inner: Expr) -> Self {
        Expr::Deref(Box::new(inner))
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn cmp(op: CmpOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Cmp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn sizeof_type(name: impl Into<String>) -> Self {
        Expr::SizeofType(name.into())
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&Call> {
        match self {
            Expr::Call(call) => Some(call),
            _ => None,
        }
    }

    /// `NULL` or the integer constant 0
    pub fn is_null_constant(&self) -> bool {
        matches!(self, Expr::Null | Expr::IntLit(0))
    }

    /// Variable the expression ultimately reads from (`a` in `a[i].f`)
    pub fn root_name(&self) -> Option<&str> {
        match self {
            Expr::Ident(name) => Some(name),
            Expr::Index { base, .. } | Expr::Field { base, .. } => base.root_name(),
            Expr::Deref(inner) | Expr::AddrOf(inner) => inner.root_name(),
            _ => None,
        }
    }

    /// Short source-like rendering used in messages
    pub fn render(&self) -> String {
        match self {
            Expr::Ident(name) => name.clone(),
            Expr::StrLit(text) => format!("{:?}", text),
            Expr::IntLit(value) => value.to_string(),
            Expr::Null => "NULL".to_string(),
            Expr::Index { base, index } => format!("{}[{}]", base.render(), index.render()),
            Expr::Field { base, field, arrow } => {
                format!("{}{}{}", base.render(), if *arrow { "->" } else { "." }, field)
            }
            Expr::Deref(inner) => format!("*{}", inner.render()),
            Expr::AddrOf(inner) => format!("&{}", inner.render()),
            Expr::Not(inner) => format!("!{}", inner.render()),
            Expr::Call(call) => format!("{}(...)", call.callee),
            Expr::SizeofType(name) => format!("sizeof({})", name),
            Expr::SizeofExpr(inner) => format!("sizeof({})", inner.render()),
            Expr::Binary { lhs, rhs, .. } => format!("{} op {}", lhs.render(), rhs.render()),
            Expr::Cmp { op, lhs, rhs } => format!("{} {} {}", lhs.render(), op, rhs.render()),
            Expr::Opaque(_) => "<expr>".to_string(),
        }
    }
}
