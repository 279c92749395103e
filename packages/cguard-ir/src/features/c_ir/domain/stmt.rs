/*
 * Statements
 *
 * Control flow is structured: conditionals and loops nest their bodies, and
 * `Return` ends the current path. Every statement carries its location.
 */

use serde::{Deserialize, Serialize};

use super::{CmpOp, Declaration, Expr};
use crate::shared::models::Location;

/// Direction of the loop variable update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopStep {
    /// `i++`, `++i`, `i += k` (k > 0)
    Increment,
    /// `i--`, `--i`, `i -= k` (k > 0)
    Decrement,
    Unknown,
}

/// Counted-loop header: `for (var = init; var op bound; step)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopHeader {
    pub var: String,
    pub init: Option<Expr>,
    pub op: CmpOp,
    pub bound: Expr,
    pub step: LoopStep,
}

impl LoopHeader {
    /// `for (var = init; var op bound; var++)`
    pub fn counting_up(var: impl Into<String>, init: i64, op: CmpOp, bound: Expr) -> Self {
        Self {
            var: var.into(),
            init: Some(Expr::IntLit(init)),
            op,
            bound,
            step: LoopStep::Increment,
        }
    }
}

/// Statement kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StmtKind {
    Declare {
        decl: Declaration,
        init: Option<Expr>,
    },
    Assign {
        target: Expr,
        value: Expr,
    },
    /// Expression evaluated for its effects (usually a call)
    Eval(Expr),
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
    },
    /// Loop; `header` is present for recognizable counted loops, otherwise
    /// `condition` holds the raw controlling expression
    Loop {
        header: Option<LoopHeader>,
        condition: Option<Expr>,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
}

/// Statement with location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub location: Location,
}

impl Stmt {
    pub fn new(kind: StmtKind, location: Location) -> Self {
        Self { kind, location }
    }

    pub fn declare(decl: Declaration) -> Self {
        let location = decl.location;
        Self::new(StmtKind::Declare { decl, init: None }, location)
    }

    pub fn declare_init(decl: Declaration, init: Expr) -> Self {
        let location = decl.location;
        Self::new(
            StmtKind::Declare {
                decl,
                init: Some(init),
            },
            location,
        )
    }

    pub fn assign(target: Expr, value: Expr, location: Location) -> Self {
        Self::new(StmtKind::Assign { target, value }, location)
    }

    pub fn call(callee: impl Into<String>, args: Vec<Expr>, location: Location) -> Self {
        Self::new(StmtKind::Eval(Expr::call(callee, args)), location)
    }

    pub fn if_then(condition: Expr, then_branch: Vec<Stmt>, location: Location) -> Self {
        Self::if_else(condition, then_branch, Vec::new(), location)
    }

    pub fn if_else(
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
        location: Location,
    ) -> Self {
        Self::new(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            location,
        )
    }

    pub fn for_loop(header: LoopHeader, body: Vec<Stmt>, location: Location) -> Self {
        Self::new(
            StmtKind::Loop {
                header: Some(header),
                condition: None,
                body,
            },
            location,
        )
    }

    pub fn while_loop(condition: Expr, body: Vec<Stmt>, location: Location) -> Self {
        Self::new(
            StmtKind::Loop {
                header: None,
                condition: Some(condition),
                body,
            },
            location,
        )
    }

    pub fn ret(value: Option<Expr>, location: Location) -> Self {
        Self::new(StmtKind::Return(value), location)
    }
}
