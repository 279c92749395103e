/*
 * C IR Domain Models
 */

mod decl;
mod error;
mod expr;
mod stmt;
mod unit;

pub use decl::{DeclKind, Declaration, POINTER_SIZE};
pub use error::ParseInputError;
pub use expr::{BinOp, Call, CmpOp, Expr};
pub use stmt::{LoopHeader, LoopStep, Stmt, StmtKind};
pub use unit::FunctionUnit;
