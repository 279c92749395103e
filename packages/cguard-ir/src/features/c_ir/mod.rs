/*
 * C Function IR
 *
 * Simplified per-function statement sequences handed to the analyzer:
 * - Domain: declarations, expressions, statements, function units
 * - Infrastructure: tree-sitter-c lowering (CFrontend)
 * - Ports: FrontEnd trait for alternative producers
 *
 * The IR is deliberately small. Anything the analyzer does not model is
 * lowered to `Expr::Opaque` so nested calls and accesses are still visited.
 */

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{
    BinOp, Call, CmpOp, DeclKind, Declaration, Expr, FunctionUnit, LoopHeader, LoopStep,
    ParseInputError, Stmt, StmtKind,
};
pub use infrastructure::CFrontend;
pub use ports::FrontEnd;
