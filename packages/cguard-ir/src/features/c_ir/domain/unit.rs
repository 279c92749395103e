/*
 * Function Unit
 *
 * One function analysis unit: parameters, body, and any syntax errors the
 * front end met while lowering it.
 */

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::{DeclKind, Declaration, ParseInputError, Stmt, StmtKind};
use crate::shared::models::Location;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionUnit {
    pub name: String,
    pub location: Location,
    /// Closing brace; the implicit exit path ends here
    pub end_location: Location,
    pub params: Vec<Declaration>,
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub syntax_errors: Vec<Location>,
}

impl FunctionUnit {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
            end_location: location,
            params: Vec::new(),
            body: Vec::new(),
            syntax_errors: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: Declaration) -> Self {
        self.params.push(param);
        self
    }

    /// Set the body; the end location defaults to one line past the last
    /// statement unless already set past it
    pub fn with_body(mut self, body: Vec<Stmt>) -> Self {
        if let Some(last) = body.last() {
            if self.end_location <= last.location {
                self.end_location = Location::line(last.location.line + 1);
            }
        }
        self.body = body;
        self
    }

    pub fn with_end(mut self, end: Location) -> Self {
        self.end_location = end;
        self
    }

    /// Reject units the analyzer must not run on
    pub fn validate(&self) -> Result<(), ParseInputError> {
        if self.name.trim().is_empty() {
            return Err(ParseInputError::EmptyName);
        }

        if let Some(first) = self.syntax_errors.iter().min() {
            return Err(ParseInputError::SyntaxError {
                function: self.name.clone(),
                line: first.line,
            });
        }

        let mut seen = FxHashSet::default();
        for param in &self.params {
            if !seen.insert(param.name.as_str()) {
                return Err(ParseInputError::DuplicateParameter {
                    function: self.name.clone(),
                    parameter: param.name.clone(),
                });
            }
        }

        let declared = self.params.iter().chain(declarations(&self.body));
        for decl in declared {
            if has_zero_dimension(&decl.kind) {
                return Err(ParseInputError::InvalidDimension {
                    function: self.name.clone(),
                    name: decl.name.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Every declaration in a statement tree, outermost first
fn declarations(body: &[Stmt]) -> Vec<&Declaration> {
    let mut out = Vec::new();
    for stmt in body {
        match &stmt.kind {
            StmtKind::Declare { decl, .. } => out.push(decl),
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                out.extend(declarations(then_branch));
                out.extend(declarations(else_branch));
            }
            StmtKind::Loop { body, .. } => out.extend(declarations(body)),
            _ => {}
        }
    }
    out
}

fn has_zero_dimension(kind: &DeclKind) -> bool {
    match kind {
        DeclKind::Array { dimension, element } => {
            *dimension == Some(0) || has_zero_dimension(element)
        }
        DeclKind::Struct { fields } => fields.iter().any(|f| has_zero_dimension(&f.kind)),
        DeclKind::Pointer { .. } | DeclKind::Scalar { .. } => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::c_ir::domain::Expr;

    #[test]
    fn test_validate_ok() {
        let unit = FunctionUnit::new("f", Location::line(1))
            .with_param(Declaration::char_pointer("input", Location::line(1)))
            .with_body(vec![Stmt::call("puts", vec![Expr::str("hi")], Location::line(2))]);
        assert!(unit.validate().is_ok());
        assert_eq!(unit.end_location, Location::line(3));
    }

    #[test]
    fn test_validate_rejects_syntax_error() {
        let mut unit = FunctionUnit::new("broken", Location::line(1));
        unit.syntax_errors.push(Location::new(4, 7));
        unit.syntax_errors.push(Location::new(2, 1));
        assert_eq!(
            unit.validate(),
            Err(ParseInputError::SyntaxError {
                function: "broken".to_string(),
                line: 2
            })
        );
    }

    #[test]
    fn test_validate_rejects_duplicate_param() {
        let unit = FunctionUnit::new("f", Location::line(1))
            .with_param(Declaration::scalar("n", Location::line(1)))
            .with_param(Declaration::scalar("n", Location::line(1)));
        assert!(matches!(
            unit.validate(),
            Err(ParseInputError::DuplicateParameter { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_dimension() {
        let unit = FunctionUnit::new("f", Location::line(1)).with_body(vec![Stmt::if_then(
            Expr::ident("x"),
            vec![Stmt::declare(Declaration::char_array("tmp", 0, Location::line(3)))],
            Location::line(2),
        )]);
        assert_eq!(
            unit.validate(),
            Err(ParseInputError::InvalidDimension {
                function: "f".to_string(),
                name: "tmp".to_string()
            })
        );
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let unit = FunctionUnit::new("  ", Location::line(1));
        assert_eq!(unit.validate(), Err(ParseInputError::EmptyName));
    }
}
