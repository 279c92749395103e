//! Common test utilities for cguard-ir
//!
//! Builders for hand-written function units and helpers for summarizing
//! findings.

#![allow(dead_code)]

use cguard_ir::features::c_ir::{Declaration, Expr, FunctionUnit, Stmt};
use cguard_ir::shared::models::Location;
use cguard_ir::{AnalysisConfig, AnalysisEngine, Finding, Preset};

/// Ground-truth corpus
pub const VULN_C: &str = include_str!("../fixtures/vuln.c");

/// Builder for a function unit with auto-incrementing statement lines
#[derive(Debug)]
pub struct UnitBuilder {
    unit: FunctionUnit,
    line: u32,
}

impl UnitBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            unit: FunctionUnit::new(name, Location::line(1)),
            line: 1,
        }
    }

    pub fn param(mut self, decl: Declaration) -> Self {
        self.unit.params.push(decl);
        self
    }

    /// Next statement line
    pub fn next_line(&mut self) -> Location {
        self.line += 1;
        Location::line(self.line)
    }

    pub fn stmt(mut self, make: impl FnOnce(Location) -> Stmt) -> Self {
        let loc = self.next_line();
        self.unit.body.push(make(loc));
        self
    }

    pub fn declare(self, make: impl FnOnce(Location) -> Declaration) -> Self {
        self.stmt(|loc| Stmt::declare(make(loc)))
    }

    pub fn call(self, callee: &str, args: Vec<Expr>) -> Self {
        let callee = callee.to_string();
        self.stmt(move |loc| Stmt::call(callee, args, loc))
    }

    pub fn build(mut self) -> FunctionUnit {
        self.unit.end_location = Location::line(self.line + 1);
        self.unit
    }
}

pub fn engine() -> AnalysisEngine {
    engine_with(AnalysisConfig::preset(Preset::Balanced))
}

pub fn engine_with(config: AnalysisConfig) -> AnalysisEngine {
    AnalysisEngine::new(config).expect("valid config")
}

/// Findings for a single unit under the default configuration
pub fn analyze(unit: FunctionUnit) -> Vec<Finding> {
    engine().analyze(&[unit]).findings().to_vec()
}

/// `(rule id, line)` pairs in report order
pub fn rule_lines(findings: &[Finding]) -> Vec<(String, u32)> {
    findings
        .iter()
        .map(|f| (f.rule_id().to_string(), f.location().line))
        .collect()
}

/// `(rule id, line, subject)` triples in report order
pub fn rule_subjects(findings: &[Finding]) -> Vec<(String, u32, String)> {
    findings
        .iter()
        .map(|f| {
            (
                f.rule_id().to_string(),
                f.location().line,
                f.subject().unwrap_or_default().to_string(),
            )
        })
        .collect()
}

pub fn rule_ids(findings: &[Finding]) -> Vec<String> {
    findings.iter().map(|f| f.rule_id().to_string()).collect()
}

pub fn malloc(bytes: i64) -> Expr {
    Expr::call("malloc", vec![Expr::int(bytes)])
}

pub fn free(name: &str) -> Vec<Expr> {
    vec![Expr::ident(name)]
}
