/*
 * tree-sitter-c Front End
 *
 * Lowers a C translation unit into one `FunctionUnit` per function
 * definition.
 *
 * # Algorithm
 * 1. Parse the whole file once.
 * 2. Collect integer `#define` constants so array dimensions such as
 *    `char name[MAX_NAME]` resolve.
 * 3. Walk top-level items in order. Typedefs and struct tags are recorded as
 *    they appear; function-local typedefs are scoped to their function.
 * 4. Lower each function body: declarations, assignments, calls, `if`,
 *    counted `for` loops (with a `LoopHeader`), `while` loops whose body
 *    ends by stepping the compared variable (also with a `LoopHeader`),
 *    other loops, `switch` (as an `if` chain) and `return`.
 * 5. ERROR and MISSING nodes inside a function become `syntax_errors`, so the
 *    pipeline rejects that function alone.
 *
 * # Example
 * ```text
 * void f() { char buf[10]; strcpy(buf, "hi"); }
 *   → FunctionUnit "f"
 *       Declare buf: Array{10, char}
 *       Eval strcpy(buf, "hi")
 * ```
 */

use rustc_hash::FxHashMap;
use tracing::debug;
use tree_sitter::{Node, Parser};

use super::literals::{decode_escapes, parse_char_literal, parse_int_literal};
use crate::errors::{CguardError, Result};
use crate::features::c_ir::domain::{
    BinOp, CmpOp, DeclKind, Declaration, Expr, FunctionUnit, LoopHeader, LoopStep, Stmt, StmtKind,
};
use crate::features::c_ir::ports::FrontEnd;
use crate::features::evaluator::{eval_const, sizeof_type, EmptyEnv};
use crate::shared::models::Location;

/// tree-sitter based C front end
pub struct CFrontend {
    parser: Parser,
}

impl CFrontend {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c::language())
            .map_err(|e| CguardError::parse_error(format!("Failed to set language: {}", e)))?;
        Ok(Self { parser })
    }
}

impl FrontEnd for CFrontend {
    fn lower(&mut self, source: &str) -> Result<Vec<FunctionUnit>> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| CguardError::parse_error("Failed to parse C source"))?;

        let root = tree.root_node();
        let mut lowering = Lowering::new(source);
        lowering.collect_defines(root);
        lowering.walk_items(root);

        debug!(
            functions = lowering.units.len(),
            defines = lowering.constants.len(),
            "lowered translation unit"
        );
        Ok(lowering.units)
    }
}

fn location(node: Node) -> Location {
    let pos = node.start_position();
    Location::new(pos.row as u32 + 1, pos.column as u32 + 1)
}

fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    children
}

fn field_children<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children_by_field_name(field, &mut cursor).collect();
    children
}

/// Skip `( expr )` wrappers
fn unwrap_parens(mut node: Node) -> Node {
    while node.kind() == "parenthesized_expression" {
        match node.named_child(0) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// Per-file lowering state
struct Lowering<'s> {
    source: &'s str,
    constants: FxHashMap<String, i64>,
    typedefs: FxHashMap<String, DeclKind>,
    tags: FxHashMap<String, DeclKind>,
    units: Vec<FunctionUnit>,
    /// Syntax errors met while lowering the current function
    errors: Vec<Location>,
}

impl<'s> Lowering<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            constants: FxHashMap::default(),
            typedefs: FxHashMap::default(),
            tags: FxHashMap::default(),
            units: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn text(&self, node: Node) -> &'s str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    // ═══════════════════════════════════════════════════════════════════
    // Top level
    // ═══════════════════════════════════════════════════════════════════

    fn collect_defines(&mut self, node: Node) {
        for child in named_children(node) {
            match child.kind() {
                "preproc_def" => {
                    let name = child.child_by_field_name("name").map(|n| self.text(n));
                    let value = child.child_by_field_name("value").map(|n| self.text(n));
                    if let (Some(name), Some(value)) = (name, value) {
                        if let Some(v) = self.define_value(value) {
                            self.constants.insert(name.to_string(), v);
                        }
                    }
                }
                "preproc_if" | "preproc_ifdef" | "preproc_else" | "preproc_elif"
                | "linkage_specification" | "declaration_list" => self.collect_defines(child),
                _ => {}
            }
        }
    }

    /// Integer value of a `#define` body (`50`, `(256)`, `OTHER_CONSTANT`)
    fn define_value(&self, body: &str) -> Option<i64> {
        let mut body = body.trim();
        while body.starts_with('(') && body.ends_with(')') && body.len() >= 2 {
            body = body[1..body.len() - 1].trim();
        }
        parse_int_literal(body).or_else(|| self.constants.get(body).copied())
    }

    fn walk_items(&mut self, node: Node) {
        for child in named_children(node) {
            match child.kind() {
                "function_definition" => self.lower_function(child),
                "type_definition" => self.register_typedef(child),
                "declaration" | "struct_specifier" => {
                    let ty = child.child_by_field_name("type").unwrap_or(child);
                    self.resolve_type(ty);
                }
                "preproc_if" | "preproc_ifdef" | "preproc_else" | "preproc_elif"
                | "linkage_specification" | "declaration_list" => self.walk_items(child),
                "ERROR" => self.recover_function(child),
                _ => {}
            }
        }
    }

    /// A top-level ERROR that swallowed a function definition still yields a
    /// unit, so the failure is reported against the function by name
    fn recover_function(&mut self, node: Node) {
        let Some(declarator) = find_descendant(node, "function_declarator") else {
            return;
        };
        let Some(name) = declarator
            .child_by_field_name("declarator")
            .map(|n| self.text(n).to_string())
        else {
            return;
        };
        if name.is_empty() {
            return;
        }
        debug!(function = %name, "function lost to a syntax error");
        let mut unit = FunctionUnit::new(name, location(declarator));
        unit.syntax_errors.push(location(node));
        self.units.push(unit);
    }

    fn lower_function(&mut self, node: Node) {
        let Some(declarator) = node
            .child_by_field_name("declarator")
            .and_then(find_function_declarator)
        else {
            return;
        };
        let name = declarator
            .child_by_field_name("declarator")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();

        let saved_typedefs = self.typedefs.clone();
        let saved_tags = self.tags.clone();
        self.errors.clear();

        let mut unit = FunctionUnit::new(name, location(node));

        if let Some(params) = declarator.child_by_field_name("parameters") {
            for param in named_children(params) {
                if param.kind() == "parameter_declaration" {
                    if let Some(decl) = self.lower_parameter(param) {
                        unit.params.push(decl);
                    }
                }
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            let end = body.end_position();
            unit.body = self.lower_block(body);
            unit.end_location = Location::new(end.row as u32 + 1, end.column as u32);
        }
        self.scan_errors(node);
        unit.syntax_errors = std::mem::take(&mut self.errors);

        self.typedefs = saved_typedefs;
        self.tags = saved_tags;
        self.units.push(unit);
    }

    fn scan_errors(&mut self, node: Node) {
        if node.is_error() || node.is_missing() {
            self.errors.push(location(node));
            return;
        }
        if !node.has_error() {
            return;
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        for child in children {
            self.scan_errors(child);
        }
    }

    fn lower_parameter(&mut self, node: Node) -> Option<Declaration> {
        let base = node
            .child_by_field_name("type")
            .map(|t| self.resolve_type(t))
            .unwrap_or(DeclKind::Scalar { size: None });
        let declarator = node.child_by_field_name("declarator")?;
        let (name, kind) = self.apply_declarator(base, declarator)?;

        // array parameters decay to pointers
        let kind = match kind {
            DeclKind::Array { element, .. } => DeclKind::Pointer { pointee: element },
            other => other,
        };
        Some(Declaration::new(name, kind, location(node)))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Types
    // ═══════════════════════════════════════════════════════════════════

    fn register_typedef(&mut self, node: Node) {
        let base = node
            .child_by_field_name("type")
            .map(|t| self.resolve_type(t))
            .unwrap_or(DeclKind::Scalar { size: None });
        for declarator in field_children(node, "declarator") {
            if let Some((name, kind)) = self.apply_declarator(base.clone(), declarator) {
                self.typedefs.insert(name, kind);
            }
        }
    }

    fn resolve_type(&mut self, node: Node) -> DeclKind {
        match node.kind() {
            "primitive_type" | "sized_type_specifier" => DeclKind::Scalar {
                size: sizeof_type(self.text(node)),
            },
            "type_identifier" => {
                let name = self.text(node);
                self.typedefs.get(name).cloned().unwrap_or(DeclKind::Scalar {
                    size: sizeof_type(name),
                })
            }
            "enum_specifier" => DeclKind::int(),
            "struct_specifier" | "union_specifier" => {
                let tag = node.child_by_field_name("name").map(|n| self.text(n).to_string());
                match node.child_by_field_name("body") {
                    Some(body) => {
                        let kind = DeclKind::Struct {
                            fields: self.lower_fields(body),
                        };
                        if let Some(tag) = tag {
                            self.tags.insert(tag, kind.clone());
                        }
                        kind
                    }
                    None => tag
                        .and_then(|t| self.tags.get(&t).cloned())
                        .unwrap_or(DeclKind::Struct { fields: Vec::new() }),
                }
            }
            _ => DeclKind::Scalar { size: None },
        }
    }

    fn lower_fields(&mut self, body: Node) -> Vec<Declaration> {
        let mut fields = Vec::new();
        for field in named_children(body) {
            if field.kind() != "field_declaration" {
                continue;
            }
            let base = field
                .child_by_field_name("type")
                .map(|t| self.resolve_type(t))
                .unwrap_or(DeclKind::Scalar { size: None });
            for declarator in field_children(field, "declarator") {
                if let Some((name, kind)) = self.apply_declarator(base.clone(), declarator) {
                    fields.push(Declaration::new(name, kind, location(declarator)));
                }
            }
        }
        fields
    }

    /// Wrap `base` in the pointer and array layers of `node` and return the
    /// declared name
    fn apply_declarator(&mut self, base: DeclKind, node: Node) -> Option<(String, DeclKind)> {
        match node.kind() {
            "identifier" | "field_identifier" | "type_identifier" => {
                Some((self.text(node).to_string(), base))
            }
            "pointer_declarator" => {
                let inner = node.child_by_field_name("declarator")?;
                self.apply_declarator(DeclKind::pointer_to(base), inner)
            }
            "array_declarator" => {
                let inner = node.child_by_field_name("declarator")?;
                let dimension = node.child_by_field_name("size").and_then(|size| {
                    let expr = self.lower_expr(size);
                    eval_const(&expr, &EmptyEnv).and_then(|n| u64::try_from(n).ok())
                });
                let kind = DeclKind::Array {
                    dimension,
                    element: Box::new(base),
                };
                self.apply_declarator(kind, inner)
            }
            "init_declarator" | "parenthesized_declarator" | "attributed_declarator" => {
                let inner = node
                    .child_by_field_name("declarator")
                    .or_else(|| node.named_child(0))?;
                self.apply_declarator(base, inner)
            }
            "function_declarator" => {
                let inner = node.child_by_field_name("declarator")?;
                self.apply_declarator(DeclKind::Scalar { size: None }, inner)
            }
            _ => None,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Statements
    // ═══════════════════════════════════════════════════════════════════

    fn lower_block(&mut self, node: Node) -> Vec<Stmt> {
        let mut out = Vec::new();
        for child in named_children(node) {
            self.lower_stmt(child, &mut out);
        }
        out
    }

    /// Statement or block as a statement list
    fn lower_body(&mut self, node: Node) -> Vec<Stmt> {
        if node.kind() == "compound_statement" {
            return self.lower_block(node);
        }
        let mut out = Vec::new();
        self.lower_stmt(node, &mut out);
        out
    }

    fn lower_stmt(&mut self, node: Node, out: &mut Vec<Stmt>) {
        let loc = location(node);
        match node.kind() {
            "compound_statement" => out.extend(self.lower_block(node)),
            "declaration" => self.lower_declaration(node, out),
            "type_definition" => self.register_typedef(node),
            "expression_statement" => {
                if let Some(expr) = node.named_child(0) {
                    self.lower_expr_stmt(expr, out);
                }
            }
            "if_statement" => {
                let condition = node
                    .child_by_field_name("condition")
                    .map(|c| self.lower_expr(c))
                    .unwrap_or(Expr::Opaque(Vec::new()));
                let then_branch = node
                    .child_by_field_name("consequence")
                    .map(|c| self.lower_body(c))
                    .unwrap_or_default();
                let else_branch = node
                    .child_by_field_name("alternative")
                    .map(|alt| {
                        let alt = if alt.kind() == "else_clause" {
                            alt.named_child(0).unwrap_or(alt)
                        } else {
                            alt
                        };
                        self.lower_body(alt)
                    })
                    .unwrap_or_default();
                out.push(Stmt::if_else(condition, then_branch, else_branch, loc));
            }
            "for_statement" => self.lower_for(node, out),
            "while_statement" => self.lower_while(node, out),
            "do_statement" => {
                let condition = node.child_by_field_name("condition").map(|c| self.lower_expr(c));
                let body = node
                    .child_by_field_name("body")
                    .map(|b| self.lower_body(b))
                    .unwrap_or_default();
                out.push(Stmt::new(
                    StmtKind::Loop {
                        header: None,
                        condition,
                        body,
                    },
                    loc,
                ));
            }
            "switch_statement" => self.lower_switch(node, out),
            "return_statement" => {
                let value = node.named_child(0).map(|v| self.lower_expr(v));
                out.push(Stmt::ret(value, loc));
            }
            "labeled_statement" => {
                let count = node.named_child_count();
                if let Some(inner) = count.checked_sub(1).and_then(|i| node.named_child(i)) {
                    if inner.kind() != "statement_identifier" {
                        self.lower_stmt(inner, out);
                    }
                }
            }
            // break, continue, goto and comments carry no facts
            _ => {}
        }
    }

    fn lower_declaration(&mut self, node: Node, out: &mut Vec<Stmt>) {
        let base = node
            .child_by_field_name("type")
            .map(|t| self.resolve_type(t))
            .unwrap_or(DeclKind::Scalar { size: None });

        for declarator in field_children(node, "declarator") {
            let Some((name, kind)) = self.apply_declarator(base.clone(), declarator) else {
                continue;
            };
            let loc = location(declarator);
            let decl = Declaration::new(name, kind, loc);
            let init = if declarator.kind() == "init_declarator" {
                declarator
                    .child_by_field_name("value")
                    .map(|v| self.lower_expr(v))
            } else {
                None
            };
            out.push(Stmt::new(StmtKind::Declare { decl, init }, loc));
        }
    }

    fn lower_expr_stmt(&mut self, node: Node, out: &mut Vec<Stmt>) {
        let node = unwrap_parens(node);
        let loc = location(node);
        match node.kind() {
            "assignment_expression" => {
                if let Some((target, value)) = self.lower_assignment(node) {
                    out.push(Stmt::assign(target, value, loc));
                }
            }
            "update_expression" => {
                if let Some((target, value)) = self.lower_update(node) {
                    out.push(Stmt::assign(target, value, loc));
                }
            }
            "comma_expression" => {
                for part in named_children(node) {
                    self.lower_expr_stmt(part, out);
                }
            }
            _ => {
                let expr = self.lower_expr(node);
                out.push(Stmt::new(StmtKind::Eval(expr), loc));
            }
        }
    }

    /// `a = b` and compound `a op= b` (as `a = a op b`)
    fn lower_assignment(&mut self, node: Node) -> Option<(Expr, Expr)> {
        let target = self.lower_expr(node.child_by_field_name("left")?);
        let value = self.lower_expr(node.child_by_field_name("right")?);
        let op = node
            .child_by_field_name("operator")
            .map(|o| self.text(o))
            .unwrap_or("=");
        let value = match op {
            "=" => value,
            compound => Expr::binary(binary_op(compound.trim_end_matches('=')), target.clone(), value),
        };
        Some((target, value))
    }

    /// `i++` / `--i` as `i = i ± 1`
    fn lower_update(&mut self, node: Node) -> Option<(Expr, Expr)> {
        let target = self.lower_expr(node.child_by_field_name("argument")?);
        let op = node
            .child_by_field_name("operator")
            .map(|o| self.text(o))
            .unwrap_or("++");
        let op = if op == "--" { BinOp::Sub } else { BinOp::Add };
        let value = Expr::binary(op, target.clone(), Expr::int(1));
        Some((target, value))
    }

    fn lower_for(&mut self, node: Node, out: &mut Vec<Stmt>) {
        let loc = location(node);
        let mut init_var: Option<(String, Option<Expr>)> = None;

        if let Some(init) = node.child_by_field_name("initializer") {
            if init.kind() == "declaration" {
                let mut decls = Vec::new();
                self.lower_declaration(init, &mut decls);
                if let [Stmt {
                    kind: StmtKind::Declare { decl, init: value },
                    ..
                }] = decls.as_slice()
                {
                    init_var = Some((decl.name.clone(), value.clone()));
                }
                out.extend(decls);
            } else {
                let init = unwrap_parens(init);
                if init.kind() == "assignment_expression" {
                    if let Some((target, value)) = self.lower_assignment(init) {
                        if let Expr::Ident(var) = &target {
                            init_var = Some((var.clone(), Some(value.clone())));
                        }
                        out.push(Stmt::assign(target, value, location(init)));
                    }
                } else {
                    self.lower_expr_stmt(init, out);
                }
            }
        }

        let condition_node = node.child_by_field_name("condition");
        let update_node = node.child_by_field_name("update");
        let mut body = node
            .child_by_field_name("body")
            .map(|b| self.lower_body(b))
            .unwrap_or_default();

        let header = condition_node.and_then(|c| self.loop_header(c, init_var.as_ref(), update_node));
        let condition = match header {
            Some(_) => None,
            None => {
                if let Some(update) = update_node {
                    self.lower_expr_stmt(update, &mut body);
                }
                condition_node.map(|c| self.lower_expr(c))
            }
        };

        out.push(Stmt::new(
            StmtKind::Loop {
                header,
                condition,
                body,
            },
            loc,
        ));
    }

    /// `while (var op bound) { ...; var++; }` gets a header; the initial value
    /// is the last constant assignment to `var` before the loop
    fn lower_while(&mut self, node: Node, out: &mut Vec<Stmt>) {
        let loc = location(node);
        let condition = node.child_by_field_name("condition").map(|c| self.lower_expr(c));
        let body = node
            .child_by_field_name("body")
            .map(|b| self.lower_body(b))
            .unwrap_or_default();

        let header = condition.as_ref().and_then(|c| while_header(c, &body, out.as_slice()));
        let condition = match header {
            Some(_) => None,
            None => condition,
        };
        out.push(Stmt::new(
            StmtKind::Loop {
                header,
                condition,
                body,
            },
            loc,
        ));
    }

    /// Recognize `var op bound` with an optional `var = init` and `var++`
    fn loop_header(
        &mut self,
        condition: Node,
        init_var: Option<&(String, Option<Expr>)>,
        update: Option<Node>,
    ) -> Option<LoopHeader> {
        let Expr::Cmp { op, lhs, rhs } = self.lower_expr(condition) else {
            return None;
        };

        let init_name = init_var.map(|(name, _)| name.as_str());
        let lhs_name = lhs.as_ident().map(str::to_string);
        let rhs_name = rhs.as_ident().map(str::to_string);
        let (var, op, bound) = match (lhs_name, rhs_name) {
            (Some(l), _) if init_name.is_none() || init_name == Some(l.as_str()) => (l, op, *rhs),
            (_, Some(r)) if init_name == Some(r.as_str()) => (r, op.flipped(), *lhs),
            _ => return None,
        };

        let init = init_var.and_then(|(_, value)| value.clone());
        let step = update
            .map(|u| self.loop_step(u, &var))
            .unwrap_or(LoopStep::Unknown);

        Some(LoopHeader {
            var,
            init,
            op,
            bound,
            step,
        })
    }

    fn loop_step(&mut self, update: Node, var: &str) -> LoopStep {
        let update = unwrap_parens(update);
        let (target, value) = match update.kind() {
            "update_expression" => match self.lower_update(update) {
                Some(pair) => pair,
                None => return LoopStep::Unknown,
            },
            "assignment_expression" => match self.lower_assignment(update) {
                Some(pair) => pair,
                None => return LoopStep::Unknown,
            },
            _ => return LoopStep::Unknown,
        };
        step_of(&target, &value, var)
    }

    /// `switch` as a chain of opaque-condition branches, one per case. The
    /// `default` case closes the chain; without one, no case may run.
    fn lower_switch(&mut self, node: Node, out: &mut Vec<Stmt>) {
        let loc = location(node);
        if let Some(condition) = node.child_by_field_name("condition") {
            let condition = self.lower_expr(condition);
            out.push(Stmt::new(StmtKind::Eval(condition), loc));
        }

        let mut cases = Vec::new();
        let mut default = None;
        if let Some(body) = node.child_by_field_name("body") {
            for case in named_children(body) {
                if case.kind() != "case_statement" {
                    continue;
                }
                let value = case.child_by_field_name("value");
                let value_id = value.map(|v| v.id());
                let mut stmts = Vec::new();
                for child in named_children(case) {
                    if Some(child.id()) != value_id {
                        self.lower_stmt(child, &mut stmts);
                    }
                }
                match value {
                    Some(_) => cases.push((location(case), stmts)),
                    None => default = Some(stmts),
                }
            }
        }

        let mut chain = default.unwrap_or_default();
        for (case_loc, stmts) in cases.into_iter().rev() {
            chain = vec![Stmt::if_else(Expr::Opaque(Vec::new()), stmts, chain, case_loc)];
        }
        out.extend(chain);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Expressions
    // ═══════════════════════════════════════════════════════════════════

    fn lower_expr(&mut self, node: Node) -> Expr {
        let node = unwrap_parens(node);
        match node.kind() {
            "identifier" => {
                let name = self.text(node);
                if name == "NULL" || name == "nullptr" {
                    return Expr::Null;
                }
                match self.constants.get(name) {
                    Some(value) => Expr::IntLit(*value),
                    None => Expr::ident(name),
                }
            }
            "null" => Expr::Null,
            "true" => Expr::int(1),
            "false" => Expr::int(0),
            "number_literal" => match parse_int_literal(self.text(node)) {
                Some(value) => Expr::IntLit(value),
                None => Expr::Opaque(Vec::new()),
            },
            "char_literal" => match parse_char_literal(self.text(node)) {
                Some(value) => Expr::IntLit(value),
                None => Expr::Opaque(Vec::new()),
            },
            "string_literal" => Expr::StrLit(self.string_contents(node)),
            "concatenated_string" => {
                let joined = named_children(node)
                    .into_iter()
                    .filter(|c| c.kind() == "string_literal")
                    .map(|c| self.string_contents(c))
                    .collect::<String>();
                Expr::StrLit(joined)
            }
            "call_expression" => {
                let callee = node
                    .child_by_field_name("function")
                    .map(|f| {
                        self.text(unwrap_parens(f))
                            .split_whitespace()
                            .collect::<String>()
                    })
                    .unwrap_or_default();
                let args = node
                    .child_by_field_name("arguments")
                    .map(|a| {
                        named_children(a)
                            .into_iter()
                            .filter(|c| c.kind() != "comment")
                            .map(|c| self.lower_expr(c))
                            .collect()
                    })
                    .unwrap_or_default();
                Expr::call(callee, args)
            }
            "subscript_expression" => {
                let base = node.child_by_field_name("argument").map(|b| self.lower_expr(b));
                let index = node.child_by_field_name("index").map(|i| self.lower_expr(i));
                match (base, index) {
                    (Some(base), Some(index)) => Expr::index(base, index),
                    (base, index) => Expr::Opaque(base.into_iter().chain(index).collect()),
                }
            }
            "field_expression" => {
                let base = node.child_by_field_name("argument").map(|b| self.lower_expr(b));
                let field = node.child_by_field_name("field").map(|f| self.text(f).to_string());
                let arrow = node
                    .child_by_field_name("operator")
                    .is_some_and(|o| self.text(o) == "->");
                match (base, field) {
                    (Some(base), Some(field)) => Expr::Field {
                        base: Box::new(base),
                        field,
                        arrow,
                    },
                    (base, _) => Expr::Opaque(base.into_iter().collect()),
                }
            }
            "pointer_expression" => {
                let inner = node
                    .child_by_field_name("argument")
                    .map(|a| self.lower_expr(a))
                    .unwrap_or(Expr::Opaque(Vec::new()));
                let op = node.child_by_field_name("operator").map(|o| self.text(o));
                match op {
                    Some("&") => Expr::AddrOf(Box::new(inner)),
                    _ => Expr::deref(inner),
                }
            }
            "unary_expression" => {
                let inner = node
                    .child_by_field_name("argument")
                    .map(|a| self.lower_expr(a))
                    .unwrap_or(Expr::Opaque(Vec::new()));
                match node.child_by_field_name("operator").map(|o| self.text(o)) {
                    Some("!") => Expr::Not(Box::new(inner)),
                    Some("-") => match inner {
                        Expr::IntLit(n) => n.checked_neg().map(Expr::IntLit).unwrap_or(Expr::Opaque(Vec::new())),
                        other => Expr::binary(BinOp::Sub, Expr::int(0), other),
                    },
                    Some("+") => inner,
                    _ => Expr::Opaque(vec![inner]),
                }
            }
            "binary_expression" => {
                let lhs = node
                    .child_by_field_name("left")
                    .map(|l| self.lower_expr(l))
                    .unwrap_or(Expr::Opaque(Vec::new()));
                let rhs = node
                    .child_by_field_name("right")
                    .map(|r| self.lower_expr(r))
                    .unwrap_or(Expr::Opaque(Vec::new()));
                let op = node
                    .child_by_field_name("operator")
                    .map(|o| self.text(o))
                    .unwrap_or("");
                match CmpOp::parse(op) {
                    Some(cmp) => Expr::cmp(cmp, lhs, rhs),
                    None => Expr::binary(binary_op(op), lhs, rhs),
                }
            }
            "sizeof_expression" => {
                if let Some(ty) = node.child_by_field_name("type") {
                    let name = self.text(ty).split_whitespace().collect::<Vec<_>>().join(" ");
                    return Expr::sizeof_type(name);
                }
                match node.child_by_field_name("value") {
                    Some(value) => Expr::SizeofExpr(Box::new(self.lower_expr(value))),
                    None => Expr::Opaque(Vec::new()),
                }
            }
            "cast_expression" => node
                .child_by_field_name("value")
                .map(|v| self.lower_expr(v))
                .unwrap_or(Expr::Opaque(Vec::new())),
            _ => {
                let children = named_children(node)
                    .into_iter()
                    .filter(|c| !matches!(c.kind(), "comment" | "type_descriptor"))
                    .map(|c| self.lower_expr(c))
                    .collect();
                Expr::Opaque(children)
            }
        }
    }

    /// Decoded contents of a string literal, prefix and quotes removed
    fn string_contents(&self, node: Node) -> String {
        let raw = self.text(node);
        let body = match (raw.find('"'), raw.rfind('"')) {
            (Some(start), Some(end)) if end > start => &raw[start + 1..end],
            _ => "",
        };
        decode_escapes(body)
    }
}

/// Direction of `target = value` as an update of `var`
fn step_of(target: &Expr, value: &Expr, var: &str) -> LoopStep {
    if target.as_ident() != Some(var) {
        return LoopStep::Unknown;
    }
    match value {
        Expr::Binary { op, lhs, rhs } if lhs.as_ident() == Some(var) => {
            match (*op, eval_const(rhs, &EmptyEnv)) {
                (BinOp::Add, Some(k)) if k > 0 => LoopStep::Increment,
                (BinOp::Sub, Some(k)) if k > 0 => LoopStep::Decrement,
                _ => LoopStep::Unknown,
            }
        }
        _ => LoopStep::Unknown,
    }
}

/// Header of a `while` loop: the condition compares a variable that the
/// last body statement steps
fn while_header(condition: &Expr, body: &[Stmt], before: &[Stmt]) -> Option<LoopHeader> {
    let Expr::Cmp { op, lhs, rhs } = condition else {
        return None;
    };
    let Some(Stmt {
        kind: StmtKind::Assign { target, value },
        ..
    }) = body.last()
    else {
        return None;
    };

    let candidates = [
        lhs.as_ident().map(|v| (v, *op, &**rhs)),
        rhs.as_ident().map(|v| (v, op.flipped(), &**lhs)),
    ];
    let (var, op, bound, step) = candidates.into_iter().flatten().find_map(|(var, op, bound)| {
        match step_of(target, value, var) {
            LoopStep::Unknown => None,
            step => Some((var, op, bound, step)),
        }
    })?;

    let init = before
        .iter()
        .rev()
        .find_map(|stmt| match &stmt.kind {
            StmtKind::Declare { decl, init } if decl.name == var => Some(init.clone()),
            StmtKind::Assign { target, value } if target.as_ident() == Some(var) => Some(Some(value.clone())),
            _ => None,
        })
        .flatten()
        .filter(|e| eval_const(e, &EmptyEnv).is_some());

    Some(LoopHeader {
        var: var.to_string(),
        init,
        op,
        bound: bound.clone(),
        step,
    })
}

fn binary_op(op: &str) -> BinOp {
    match op {
        "+" => BinOp::Add,
        "-" => BinOp::Sub,
        "*" => BinOp::Mul,
        "/" => BinOp::Div,
        "%" => BinOp::Rem,
        _ => BinOp::Other,
    }
}

/// Descend through pointer declarators to the function declarator
fn find_function_declarator(node: Node) -> Option<Node> {
    match node.kind() {
        "function_declarator" => Some(node),
        "pointer_declarator" | "parenthesized_declarator" | "attributed_declarator" => node
            .child_by_field_name("declarator")
            .or_else(|| node.named_child(0))
            .and_then(find_function_declarator),
        _ => None,
    }
}

fn find_descendant<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    if node.kind() == kind {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(|c| find_descendant(c, kind))
}
