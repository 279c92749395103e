/*
 * Lifetime Tracker
 *
 * # Algorithm
 * - Forward walk over the structured statement list
 * - Branches: clone the table, walk each arm, join (terminated arms drop out)
 * - Loops: a single pass over the body joined with the zero-iteration path
 * - Exits (`return`, end of body): every pointer still `Allocated` leaks
 * - A pointer freed on only one side of a merge stays `Allocated` but is
 *   marked; a later use or free of it is a Low severity finding
 *
 * # Example
 * ```ignore
 * let registry = RuleRegistry::with_builtins();
 * let findings = LifetimeTracker::run(&unit, &registry, TrackerOptions::default());
 * ```
 */

use tracing::{debug, trace};

use crate::features::bounds::RangeChecker;
use crate::features::c_ir::{DeclKind, Declaration, Expr, FunctionUnit, LoopHeader, Stmt, StmtKind};
use crate::features::evaluator::{allocation_bytes, eval_const};
use crate::features::facts::{
    Buffer, Capacity, LifecycleViolation, PointerEvent, PointerState, StringLiteralFact, TaintLabel,
    ValueFact,
};
use crate::features::reporting::{Finding, RuleId, Severity};
use crate::features::rules::{ApiClass, RuleRegistry};
use crate::features::tracker::application::conditions::{null_test, NullTest};
use crate::features::tracker::domain::{access_key, FactTable, PointerFact, SymbolFacts, TrackerOptions};
use crate::shared::models::Location;

pub struct LifetimeTracker<'r> {
    pub(super) function: String,
    pub(super) registry: &'r RuleRegistry,
    pub(super) options: TrackerOptions,
    pub(super) facts: FactTable,
    pub(super) ranges: RangeChecker,
    pub(super) findings: Vec<Finding>,
}

impl<'r> LifetimeTracker<'r> {
    pub fn new(function: impl Into<String>, registry: &'r RuleRegistry, options: TrackerOptions) -> Self {
        Self {
            function: function.into(),
            registry,
            options,
            facts: FactTable::new(),
            ranges: RangeChecker::new(options.loop_bounds),
            findings: Vec::new(),
        }
    }

    /// Analyze a whole function unit
    pub fn run(unit: &FunctionUnit, registry: &'r RuleRegistry, options: TrackerOptions) -> Vec<Finding> {
        let mut tracker = Self::new(unit.name.as_str(), registry, options);
        for param in &unit.params {
            tracker.declare_param(param);
        }
        tracker.observe_all(&unit.body);
        tracker.finish(unit.end_location)
    }

    pub fn declare_param(&mut self, decl: &Declaration) {
        self.facts.declare_param(&decl.name, &decl.kind);
    }

    pub fn observe_all(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.observe(stmt);
        }
    }

    /// Update the fact table with one statement
    pub fn observe(&mut self, stmt: &Stmt) {
        // unreachable after return
        if self.facts.is_terminated() {
            return;
        }

        let location = stmt.location;
        match &stmt.kind {
            StmtKind::Declare { decl, init } => self.observe_declare(decl, init.as_ref(), location),
            StmtKind::Assign { target, value } => self.observe_assign(target, value, location),
            StmtKind::Eval(expr) => self.visit_expr(expr, location),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.observe_if(condition, then_branch, else_branch, location),
            StmtKind::Loop {
                header,
                condition,
                body,
            } => self.observe_loop(header.as_ref(), condition.as_ref(), body, location),
            StmtKind::Return(value) => self.observe_return(value.as_ref(), location),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<SymbolFacts<'_>> {
        self.facts.lookup(name)
    }

    pub fn facts(&self) -> &FactTable {
        &self.facts
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Leak check at the end of the body; returns the findings in emission
    /// order
    pub fn finish(mut self, end: Location) -> Vec<Finding> {
        if !self.facts.is_terminated() {
            self.check_leaks(end);
        }
        debug!(
            function = %self.function,
            findings = self.findings.len(),
            "function analyzed"
        );
        self.findings
    }

    fn observe_declare(&mut self, decl: &Declaration, init: Option<&Expr>, location: Location) {
        self.facts.declare(&decl.name, &decl.kind);

        match (init, &decl.kind) {
            (None, _) => {}
            (Some(Expr::StrLit(text)), DeclKind::Array { dimension, element }) => {
                let literal = StringLiteralFact::of(text);
                if dimension.is_none() {
                    self.facts.set_buffer(Buffer::fixed(
                        decl.name.as_str(),
                        literal.byte_len(),
                        element.size_of(),
                    ));
                }
                self.facts.set_value(decl.name.as_str(), ValueFact::literal(literal));
            }
            (Some(value), _) => self.observe_assign(&Expr::ident(decl.name.as_str()), value, location),
        }
    }

    fn observe_assign(&mut self, target: &Expr, value: &Expr, location: Location) {
        self.visit_expr(target, location);

        let fact = match value {
            Expr::Call(call) => self.handle_call(call, location),
            other => {
                self.visit_expr(other, location);
                self.value_of(other)
            }
        };

        if let Some(name) = target.as_ident() {
            if self.facts.is_pointer(name) {
                self.assign_pointer(name, value, location);
            }
            self.facts.set_value(name, fact);
            return;
        }

        // storing a pointer into memory hands ownership over
        if let Some(source) = value.as_ident() {
            if self.facts.is_pointer(source) {
                self.transition(source, PointerEvent::Escape, location, "stored");
            }
        }
        if let Some(key) = access_key(target) {
            self.facts.set_value(key, fact);
        }
    }

    fn assign_pointer(&mut self, name: &str, value: &Expr, location: Location) {
        match value {
            Expr::Call(call)
                if self.registry.resolve(&call.callee).map(|s| s.class) == Some(ApiClass::Allocator) =>
            {
                if call.callee == "realloc" {
                    if let Some(old) = call.args.first().and_then(Expr::as_ident) {
                        if old != name {
                            if let Some(fact) = self.facts.pointer_mut(old) {
                                if fact.state == PointerState::Allocated {
                                    fact.state = PointerState::Freed;
                                }
                            }
                        }
                    }
                }
                let bytes = allocation_bytes(&call.callee, &call.args, &self.facts);
                let element = self
                    .facts
                    .kind(name)
                    .and_then(DeclKind::element)
                    .and_then(DeclKind::size_of);
                trace!(pointer = name, %bytes, "allocate");
                self.facts.set_pointer(name, PointerFact::allocated(location));
                self.facts.set_buffer(Buffer::heap(name, bytes, element));
            }
            Expr::Ident(source) if source != name && self.facts.pointer(source).is_some() => {
                let mut fact = self.facts.pointer(source).cloned().unwrap_or_else(PointerFact::uninitialized);
                let buffer = self.facts.buffer(source).cloned();
                if fact.state == PointerState::Allocated {
                    // the copy takes over ownership
                    if let Some(src) = self.facts.pointer_mut(source) {
                        src.state = PointerState::Escaped;
                    }
                } else {
                    fact.alloc_site = None;
                }
                self.facts.set_pointer(name, fact);
                match buffer {
                    Some(buffer) => self.facts.set_buffer(Buffer {
                        name: name.to_string(),
                        ..buffer
                    }),
                    None => self.facts.remove_buffer(name),
                }
            }
            Expr::Ident(array) if self.facts.kind(array).is_some_and(DeclKind::is_array) => {
                let buffer = self.facts.buffer(array).cloned();
                self.facts.set_pointer(name, PointerFact::uninitialized());
                match buffer {
                    Some(buffer) => self.facts.set_buffer(Buffer {
                        name: name.to_string(),
                        ..buffer
                    }),
                    None => self.facts.remove_buffer(name),
                }
            }
            Expr::Null | Expr::IntLit(0) => {
                self.facts.set_pointer(name, PointerFact::null());
                self.facts.remove_buffer(name);
            }
            _ => {
                self.facts.set_pointer(name, PointerFact::uninitialized());
                self.facts.remove_buffer(name);
            }
        }
    }

    fn observe_if(&mut self, condition: &Expr, then_branch: &[Stmt], else_branch: &[Stmt], location: Location) {
        self.visit_expr(condition, location);

        let test = null_test(condition).filter(|t| self.facts.pointer(t.name()).is_some());
        let saved = self.facts.clone();

        if let Some(test) = &test {
            self.refine(test);
        }
        self.observe_all(then_branch);
        let after_then = std::mem::replace(&mut self.facts, saved);

        if let Some(test) = test {
            self.refine(&test.negate());
        }
        self.observe_all(else_branch);

        self.facts = after_then.join(&self.facts);
    }

    fn refine(&mut self, test: &NullTest) {
        let Some(fact) = self.facts.pointer_mut(test.name()) else {
            return;
        };
        fact.null_checked = true;
        if let NullTest::IsNull(_) = test {
            fact.state = PointerState::Uninitialized;
            fact.known_null = true;
            fact.maybe_freed = false;
        }
    }

    fn observe_loop(
        &mut self,
        header: Option<&LoopHeader>,
        condition: Option<&Expr>,
        body: &[Stmt],
        location: Location,
    ) {
        if let Some(header) = header {
            if let Some(init) = &header.init {
                self.visit_expr(init, location);
            }
            self.visit_expr(&header.bound, location);
        }
        if let Some(condition) = condition {
            self.visit_expr(condition, location);
        }

        self.ranges.enter_loop(header, location, &self.facts);
        let before = self.facts.clone();
        self.observe_all(body);
        self.facts = before.join(&self.facts);
        self.ranges.exit_loop();
    }

    fn observe_return(&mut self, value: Option<&Expr>, location: Location) {
        match value {
            Some(Expr::Ident(name)) if self.facts.is_pointer(name) => {
                self.transition(name, PointerEvent::Escape, location, "returned");
            }
            Some(Expr::Call(call)) => {
                self.handle_call(call, location);
            }
            Some(other) => self.visit_expr(other, location),
            None => {}
        }
        self.check_leaks(location);
        self.facts.terminate();
    }

    fn check_leaks(&mut self, location: Location) {
        let leaked: Vec<(String, Option<Location>)> = self
            .facts
            .pointer_names()
            .into_iter()
            .filter_map(|name| {
                let fact = self.facts.pointer(name)?;
                fact.state
                    .owns_allocation()
                    .then(|| (name.to_string(), fact.alloc_site))
            })
            .collect();

        for (name, site) in leaked {
            let origin = site
                .map(|s| format!(" (allocated at line {})", s.line))
                .unwrap_or_default();
            self.emit(Finding::new(
                RuleId::LeakedAllocation,
                self.function.as_str(),
                location,
                format!("'{}'{} is not freed on this path", name, origin),
            )
            .with_subject(name));
        }
    }

    /// Walk an expression for its accesses and calls
    pub(super) fn visit_expr(&mut self, expr: &Expr, location: Location) {
        match expr {
            Expr::Call(call) => {
                self.handle_call(call, location);
            }
            Expr::Index { base, index } => {
                self.visit_expr(index, location);
                self.visit_expr(base, location);
                self.deref_use(base, location, "indexed");
                self.check_index(base, index, location);
            }
            Expr::Deref(inner) => {
                self.visit_expr(inner, location);
                self.deref_use(inner, location, "dereferenced");
            }
            Expr::Field { base, arrow, .. } => {
                self.visit_expr(base, location);
                if *arrow {
                    self.deref_use(base, location, "dereferenced");
                }
            }
            Expr::AddrOf(inner) | Expr::Not(inner) => self.visit_expr(inner, location),
            Expr::Binary { lhs, rhs, .. } | Expr::Cmp { lhs, rhs, .. } => {
                self.visit_expr(lhs, location);
                self.visit_expr(rhs, location);
            }
            Expr::Opaque(children) => {
                for child in children {
                    self.visit_expr(child, location);
                }
            }
            // sizeof does not evaluate its operand
            Expr::SizeofExpr(_)
            | Expr::SizeofType(_)
            | Expr::Ident(_)
            | Expr::StrLit(_)
            | Expr::IntLit(_)
            | Expr::Null => {}
        }
    }

    fn deref_use(&mut self, base: &Expr, location: Location, what: &str) {
        if let Some(name) = base.as_ident() {
            self.pointer_use(name, location, what, true);
        }
    }

    /// A read or write through `name`
    pub(super) fn pointer_use(&mut self, name: &str, location: Location, what: &str, check_null: bool) {
        let Some(fact) = self.facts.pointer(name).cloned() else {
            return;
        };
        if fact.state == PointerState::Freed || (fact.state == PointerState::Allocated && fact.maybe_freed) {
            self.transition(name, PointerEvent::Use, location, what);
        }
        if fact.state == PointerState::Allocated && check_null && !fact.null_checked && !fact.unchecked_reported {
            let origin = fact
                .alloc_site
                .map(|s| format!(" (allocated at line {})", s.line))
                .unwrap_or_default();
            if let Some(fact) = self.facts.pointer_mut(name) {
                fact.unchecked_reported = true;
            }
            self.emit(
                Finding::new(
                    RuleId::UncheckedAllocationUse,
                    self.function.as_str(),
                    location,
                    format!("'{}'{} is {} without a NULL check", name, origin, what),
                )
                .with_subject(name),
            );
        }
    }

    /// Apply a lifecycle event, reporting an illegal transition. A pointer
    /// freed on only some paths yields Low severity "possible" findings.
    pub(super) fn transition(&mut self, name: &str, event: PointerEvent, location: Location, what: &str) {
        let Some(fact) = self.facts.pointer_mut(name) else {
            return;
        };
        if event == PointerEvent::Deallocate && fact.known_null {
            trace!(pointer = name, "free of NULL");
            return;
        }
        let possible = fact.state == PointerState::Allocated && fact.maybe_freed;
        let step = fact.state.apply(event);
        trace!(pointer = name, ?event, from = %fact.state, to = %step.next, "transition");
        fact.state = step.next;
        if step.next != PointerState::Allocated {
            fact.maybe_freed = false;
        }

        let finding = match (step.violation, event) {
            (Some(LifecycleViolation::DoubleFree), _) => Finding::new(
                RuleId::DoubleFree,
                self.function.as_str(),
                location,
                format!("'{}' is freed again after an earlier free()", name),
            ),
            (Some(LifecycleViolation::UseAfterFree), _) => Finding::new(
                RuleId::UseAfterFree,
                self.function.as_str(),
                location,
                format!("'{}' is {} after free()", name, what),
            ),
            (None, PointerEvent::Deallocate) if possible => Finding::classified(
                RuleId::DoubleFree,
                Severity::Low,
                RuleId::DoubleFree.bug_class(),
                self.function.as_str(),
                location,
                format!("'{}' may already be freed on some path", name),
            ),
            (None, PointerEvent::Use | PointerEvent::Escape) if possible => Finding::classified(
                RuleId::UseAfterFree,
                Severity::Low,
                RuleId::UseAfterFree.bug_class(),
                self.function.as_str(),
                location,
                format!("'{}' is {} but may be freed on some path", name, what),
            ),
            _ => return,
        };
        self.emit(finding.with_subject(name));
    }

    fn check_index(&mut self, base: &Expr, index: &Expr, location: Location) {
        let capacity = match base {
            Expr::Ident(name) => self.facts.buffer(name).map(Buffer::element_capacity),
            other => match self.facts.kind_of(other) {
                Some(DeclKind::Array {
                    dimension: Some(dim),
                    ..
                }) => Some(Capacity::Known(*dim)),
                _ => None,
            },
        };
        let Some(capacity) = capacity else {
            return;
        };

        let array = base.render();
        if let Some(finding) =
            self.ranges
                .check_access(&self.function, &array, index, capacity, location, &self.facts)
        {
            self.emit(finding);
        }
    }

    /// Provenance of an expression's value
    pub(super) fn value_of(&self, expr: &Expr) -> ValueFact {
        match expr {
            Expr::StrLit(text) => ValueFact::literal(StringLiteralFact::of(text)),
            Expr::IntLit(_) | Expr::Null | Expr::SizeofType(_) | Expr::SizeofExpr(_) => {
                ValueFact::labeled(TaintLabel::Literal)
            }
            Expr::AddrOf(inner) => self.value_of(inner),
            Expr::Binary { .. } if eval_const(expr, &self.facts).is_some() => {
                ValueFact::labeled(TaintLabel::Literal)
            }
            other => self.facts.value(other).unwrap_or_else(ValueFact::unknown),
        }
    }

    /// Storage an argument designates
    pub(super) fn buffer_of(&self, expr: &Expr) -> Option<Buffer> {
        match expr {
            Expr::Ident(name) => self.facts.buffer(name).cloned(),
            Expr::Field { .. } | Expr::Index { .. } | Expr::Deref(_) => match self.facts.kind_of(expr)? {
                DeclKind::Array {
                    dimension: Some(dim),
                    element,
                } => Some(Buffer::fixed(expr.render(), *dim, element.size_of())),
                _ => None,
            },
            _ => None,
        }
    }

    pub(super) fn emit(&mut self, finding: Finding) {
        trace!(rule = %finding.rule_id(), line = finding.location().line, "finding");
        self.findings.push(finding);
    }
}
