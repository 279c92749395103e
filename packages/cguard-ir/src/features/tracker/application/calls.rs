/*
 * Call handling
 *
 * Order per call site:
 *   1. nested expressions inside arguments
 *   2. lifecycle effects on pointer arguments (free, use, escape)
 *   3. rule registry over the resolved argument facts
 *   4. data effects (input taint, copied provenance)
 */

use super::lifetime_tracker::LifetimeTracker;
use crate::features::c_ir::{Call, Expr};
use crate::features::evaluator::eval_const;
use crate::features::facts::{PointerEvent, TaintLabel, ValueFact};
use crate::features::rules::{ApiClass, ApiSpec, ArgFact, ResolvedCall};
use crate::features::tracker::domain::access_key;
use crate::shared::models::Location;

impl<'r> LifetimeTracker<'r> {
    /// Process one call; returns the provenance of its result
    pub(super) fn handle_call(&mut self, call: &Call, location: Location) -> ValueFact {
        let registry = self.registry;
        let spec = registry.resolve(&call.callee);

        for arg in &call.args {
            if arg.as_ident().is_none() {
                self.visit_expr(arg, location);
            }
        }

        self.lifecycle_effects(call, spec, location);

        let args: Vec<ArgFact> = call.args.iter().map(|arg| self.resolve_arg(arg)).collect();
        let resolved = ResolvedCall {
            callee: &call.callee,
            spec,
            function: &self.function,
            location,
            args,
        };
        let found = registry.check(&resolved);
        let args = resolved.args;
        for finding in found {
            self.emit(finding);
        }

        if let Some(spec) = spec {
            self.data_effects(call, spec, &args);
        }

        match spec.map(|s| s.class) {
            Some(ApiClass::TaintSource) => ValueFact::external(),
            _ => ValueFact::unknown(),
        }
    }

    fn lifecycle_effects(&mut self, call: &Call, spec: Option<&ApiSpec>, location: Location) {
        if spec.map(|s| s.class) == Some(ApiClass::Deallocator) {
            if let Some(name) = call.args.first().and_then(Expr::as_ident) {
                self.transition(name, PointerEvent::Deallocate, location, "freed");
            }
            return;
        }

        let what = format!("passed to {}()", call.callee);
        for name in call.args.iter().filter_map(Expr::as_ident) {
            if !self.facts.is_pointer(name) {
                continue;
            }
            match spec {
                Some(spec) if spec.dereferences_args() => {
                    self.pointer_use(name, location, &what, self.options.strict_null_checks);
                }
                Some(_) => {}
                // unknown callee may keep the pointer
                None => self.transition(name, PointerEvent::Escape, location, &what),
            }
        }
    }

    fn resolve_arg(&self, expr: &Expr) -> ArgFact {
        let value = self.value_of(expr);
        let literal_text = match expr {
            Expr::StrLit(text) => Some(text.clone()),
            _ => None,
        };
        ArgFact {
            rendered: expr.render(),
            literal_text,
            literal: value.literal,
            label: value.label,
            buffer: self.buffer_of(expr),
            constant: eval_const(expr, &self.facts),
        }
    }

    fn data_effects(&mut self, call: &Call, spec: &ApiSpec, args: &[ArgFact]) {
        for index in spec.input_targets(call.args.len()) {
            if let Some(key) = call.args.get(index).and_then(written_key) {
                self.facts.set_value(key, ValueFact::external());
            }
        }

        let Some(dest_key) = spec.dest.and_then(|i| call.args.get(i)).and_then(written_key) else {
            return;
        };

        match spec.class {
            ApiClass::Copy | ApiClass::BoundedCopy => {
                let Some(source) = spec.source.and_then(|i| args.get(i)) else {
                    return;
                };
                let copied = ValueFact {
                    label: source.label,
                    // a bounded copy may truncate
                    literal: if spec.class == ApiClass::Copy {
                        source.literal
                    } else {
                        None
                    },
                };
                let value = if spec.appends {
                    let current = spec
                        .dest
                        .and_then(|i| args.get(i))
                        .map(|d| d.label)
                        .unwrap_or(TaintLabel::Unknown);
                    ValueFact::labeled(current.join(copied.label))
                } else {
                    copied
                };
                self.facts.set_value(dest_key, value);
            }
            ApiClass::Format | ApiClass::BoundedFormat => {
                let label = spec
                    .format
                    .map(|first| {
                        args.iter()
                            .skip(first)
                            .fold(TaintLabel::Literal, |acc, a| acc.join(a.label))
                    })
                    .unwrap_or(TaintLabel::Unknown);
                self.facts.set_value(dest_key, ValueFact::labeled(label));
            }
            _ => {}
        }
    }
}

/// Key of the storage a call writes through (`&x` writes `x`)
fn written_key(expr: &Expr) -> Option<String> {
    match expr {
        Expr::AddrOf(inner) => access_key(inner),
        other => access_key(other),
    }
}
