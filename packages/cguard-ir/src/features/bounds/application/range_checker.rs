/*
 * Range Checker
 *
 * Holds the stack of enclosing loops while the tracker walks a function.
 * Each loop reports at most one off-by-one finding, anchored at the loop.
 */

use tracing::trace;

use crate::features::bounds::domain::Interval;
use crate::features::c_ir::{BinOp, Expr, LoopHeader};
use crate::features::evaluator::{eval_const, ConstEnv};
use crate::features::facts::{Capacity, IndexFact};
use crate::features::reporting::{Finding, RuleId};
use crate::shared::models::Location;

/// One enclosing loop
#[derive(Debug, Clone)]
pub struct LoopContext {
    pub header: Option<LoopHeader>,
    pub interval: Option<Interval>,
    pub location: Location,
    flagged: bool,
}

#[derive(Debug, Clone)]
pub struct RangeChecker {
    loops: Vec<LoopContext>,
    loop_bounds: bool,
}

impl RangeChecker {
    pub fn new(loop_bounds: bool) -> Self {
        Self {
            loops: Vec::new(),
            loop_bounds,
        }
    }

    pub fn enter_loop(&mut self, header: Option<&LoopHeader>, location: Location, env: &dyn ConstEnv) {
        let interval = header.and_then(|h| Interval::from_header(h, env));
        trace!(?location, ?interval, "enter loop");
        self.loops.push(LoopContext {
            header: header.cloned(),
            interval,
            location,
            flagged: false,
        });
    }

    pub fn exit_loop(&mut self) {
        self.loops.pop();
    }

    pub fn depth(&self) -> usize {
        self.loops.len()
    }

    /// Classify the index expression of an access into a buffer of
    /// `capacity` elements
    pub fn classify(&self, index: &Expr, capacity: Capacity, env: &dyn ConstEnv) -> IndexFact {
        if let Some(value) = eval_const(index, env) {
            return match capacity.known() {
                Some(cap) if value < 0 || value as u64 >= cap => IndexFact::ConstantOutOfBounds(value),
                Some(_) => IndexFact::ConstantInBounds(value),
                None => IndexFact::Unknown,
            };
        }

        let Some((var, offset)) = loop_var_offset(index, env) else {
            return IndexFact::Unknown;
        };
        match self.innermost_header(var) {
            Some(header) => IndexFact::LoopBound {
                var: var.to_string(),
                op: header.op,
                bound: header.bound.clone(),
                offset,
            },
            None => IndexFact::Unknown,
        }
    }

    /// Check `array[index]`; returns a finding for a constant out-of-range
    /// index or for the first out-of-range access of an enclosing loop
    pub fn check_access(
        &mut self,
        function: &str,
        array: &str,
        index: &Expr,
        capacity: Capacity,
        location: Location,
        env: &dyn ConstEnv,
    ) -> Option<Finding> {
        let cap = capacity.known()?;
        match self.classify(index, capacity, env) {
            IndexFact::ConstantOutOfBounds(value) => Some(Finding::new(
                RuleId::ArrayIndexOutOfBounds,
                function,
                location,
                format!(
                    "index {} is out of bounds for '{}' (capacity {}, valid 0..={})",
                    value,
                    array,
                    cap,
                    cap.saturating_sub(1)
                ),
            )
            .with_subject(array)),
            IndexFact::LoopBound {
                var,
                op,
                bound,
                offset,
            } if self.loop_bounds => {
                let ctx = self
                    .loops
                    .iter_mut()
                    .rev()
                    .find(|c| c.header.as_ref().is_some_and(|h| h.var == var))?;
                if ctx.flagged {
                    return None;
                }
                let reach = ctx.interval?.shift(offset)?;
                if !reach.exceeds(cap) {
                    return None;
                }
                ctx.flagged = true;
                Some(Finding::new(
                    RuleId::LoopOffByOne,
                    function,
                    ctx.location,
                    format!(
                        "loop condition '{} {} {}' lets '{}' index {} reach {} (capacity {})",
                        var,
                        op,
                        bound.render(),
                        array,
                        index.render(),
                        reach,
                        cap
                    ),
                )
                .with_subject(array))
            }
            _ => None,
        }
    }

    fn innermost_header(&self, var: &str) -> Option<&LoopHeader> {
        self.loops
            .iter()
            .rev()
            .filter_map(|c| c.header.as_ref())
            .find(|h| h.var == var)
    }
}

/// `i`, `i + k`, `k + i`, `i - k` with constant `k`
fn loop_var_offset<'e>(index: &'e Expr, env: &dyn ConstEnv) -> Option<(&'e str, i64)> {
    match index {
        Expr::Ident(name) => Some((name.as_str(), 0)),
        Expr::Binary { op, lhs, rhs } => match (op, lhs.as_ident(), rhs.as_ident()) {
            (BinOp::Add, Some(var), None) => Some((var, eval_const(rhs, env)?)),
            (BinOp::Add, None, Some(var)) => Some((var, eval_const(lhs, env)?)),
            (BinOp::Sub, Some(var), None) => Some((var, eval_const(rhs, env)?.checked_neg()?)),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::c_ir::CmpOp;
    use crate::features::evaluator::EmptyEnv;

    fn check(checker: &mut RangeChecker, index: Expr, cap: u64) -> Option<Finding> {
        checker.check_access("f", "arr", &index, Capacity::Known(cap), Location::line(5), &EmptyEnv)
    }

    #[test]
    fn test_constant_index_boundary() {
        let mut checker = RangeChecker::new(true);
        assert!(check(&mut checker, Expr::int(9), 10).is_none());
        assert!(check(&mut checker, Expr::int(10), 10).is_some());
        assert!(check(&mut checker, Expr::int(-1), 10).is_some());
        assert!(check(&mut checker, Expr::int(0), 10).is_none());
    }

    #[test]
    fn test_loop_le_flagged_once() {
        let mut checker = RangeChecker::new(true);
        let header = LoopHeader::counting_up("i", 0, CmpOp::Le, Expr::int(10));
        checker.enter_loop(Some(&header), Location::line(3), &EmptyEnv);
        let first = check(&mut checker, Expr::ident("i"), 10).unwrap();
        assert_eq!(first.rule_id(), &RuleId::LoopOffByOne);
        assert_eq!(first.location(), Location::line(3));
        assert!(check(&mut checker, Expr::ident("i"), 10).is_none());
        checker.exit_loop();
        assert_eq!(checker.depth(), 0);
    }

    #[test]
    fn test_loop_lt_not_flagged() {
        let mut checker = RangeChecker::new(true);
        let header = LoopHeader::counting_up("i", 0, CmpOp::Lt, Expr::int(10));
        checker.enter_loop(Some(&header), Location::line(3), &EmptyEnv);
        assert!(check(&mut checker, Expr::ident("i"), 10).is_none());
        // i + 1 reaches 10
        let plus_one = Expr::binary(BinOp::Add, Expr::ident("i"), Expr::int(1));
        assert!(check(&mut checker, plus_one, 10).is_some());
    }

    #[test]
    fn test_loop_bounds_disabled() {
        let mut checker = RangeChecker::new(false);
        let header = LoopHeader::counting_up("i", 0, CmpOp::Le, Expr::int(10));
        checker.enter_loop(Some(&header), Location::line(3), &EmptyEnv);
        assert!(check(&mut checker, Expr::ident("i"), 10).is_none());
    }

    #[test]
    fn test_classify_unknown() {
        let checker = RangeChecker::new(true);
        assert_eq!(
            checker.classify(&Expr::ident("k"), Capacity::Known(4), &EmptyEnv),
            IndexFact::Unknown
        );
        assert_eq!(
            checker.classify(&Expr::int(3), Capacity::Unknown, &EmptyEnv),
            IndexFact::Unknown
        );
    }
}
