//! Property-based tests
//!
//! Invariants that must hold for all inputs:
//! - Literal copies: flagged iff the literal (with terminator) exceeds the
//!   destination
//! - Constant indices: flagged iff index >= capacity
//! - Counted loops: `<=` against the capacity is flagged, `<` never is
//! - Determinism: repeated runs produce identical findings

mod common;

use cguard_ir::features::c_ir::{CmpOp, Declaration, Expr, LoopHeader, Stmt};
use cguard_ir::shared::models::Location;
use common::{analyze, engine, rule_ids, UnitBuilder};
use proptest::prelude::*;

fn copy_literal(capacity: u64, literal: &str) -> Vec<String> {
    let unit = UnitBuilder::new("copy")
        .declare(|l| Declaration::char_array("dest", capacity, l))
        .call("strcpy", vec![Expr::ident("dest"), Expr::str(literal)])
        .build();
    rule_ids(&analyze(unit))
}

fn store_at(capacity: u64, index: i64) -> Vec<String> {
    let unit = UnitBuilder::new("store")
        .declare(|l| Declaration::int_array("arr", capacity, l))
        .stmt(|l| {
            Stmt::assign(
                Expr::index(Expr::ident("arr"), Expr::int(index)),
                Expr::int(0),
                l,
            )
        })
        .build();
    rule_ids(&analyze(unit))
}

fn counted_loop(capacity: u64, op: CmpOp, bound: i64) -> Vec<String> {
    let unit = UnitBuilder::new("walk")
        .declare(|l| Declaration::int_array("data", capacity, l))
        .stmt(|l| {
            Stmt::for_loop(
                LoopHeader::counting_up("i", 0, op, Expr::int(bound)),
                vec![Stmt::assign(
                    Expr::index(Expr::ident("data"), Expr::ident("i")),
                    Expr::ident("i"),
                    Location::line(l.line + 1),
                )],
                l,
            )
        })
        .build();
    rule_ids(&analyze(unit))
}

proptest! {
    #[test]
    fn prop_literal_copy_flagged_iff_too_long(capacity in 1u64..128, literal in "[a-zA-Z0-9 ]{0,160}") {
        let needed = literal.len() as u64 + 1;
        let findings = copy_literal(capacity, &literal);
        if needed > capacity {
            prop_assert_eq!(findings, vec!["unbounded-copy".to_string()]);
        } else {
            prop_assert!(findings.is_empty());
        }
    }

    #[test]
    fn prop_exact_fit_never_flagged(len in 0usize..100) {
        let literal = "x".repeat(len);
        prop_assert!(copy_literal(len as u64 + 1, &literal).is_empty());
    }

    #[test]
    fn prop_constant_index_flagged_iff_out_of_range(capacity in 1u64..512, index in 0i64..1024) {
        let findings = store_at(capacity, index);
        if index as u64 >= capacity {
            prop_assert_eq!(findings, vec!["array-index-out-of-bounds".to_string()]);
        } else {
            prop_assert!(findings.is_empty());
        }
    }

    #[test]
    fn prop_last_element_is_in_bounds(capacity in 1u64..512) {
        prop_assert!(store_at(capacity, capacity as i64 - 1).is_empty());
        prop_assert_eq!(store_at(capacity, capacity as i64), vec!["array-index-out-of-bounds".to_string()]);
    }

    #[test]
    fn prop_inclusive_loop_bound_is_off_by_one(capacity in 1u64..256) {
        let cap = capacity as i64;
        prop_assert_eq!(counted_loop(capacity, CmpOp::Le, cap), vec!["loop-off-by-one".to_string()]);
        prop_assert!(counted_loop(capacity, CmpOp::Lt, cap).is_empty());
        prop_assert!(counted_loop(capacity, CmpOp::Le, cap - 1).is_empty());
    }

    #[test]
    fn prop_runs_are_deterministic(capacity in 1u64..64, index in 0i64..128, literal in "[a-z]{0,80}") {
        let unit = UnitBuilder::new("mixed")
            .declare(|l| Declaration::char_array("buf", capacity, l))
            .call("strcpy", vec![Expr::ident("buf"), Expr::str(literal.as_str())])
            .stmt(|l| Stmt::assign(Expr::index(Expr::ident("buf"), Expr::int(index)), Expr::int(0), l))
            .build();
        let units = vec![unit.clone(), unit];
        let first = engine().analyze(&units);
        let second = engine().analyze(&units);
        prop_assert_eq!(first.findings(), second.findings());
    }
}
