//! Scenario tests on hand-built IR
//!
//! Each case drives the engine through the same entry point the pipeline
//! uses, without the C front end.

mod common;

use cguard_ir::features::c_ir::{CmpOp, Declaration, Expr, FunctionUnit, LoopHeader, Stmt};
use cguard_ir::features::rules::{ApiSpec, CalleePattern, PatternRule, RuleRegistry};
use cguard_ir::shared::models::Location;
use cguard_ir::{
    AnalysisConfig, AnalysisEngine, CancellationToken, Finding, ParseInputError, Preset, RuleId, Severity,
};
use common::{analyze, engine, engine_with, free, malloc, rule_ids, rule_lines, rule_subjects, UnitBuilder};
use pretty_assertions::assert_eq;

#[test]
fn test_literal_too_long_for_array() {
    let unit = UnitBuilder::new("f")
        .declare(|l| Declaration::char_array("tiny", 10, l))
        .call(
            "strcpy",
            vec![
                Expr::ident("tiny"),
                Expr::str("This string is way too long for the buffer"),
            ],
        )
        .build();
    let findings = analyze(unit);
    assert_eq!(rule_lines(&findings), vec![("unbounded-copy".to_string(), 3)]);
}

#[test]
fn test_short_literal_is_silent() {
    let unit = UnitBuilder::new("f")
        .declare(|l| Declaration::char_array("buffer", 100, l))
        .call("strcpy", vec![Expr::ident("buffer"), Expr::str("Hello")])
        .build();
    assert!(analyze(unit).is_empty());
}

#[test]
fn test_declarations_alone_are_silent() {
    let unit = UnitBuilder::new("decls")
        .declare(|l| Declaration::char_array("name", 20, l))
        .declare(|l| Declaration::int_array("numbers", 100, l))
        .declare(|l| Declaration::char_pointer("p", l))
        .build();
    assert!(analyze(unit).is_empty());
}

#[test]
fn test_reallocation_resets_state() {
    let unit = UnitBuilder::new("realloc_cycle")
        .stmt(|l| Stmt::declare_init(Declaration::char_pointer("ptr", l), malloc(50)))
        .call("free", free("ptr"))
        .stmt(|l| Stmt::assign(Expr::ident("ptr"), malloc(50), l))
        .stmt(|l| Stmt::assign(Expr::index(Expr::ident("ptr"), Expr::int(0)), Expr::int(65), l))
        .call("free", free("ptr"))
        .build();

    // unchecked use of the second allocation is the only report
    assert_eq!(rule_ids(&analyze(unit)), vec!["unchecked-allocation-use".to_string()]);
}

#[test]
fn test_early_return_leaks_on_one_path() {
    let unit = UnitBuilder::new("early")
        .stmt(|l| Stmt::declare_init(Declaration::int_pointer("numbers", l), malloc(400)))
        .stmt(|l| {
            Stmt::if_then(
                Expr::cmp(CmpOp::Eq, Expr::ident("numbers"), Expr::Null),
                vec![Stmt::ret(None, l)],
                l,
            )
        })
        .stmt(|l| {
            Stmt::if_then(
                Expr::ident("flag"),
                vec![Stmt::ret(None, Location::line(l.line))],
                l,
            )
        })
        .call("free", free("numbers"))
        .build();

    let findings = analyze(unit);
    assert_eq!(rule_lines(&findings), vec![("leaked-allocation".to_string(), 4)]);
}

#[test]
fn test_free_twice_reports_once_per_extra_free() {
    let unit = UnitBuilder::new("df")
        .stmt(|l| Stmt::declare_init(Declaration::int_pointer("data", l), malloc(40)))
        .call("free", free("data"))
        .call("free", free("data"))
        .call("free", free("data"))
        .build();
    assert_eq!(
        rule_lines(&analyze(unit)),
        vec![("double-free".to_string(), 4), ("double-free".to_string(), 5)]
    );
}

#[test]
fn test_use_between_free_and_reallocate() {
    let unit = UnitBuilder::new("uaf")
        .stmt(|l| Stmt::declare_init(Declaration::char_pointer("p", l), malloc(16)))
        .stmt(|l| Stmt::if_then(Expr::Not(Box::new(Expr::ident("p"))), vec![Stmt::ret(None, l)], l))
        .call("free", free("p"))
        .stmt(|l| Stmt::assign(Expr::deref(Expr::ident("p")), Expr::int(0), l))
        .stmt(|l| Stmt::assign(Expr::ident("p"), malloc(16), l))
        .stmt(|l| Stmt::if_then(Expr::Not(Box::new(Expr::ident("p"))), vec![Stmt::ret(None, l)], l))
        .stmt(|l| Stmt::assign(Expr::deref(Expr::ident("p")), Expr::int(0), l))
        .call("free", free("p"))
        .build();
    assert_eq!(rule_lines(&analyze(unit)), vec![("use-after-free".to_string(), 5)]);
}

#[test]
fn test_two_freed_pointers_in_one_call() {
    let unit = UnitBuilder::new("uaf_pair")
        .stmt(|l| Stmt::declare_init(Declaration::char_pointer("p", l), malloc(16)))
        .stmt(|l| Stmt::declare_init(Declaration::char_pointer("q", l), malloc(16)))
        .call("free", free("p"))
        .call("free", free("q"))
        .call("strcpy", vec![Expr::ident("p"), Expr::ident("q")])
        .build();

    let uses: Vec<_> = rule_subjects(&analyze(unit))
        .into_iter()
        .filter(|(rule, _, _)| rule == "use-after-free")
        .collect();
    assert_eq!(
        uses,
        vec![
            ("use-after-free".to_string(), 6, "p".to_string()),
            ("use-after-free".to_string(), 6, "q".to_string()),
        ]
    );
}

#[test]
fn test_every_pointer_leaked_at_one_return_is_reported() {
    let unit = UnitBuilder::new("leak_pair")
        .stmt(|l| Stmt::declare_init(Declaration::char_pointer("a", l), malloc(10)))
        .stmt(|l| Stmt::declare_init(Declaration::char_pointer("b", l), malloc(10)))
        .stmt(|l| Stmt::ret(None, l))
        .build();
    assert_eq!(
        rule_subjects(&analyze(unit)),
        vec![
            ("leaked-allocation".to_string(), 4, "a".to_string()),
            ("leaked-allocation".to_string(), 4, "b".to_string()),
        ]
    );
}

#[test]
fn test_two_out_of_range_accesses_in_one_statement() {
    let unit = UnitBuilder::new("oob_pair")
        .declare(|l| Declaration::int_array("arr", 10, l))
        .declare(|l| Declaration::int_array("buf", 5, l))
        .stmt(|l| {
            Stmt::assign(
                Expr::index(Expr::ident("arr"), Expr::int(10)),
                Expr::index(Expr::ident("buf"), Expr::int(7)),
                l,
            )
        })
        .build();
    assert_eq!(
        rule_subjects(&analyze(unit)),
        vec![
            ("array-index-out-of-bounds".to_string(), 4, "arr".to_string()),
            ("array-index-out-of-bounds".to_string(), 4, "buf".to_string()),
        ]
    );
}

#[test]
fn test_freeing_null_pointer_is_a_no_op() {
    let unit = UnitBuilder::new("free_null")
        .stmt(|l| Stmt::declare_init(Declaration::char_pointer("p", l), Expr::Null))
        .call("free", free("p"))
        .call("free", free("p"))
        .build();
    assert!(analyze(unit).is_empty());
}

#[test]
fn test_free_on_one_branch_then_use_is_possible() {
    let unit = UnitBuilder::new("maybe_freed")
        .stmt(|l| Stmt::declare_init(Declaration::char_pointer("p", l), malloc(16)))
        .stmt(|l| Stmt::if_then(Expr::Not(Box::new(Expr::ident("p"))), vec![Stmt::ret(None, l)], l))
        .stmt(|l| Stmt::if_then(Expr::ident("flag"), vec![Stmt::call("free", free("p"), l)], l))
        .stmt(|l| Stmt::assign(Expr::index(Expr::ident("p"), Expr::int(0)), Expr::int(1), l))
        .call("free", free("p"))
        .build();

    let findings = analyze(unit);
    assert_eq!(
        rule_lines(&findings),
        vec![("use-after-free".to_string(), 5), ("double-free".to_string(), 6)]
    );
    assert!(findings.iter().all(|f| f.severity() == Severity::Low));
}

#[test]
fn test_sprintf_into_unknown_destination_is_silent() {
    let unit = UnitBuilder::new("fmt")
        .param(Declaration::char_pointer("out", Location::line(1)))
        .declare(|l| Declaration::char_array("local", 8, l))
        .call("sprintf", vec![Expr::ident("out"), Expr::str("%d"), Expr::ident("v")])
        .call("sprintf", vec![Expr::ident("local"), Expr::str("%d"), Expr::ident("v")])
        .build();
    assert_eq!(rule_lines(&analyze(unit)), vec![("unbounded-format".to_string(), 4)]);
}

#[test]
fn test_loop_bound_inclusive_vs_exclusive() {
    let body = |l: Location| {
        vec![Stmt::assign(
            Expr::index(Expr::ident("arr"), Expr::ident("i")),
            Expr::int(0),
            Location::line(l.line + 1),
        )]
    };

    let inclusive = UnitBuilder::new("le")
        .declare(|l| Declaration::int_array("arr", 10, l))
        .stmt(|l| Stmt::for_loop(LoopHeader::counting_up("i", 0, CmpOp::Le, Expr::int(10)), body(l), l))
        .build();
    assert_eq!(rule_lines(&analyze(inclusive)), vec![("loop-off-by-one".to_string(), 3)]);

    let exclusive = UnitBuilder::new("lt")
        .declare(|l| Declaration::int_array("arr", 10, l))
        .stmt(|l| Stmt::for_loop(LoopHeader::counting_up("i", 0, CmpOp::Lt, Expr::int(10)), body(l), l))
        .build();
    assert!(analyze(exclusive).is_empty());
}

#[test]
fn test_fast_preset_skips_loop_bounds() {
    let unit = UnitBuilder::new("le")
        .declare(|l| Declaration::int_array("arr", 10, l))
        .stmt(|l| {
            Stmt::for_loop(
                LoopHeader::counting_up("i", 0, CmpOp::Le, Expr::int(10)),
                vec![Stmt::assign(
                    Expr::index(Expr::ident("arr"), Expr::ident("i")),
                    Expr::int(0),
                    l,
                )],
                l,
            )
        })
        .build();
    let run = engine_with(AnalysisConfig::preset(Preset::Fast)).analyze(&[unit]);
    assert!(run.findings().is_empty());
}

#[test]
fn test_strict_null_checks_counts_library_calls() {
    let unit = || {
        UnitBuilder::new("strict")
            .stmt(|l| Stmt::declare_init(Declaration::char_pointer("buf", l), malloc(64)))
            .call("strcpy", vec![Expr::ident("buf"), Expr::str("Data")])
            .call("free", free("buf"))
            .build()
    };

    assert!(analyze(unit()).is_empty());

    let strict = engine_with(AnalysisConfig::preset(Preset::Thorough)).analyze(&[unit()]);
    assert_eq!(
        rule_lines(strict.findings()),
        vec![("unchecked-allocation-use".to_string(), 3)]
    );
}

#[test]
fn test_malformed_function_does_not_stop_run() {
    let mut broken = FunctionUnit::new("broken", Location::line(1));
    broken.syntax_errors.push(Location::line(2));

    let good = UnitBuilder::new("good")
        .declare(|l| Declaration::int_array("arr", 10, l))
        .stmt(|l| Stmt::assign(Expr::index(Expr::ident("arr"), Expr::int(10)), Expr::int(1), l))
        .build();

    let run = engine().analyze(&[broken, good]);
    let failures: Vec<_> = run.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "broken");
    assert!(matches!(failures[0].1, ParseInputError::SyntaxError { line: 2, .. }));
    assert_eq!(rule_ids(run.findings()), vec!["array-index-out-of-bounds".to_string()]);
}

#[test]
fn test_cancelled_run_skips_everything() {
    let units: Vec<FunctionUnit> = (0..4)
        .map(|i| {
            UnitBuilder::new(&format!("f{}", i))
                .call("gets", vec![Expr::ident("buf")])
                .build()
        })
        .collect();
    let token = CancellationToken::new();
    token.cancel();

    let run = engine().analyze_with_cancel(&units, &token);
    assert!(run.cancelled);
    assert_eq!(run.skipped, 4);
    assert!(run.findings().is_empty());
}

#[test]
fn test_parallel_matches_sequential() {
    let units: Vec<FunctionUnit> = (0..16)
        .map(|i| {
            UnitBuilder::new(&format!("f{}", i))
                .declare(|l| Declaration::char_array("tiny", 4, l))
                .call("strcpy", vec![Expr::ident("tiny"), Expr::str("overflowing")])
                .call("gets", vec![Expr::ident("tiny")])
                .build()
        })
        .collect();

    let sequential = engine_with(AnalysisConfig::default().with_parallel(false)).analyze(&units);
    let parallel = engine_with(AnalysisConfig::default().with_parallel(true)).analyze(&units);
    assert_eq!(sequential.findings(), parallel.findings());
    assert_eq!(sequential.findings().len(), 32);
}

#[test]
fn test_custom_allocator_from_config() {
    let config = AnalysisConfig::from_yaml_str(
        "version: 1\npreset: balanced\noverrides:\n  extra_allocators: [xmalloc]\n  extra_deallocators: [xfree]\n",
    )
    .unwrap();

    let unit = UnitBuilder::new("custom")
        .stmt(|l| {
            Stmt::declare_init(
                Declaration::char_pointer("p", l),
                Expr::call("xmalloc", vec![Expr::int(8)]),
            )
        })
        .call("xfree", free("p"))
        .call("xfree", free("p"))
        .build();

    let run = engine_with(config).analyze(&[unit]);
    assert_eq!(rule_ids(run.findings()), vec!["double-free".to_string()]);
}

#[test]
fn test_registered_pattern_rule() {
    let mut registry = RuleRegistry::with_builtins();
    registry.register_api(CalleePattern::prefix("unsafe_"), ApiSpec::library());
    registry.register_rule(Box::new(PatternRule::new(
        RuleId::Custom("banned-api".to_string()),
        CalleePattern::prefix("unsafe_"),
        |call| {
            Some(Finding::new(
                RuleId::Custom("banned-api".to_string()),
                call.function,
                call.location,
                format!("{}() is banned", call.callee),
            ))
        },
    )));

    let engine = AnalysisEngine::with_registry(AnalysisConfig::default(), registry).unwrap();
    let unit = UnitBuilder::new("g")
        .call("unsafe_copy", vec![Expr::ident("a"), Expr::ident("b")])
        .build();
    let run = engine.analyze(&[unit]);
    assert_eq!(rule_ids(run.findings()), vec!["banned-api".to_string()]);
}
