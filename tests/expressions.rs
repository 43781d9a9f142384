use std::f64::consts::{E, PI};
use std::sync::Arc;
use std::thread;

use expression_engine::{
    Context, Error, Expose, FirstMatch, HostContext, MathContext, Members, ResolveError,
    SyntaxError, Unwired, Variables, evaluate, parse,
};
use pretty_assertions::assert_eq;

const TOLERANCE: f64 = 0.001;

fn approx(actual: f64, expected: f64) -> bool {
    actual == expected
        || (actual.is_nan() && expected.is_nan())
        || (actual - expected).abs() < TOLERANCE
}

fn eval(formula: &str) -> f64 {
    parse(formula)
        .unwrap_or_else(|e| panic!("`{formula}` failed to parse: {e}"))
        .evaluate(&MathContext)
        .unwrap_or_else(|e| panic!("`{formula}` failed to evaluate: {e}"))
}

#[test]
fn arithmetic() {
    for (formula, expected) in [
        ("11.2", 11.2),
        ("10 + 12.2", 22.2),
        ("10 * 12.2", 122.0),
        ("10 - 12.2", -2.2),
        ("10 * -12.2", -122.0),
        ("12.2 / 10", 1.22),
        ("12.2 / -10", -1.22),
    ] {
        let evaluated = eval(formula);
        assert!(
            approx(evaluated, expected),
            "`{formula}` evaluated to {evaluated}, expected {expected}"
        );
    }
}

#[test]
fn precedence_and_associativity() {
    assert_eq!(eval("2 + 3 * 4"), 14.0);
    assert_eq!(eval("(2 + 3) * 4"), 20.0);
    assert_eq!(eval("10 - 3 - 2"), 5.0);
    assert_eq!(eval("64 / 4 / 2"), 8.0);
    assert_eq!(eval("--5"), 5.0);
    assert_eq!(eval("-+-5"), 5.0);
    assert_eq!(eval("2 * -(1 + 2)"), -6.0);
}

#[test]
fn scientific_notation() {
    assert_eq!(eval("1E-5"), 1e-5);
    assert_eq!(eval("2e3+1"), 2001.0);
    assert_eq!(eval("1.5E+2 * 2"), 300.0);
}

#[test]
fn floating_point_edges_are_not_special_cased() {
    assert_eq!(eval("1 / 0"), f64::INFINITY);
    assert!(eval("0 / 0").is_nan());
    assert!(eval("log(-1)").is_nan());
    assert_eq!(eval("log(0)"), f64::NEG_INFINITY);
}

const VALUES: [f64; 13] = [
    0.0, 1.0, -1.0, PI, E, 1e-14, 1e14, -1e-14, -1e14, 0.5, -0.5, 1.23456, -1.23456,
];

fn sign(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v.signum() }
}

fn tolerance_threshold(v: f64) -> f64 {
    1e-15_f64.max(1e-15 * v.min(0.0))
}

type Formula = fn(f64) -> String;
type Reference = fn(f64) -> f64;

#[test]
fn math_functions() {
    let functions: [(Formula, Reference); 19] = [
        (|_| "pi".into(), |_| PI),
        (|_| "e".into(), |_| E),
        (|v| format!("sin({v})"), f64::sin),
        (|v| format!("cos({v})"), f64::cos),
        (|v| format!("abs({v})"), f64::abs),
        (|v| format!("sqrt({v})"), f64::sqrt),
        (|v| format!("ceiling({v})"), f64::ceil),
        (|v| format!("floor({v})"), f64::floor),
        (|v| format!("exp({v})"), f64::exp),
        (|v| format!("log({v})"), f64::ln),
        (|v| format!("round({v})"), f64::round_ties_even),
        (|v| format!("sign({v})"), sign),
        (|v| format!("clamp({v}, 0, 1)"), |v| v.max(0.0).min(1.0)),
        (|v| format!("max({v}, 0)"), |v| v.max(0.0)),
        (|v| format!("min({v}, 0)"), |v| v.min(0.0)),
        (|v| format!("greater({v}, 0, 0, 1)"), |v| if v > 0.0 { 0.0 } else { 1.0 }),
        (|v| format!("lesser({v}, 0, 0, 1)"), |v| if v < 0.0 { 0.0 } else { 1.0 }),
        (|v| format!("equal({v}, 0, 0, 1)"), |v| {
            if v.abs() < tolerance_threshold(v) { 0.0 } else { 1.0 }
        }),
        (|v| format!("notequal({v}, 0, 0, 1)"), |v| {
            if v.abs() > tolerance_threshold(v) { 0.0 } else { 1.0 }
        }),
    ];

    for (formula, reference) in functions {
        for value in VALUES {
            let formula = formula(value);
            let expected = reference(value);
            let evaluated = eval(&formula);
            assert!(
                approx(evaluated, expected),
                "`{formula}` evaluated to {evaluated}, expected {expected}"
            );
        }
    }
}

#[test]
fn malformed_input() {
    assert!(matches!(
        parse("(1 + 2"),
        Err(SyntaxError::MissingCloseParen { .. })
    ));
    assert!(matches!(parse("1 +"), Err(SyntaxError::UnexpectedEof { .. })));
    assert!(matches!(parse("1 2"), Err(SyntaxError::TrailingInput { .. })));
    assert!(matches!(parse("f()"), Err(SyntaxError::EmptyArguments { .. })));
}

#[test]
fn unresolvable_names() {
    assert_eq!(
        parse("unknown_var").unwrap().evaluate(&MathContext),
        Err(ResolveError::Unresolved {
            name: "unknown_var".to_string(),
            arity: 0
        })
    );
    assert!(matches!(
        evaluate("1 + frobnicate(2)", &MathContext),
        Err(Error::Resolve(ResolveError::UnknownFunction { .. }))
    ));
    assert!(matches!(
        evaluate("1 +", &MathContext),
        Err(Error::Syntax(_))
    ));
}

struct Probe {
    x: i32,
    scale: f64,
}

impl Probe {
    fn scaled(&self, v: f64) -> f64 {
        v * self.scale
    }
}

impl Expose for Probe {
    fn members() -> Members<Self> {
        Members::new()
            .field("x", |probe: &Probe| probe.x)
            .method("f", 1, |_: &Probe, args: &[f64]| args[0])
            .method("scaled", 1, |probe: &Probe, args: &[f64]| probe.scaled(args[0]))
    }
}

#[test]
fn host_binding() {
    let context = HostContext::new(Probe { x: 7, scale: 2.0 });
    assert_eq!(evaluate("x", &context).unwrap(), 7.0);
    assert_eq!(evaluate("f(3)", &context).unwrap(), 3.0);
    assert_eq!(evaluate("scaled(x) + f(1)", &context).unwrap(), 15.0);
}

#[test]
fn host_binding_combined_with_math() {
    let context = FirstMatch::new()
        .with(HostContext::new(Probe { x: -4, scale: 0.5 }))
        .with(MathContext);
    assert_eq!(evaluate("abs(x) * scaled(pi)", &context).unwrap(), 2.0 * PI);
}

#[test]
fn first_match_agrees_with_the_resolving_context() {
    let b = Variables::from_iter([("y", 42.0)]);
    let combined = FirstMatch::new().with(MathContext).with(&b);
    let tree = parse("y").unwrap();
    assert_eq!(tree.evaluate(&combined), tree.evaluate(&b));
}

#[test]
fn unwired_placeholder_surfaces_the_name() {
    let error = evaluate("speed * 2", &Unwired).unwrap_err();
    assert!(matches!(
        error,
        Error::Resolve(ResolveError::NotImplemented { ref name }) if name == "speed"
    ));
}

#[test]
fn one_tree_many_threads() {
    let tree = Arc::new(parse("x * x + sqrt(x)").unwrap());
    let handles: Vec<_> = (1..=4)
        .map(|i| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || {
                let x = f64::from(i * i);
                let context = FirstMatch::new()
                    .with(Variables::new().with("x", x))
                    .with(MathContext);
                (x, tree.evaluate(&context).unwrap())
            })
        })
        .collect();

    for handle in handles {
        let (x, value) = handle.join().unwrap();
        assert_eq!(value, x * x + x.sqrt());
    }
}

#[test]
fn shared_context_across_threads() {
    let context: Arc<dyn Context + Send + Sync> = Arc::new(MathContext);
    let handles: Vec<_> = ["sin(pi / 2)", "cos(0)", "abs(-1)"]
        .into_iter()
        .map(|formula| {
            let context = Arc::clone(&context);
            thread::spawn(move || evaluate(formula, &context).unwrap())
        })
        .collect();

    for handle in handles {
        assert!(approx(handle.join().unwrap(), 1.0));
    }
}
