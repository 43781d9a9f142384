use std::f64::consts::{E, PI};

use crate::{
    context::{Context, ResolveError},
    eval::clamp,
};

/// Tolerance used by `equal` and `notequal`.
const EPSILON: f64 = 1e-15;

/// Constants and functions of the standard math library.
///
/// | name | arity |
/// |------|-------|
/// | `pi`, `e` | 0 |
/// | `sin`, `cos`, `abs`, `sqrt`, `ceiling`, `floor`, `exp`, `log`, `round`, `sign` | 1 |
/// | `max`, `min` | 2 |
/// | `clamp(value, min, max)` | 3 |
/// | `greater`, `lesser`, `equal`, `notequal` `(a, b, then, otherwise)` | 4 |
///
/// `log` is the natural logarithm and `round` rounds half to even.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathContext;

fn arity(name: &str) -> Option<usize> {
    Some(match name {
        "pi" | "e" => 0,
        "sin" | "cos" | "abs" | "sqrt" | "ceiling" | "floor" | "exp" | "log" | "round"
        | "sign" => 1,
        "max" | "min" => 2,
        "clamp" => 3,
        "greater" | "lesser" | "equal" | "notequal" => 4,
        _ => return None,
    })
}

fn apply(name: &str, arguments: &[f64]) -> Option<f64> {
    Some(match (name, arguments) {
        ("pi", []) => PI,
        ("e", []) => E,
        ("sin", [x]) => x.sin(),
        ("cos", [x]) => x.cos(),
        ("abs", [x]) => x.abs(),
        ("sqrt", [x]) => x.sqrt(),
        ("ceiling", [x]) => x.ceil(),
        ("floor", [x]) => x.floor(),
        ("exp", [x]) => x.exp(),
        ("log", [x]) => x.ln(),
        ("round", [x]) => x.round_ties_even(),
        ("sign", [x]) => sign(*x),
        ("max", [a, b]) => a.max(*b),
        ("min", [a, b]) => a.min(*b),
        ("clamp", [value, min, max]) => clamp(*value, *min, *max),
        ("greater", [a, b, then, otherwise]) => pick(a > b, *then, *otherwise),
        ("lesser", [a, b, then, otherwise]) => pick(a < b, *then, *otherwise),
        ("equal", [a, b, then, otherwise]) => {
            pick((a - b).abs() < threshold(*a, *b), *then, *otherwise)
        }
        // Not the negation of `equal`: a difference exactly at the threshold
        // satisfies neither.
        ("notequal", [a, b, then, otherwise]) => {
            pick((a - b).abs() > threshold(*a, *b), *then, *otherwise)
        }
        _ => return None,
    })
}

fn threshold(a: f64, b: f64) -> f64 {
    EPSILON.max(EPSILON * a.min(b))
}

fn pick(condition: bool, then: f64, otherwise: f64) -> f64 {
    if condition { then } else { otherwise }
}

/// -1, 0 or 1; NaN stays NaN.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        x
    }
}

impl Context for MathContext {
    fn resolve(&self, name: &str, arguments: &[f64]) -> Result<f64, ResolveError> {
        apply(name, arguments).ok_or_else(|| match arity(name) {
            Some(expected) => ResolveError::ArityMismatch {
                name: name.to_string(),
                expected,
                found: arguments.len(),
            },
            None if arguments.is_empty() => ResolveError::unresolved(name, arguments),
            None => ResolveError::UnknownFunction {
                name: name.to_string(),
            },
        })
    }

    fn is_resolvable(&self, name: &str) -> bool {
        arity(name).is_some()
    }
}
