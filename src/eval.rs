use crate::{
    ast::{BinaryOp, Node, TernaryOp, UnaryOp},
    context::{Context, ResolveError},
};

impl Node {
    /// Evaluates the tree against `context`.
    ///
    /// Arithmetic follows plain IEEE-754 rules (`1 / 0` is infinity, `0 / 0` is
    /// NaN). The only failure is a name the context cannot resolve, which is
    /// returned unchanged.
    pub fn evaluate<C: Context + ?Sized>(&self, context: &C) -> Result<f64, ResolveError> {
        Ok(match self {
            Node::Literal(value) => *value,
            Node::Variable(name) => {
                tracing::trace!(name = name.as_str(), "resolving variable");
                context.resolve(name, &[])?
            }
            Node::Call { name, arguments } => {
                let values = arguments
                    .iter()
                    .map(|argument| argument.evaluate(context))
                    .collect::<Result<Vec<_>, _>>()?;
                tracing::trace!(name = name.as_str(), ?values, "calling function");
                context.resolve(name, &values)?
            }
            Node::Unary { op, operand } => op.apply(operand.evaluate(context)?),
            Node::Binary { op, lhs, rhs } => {
                let lhs = lhs.evaluate(context)?;
                let rhs = rhs.evaluate(context)?;
                op.apply(lhs, rhs)
            }
            Node::Ternary { op, operands } => {
                let [first, second, third] = &**operands;
                op.apply(
                    first.evaluate(context)?,
                    second.evaluate(context)?,
                    third.evaluate(context)?,
                )
            }
        })
    }
}

impl UnaryOp {
    pub fn apply(self, operand: f64) -> f64 {
        match self {
            UnaryOp::Negate => -operand,
        }
    }
}

impl BinaryOp {
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Subtract => lhs - rhs,
            BinaryOp::Multiply => lhs * rhs,
            BinaryOp::Divide => lhs / rhs,
        }
    }
}

impl TernaryOp {
    pub fn apply(self, first: f64, second: f64, third: f64) -> f64 {
        match self {
            TernaryOp::Clamp => clamp(first, second, third),
        }
    }
}

/// Unlike [`f64::clamp`] this never panics: with `min > max` the result is `max`.
pub(crate) fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}
