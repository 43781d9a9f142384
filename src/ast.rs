use std::fmt::Display;

/// An immutable expression tree.
///
/// Every interior node owns its children, so a parsed tree can be evaluated
/// any number of times, from any number of threads, without copying.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal(f64),
    /// A name resolved with zero arguments.
    Variable(String),
    /// A name resolved with the values of `arguments`, evaluated left to right.
    Call {
        name: String,
        arguments: Vec<Node>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    /// Not produced by the grammar; built by hosts that assemble trees directly.
    Ternary {
        op: TernaryOp,
        operands: Box<[Node; 3]>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TernaryOp {
    /// `(value, min, max)`
    Clamp,
}

impl Node {
    pub fn variable(name: impl Into<String>) -> Self {
        Node::Variable(name.into())
    }

    pub fn call(name: impl Into<String>, arguments: Vec<Node>) -> Self {
        Node::Call {
            name: name.into(),
            arguments,
        }
    }

    pub fn unary(op: UnaryOp, operand: Node) -> Self {
        Node::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, lhs: Node, rhs: Node) -> Self {
        Node::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn ternary(op: TernaryOp, first: Node, second: Node, third: Node) -> Self {
        Node::Ternary {
            op,
            operands: Box::new([first, second, third]),
        }
    }
}

impl BinaryOp {
    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Subtract => '-',
            BinaryOp::Multiply => '*',
            BinaryOp::Divide => '/',
        }
    }
}

impl TernaryOp {
    pub fn name(self) -> &'static str {
        match self {
            TernaryOp::Clamp => "clamp",
        }
    }
}

/// Fully parenthesised infix form. Trees produced by the parser print back to
/// text that parses to an equal tree; ternary nodes print as the equivalent call.
impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // `inf` would read back as a name
            Node::Literal(value) if *value == f64::INFINITY => write!(f, "1e999"),
            Node::Literal(value) if *value == f64::NEG_INFINITY => write!(f, "(-1e999)"),
            Node::Literal(value) => write!(f, "{value}"),
            Node::Variable(name) => write!(f, "{name}"),
            Node::Call { name, arguments } => {
                write!(f, "{name}(")?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                write!(f, ")")
            }
            Node::Unary {
                op: UnaryOp::Negate,
                operand,
            } => write!(f, "(-{operand})"),
            Node::Binary { op, lhs, rhs } => write!(f, "({lhs} {} {rhs})", op.symbol()),
            Node::Ternary { op, operands } => {
                let [first, second, third] = &**operands;
                write!(f, "{}({first}, {second}, {third})", op.name())
            }
        }
    }
}
