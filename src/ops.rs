//! SQL operators.
//!
//! This module defines the scalar functions that are written with operator
//! syntax in SQL rather than as `name(args)` calls. It categorizes them,
//! defines their precedences, and implements a function for writing them
//! with minimal parenthesization.

use std::collections::HashMap;
use std::fmt;

/// Operator precedence (zero is lowest).
pub type Precedence = u32;

/// Kinds of operators.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Kind {
    /// A logical operator.
    Logic,
    /// A binary comparison operator.
    Comp,
    /// An arithmetic or string operator.
    Arith,
}

/// The lowest operator precedence, reserved for special use.
pub const LOWEST_PRECEDENCE: Precedence = 0;

/// The highest operator precedence, reserved for special use.
pub const HIGHEST_PRECEDENCE: Precedence = 9;

/// An operator recognized in function calls.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Operator {
    /// The SQL token, e.g. `AND` or `+`.
    pub token: &'static str,
    pub kind: Kind,
    pub precedence: Precedence,
    /// Number of operands: 1 for prefix operators, 2 for infix ones.
    pub arity: usize,
}

/// List of precedence tiers, in order of increasing precedence. Each entry
/// maps a function name to its SQL token.
const PRECEDENCE_LIST: [&[(&str, &str)]; (HIGHEST_PRECEDENCE - 1) as usize] = [
    &[("op_or", "OR")],
    &[("op_and", "AND")],
    &[("op_not", "NOT")],
    &[
        ("op_=", "="),
        ("op_<>", "<>"),
        ("op_<", "<"),
        ("op_<=", "<="),
        ("op_>", ">"),
        ("op_>=", ">="),
        ("op_like", "LIKE"),
        ("op_ilike", "ILIKE"),
    ],
    &[("op_||", "||")],
    &[("add", "+"), ("subtract", "-")],
    &[("multiply", "*"), ("divide", "/"), ("modulus", "%")],
    &[("negate", "-")],
];

/// List of function names organized by their operator kind.
const KIND_LIST: [(Kind, &[&str]); 3] = [
    (Kind::Logic, &["op_or", "op_and", "op_not"]),
    (
        Kind::Comp,
        &["op_=", "op_<>", "op_<", "op_<=", "op_>", "op_>=", "op_like", "op_ilike"],
    ),
    (
        Kind::Arith,
        &["op_||", "add", "subtract", "multiply", "divide", "modulus", "negate"],
    ),
];

/// Function names written as prefix operators.
const PREFIX: [&str; 2] = ["op_not", "negate"];

lazy_static! {
    /// A mapping from function names to operators.
    static ref OPERATOR_MAP: HashMap<&'static str, Operator> = {
        let mut kinds = HashMap::new();
        for &(kind, names) in KIND_LIST.iter() {
            for &name in names {
                kinds.insert(name, kind);
            }
        }
        let mut map = HashMap::new();
        for (i, &tier) in PRECEDENCE_LIST.iter().enumerate() {
            for &(name, token) in tier {
                let operator = Operator {
                    token,
                    kind: kinds[name],
                    precedence: (i + 1) as Precedence,
                    arity: if PREFIX.contains(&name) { 1 } else { 2 },
                };
                map.insert(name, operator);
            }
        }
        map
    };
}

/// Returns the operator for a function name, or None if the function is
/// written with call syntax.
pub fn operator(name: &str) -> Option<Operator> {
    OPERATOR_MAP.get(name).cloned()
}

/// Returns the precedence of the function's operator, or None if it is not
/// an operator.
pub fn precedence(name: &str) -> Option<Precedence> {
    operator(name).map(|op| op.precedence)
}

/// Returns the kind of the function's operator, or None if it is not an
/// operator.
pub fn kind(name: &str) -> Option<Kind> {
    operator(name).map(|op| op.kind)
}

/// An expression that may need to be parenthesized.
pub trait Parenthesize {
    /// Returns the precedence of the expression.
    fn precedence(&self) -> Precedence;
}

/// Formats a prefix or infix operation.
///
/// Writes the operation to `f`. The length of `args` must match the arity of
/// `op`, otherwise `fmt::Error` is returned. Writes spaces around infix
/// operators, and after word-like prefix operators (`NOT x`, but `-x`).
/// Arithmetic and logical operators are left-associative; comparisons do not
/// associate, so an equal-precedence left operand is parenthesized as well.
pub fn write_operation<W, T>(f: &mut W, op: &Operator, args: &[T]) -> fmt::Result
where
    W: fmt::Write,
    T: fmt::Display + Parenthesize,
{
    let prec = op.precedence;
    match args {
        [arg] if op.arity == 1 => {
            let sep = if op.token.ends_with(char::is_alphabetic) { " " } else { "" };
            if prec >= arg.precedence() {
                write!(f, "{}{}({})", op.token, sep, arg)
            } else {
                write!(f, "{}{}{}", op.token, sep, arg)
            }
        }
        [lhs, rhs] if op.arity == 2 => {
            let lhs_parens = if op.kind == Kind::Comp {
                prec >= lhs.precedence()
            } else {
                prec > lhs.precedence()
            };
            match (lhs_parens, prec >= rhs.precedence()) {
                (false, false) => write!(f, "{} {} {}", lhs, op.token, rhs),
                (false, true) => write!(f, "{} {} ({})", lhs, op.token, rhs),
                (true, false) => write!(f, "({}) {} {}", lhs, op.token, rhs),
                (true, true) => write!(f, "({}) {} ({})", lhs, op.token, rhs),
            }
        }
        _ => Err(fmt::Error),
    }
}
