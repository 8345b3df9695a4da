//! Compile-time constant values and the operations defined on them.
//!
//! Go evaluates untyped constants with arbitrary precision. We settle for
//! `i128` integers and `f64` floats. A result that does not fit either is
//! [`ConstValue::Unknown`] rather than an error or a wrapped value, so that
//! valid programs with huge intermediates still load.

use std::cmp::Ordering;

use thiserror::Error;

/// The value of a constant.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Bool(bool),
    Int(i128),
    Float(f64),
    Complex(f64, f64),
    String(Box<str>),
    /// The value depends on a package that was not loaded.
    Unknown,
}

/// The representation kind of a [`ConstValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstKind {
    Unknown,
    Bool,
    String,
    Int,
    Float,
    Complex,
}

impl std::fmt::Display for ConstKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Complex => "complex",
        };

        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
    /// Logical negation, `!`.
    Not,
    /// Bitwise complement, `^`.
    Complement,
}

impl UnaryOp {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => Self::Plus,
            "-" => Self::Neg,
            "!" => Self::Not,
            "^" => Self::Complement,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    AndNot,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LogicalAnd,
    LogicalOr,
}

impl BinaryOp {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Rem,
            "&" => Self::And,
            "|" => Self::Or,
            "^" => Self::Xor,
            "&^" => Self::AndNot,
            "<<" => Self::Shl,
            ">>" => Self::Shr,
            "==" => Self::Eq,
            "!=" => Self::Ne,
            "<" => Self::Lt,
            "<=" => Self::Le,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            "&&" => Self::LogicalAnd,
            "||" => Self::LogicalOr,
            _ => return None,
        })
    }

    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge
        )
    }

    pub const fn is_shift(self) -> bool {
        matches!(self, Self::Shl | Self::Shr)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstOpError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("invalid shift count {0}")]
    ShiftCount(ConstValue),
    #[error("operator {op:?} not defined on {lhs} and {rhs} constants")]
    Undefined {
        op: BinaryOp,
        lhs: ConstKind,
        rhs: ConstKind,
    },
    #[error("operator {op:?} not defined on {operand} constant")]
    UndefinedUnary { op: UnaryOp, operand: ConstKind },
}

impl ConstValue {
    /// A float constant, or [`ConstValue::Unknown`] when `value` left the
    /// range of `f64`.
    pub fn float(value: f64) -> Self {
        match value.is_finite() {
            true => Self::Float(value),
            false => Self::Unknown,
        }
    }

    pub fn kind(&self) -> ConstKind {
        match self {
            Self::Bool(_) => ConstKind::Bool,
            Self::Int(_) => ConstKind::Int,
            Self::Float(_) => ConstKind::Float,
            Self::Complex(..) => ConstKind::Complex,
            Self::String(_) => ConstKind::String,
            Self::Unknown => ConstKind::Unknown,
        }
    }

    /// Returns the value as an integer if it is numeric and has no
    /// fractional or imaginary part.
    pub fn to_int(&self) -> Option<i128> {
        match *self {
            Self::Int(value) => Some(value),
            Self::Float(value) => float_to_int(value),
            Self::Complex(re, im) if im == 0.0 => float_to_int(re),
            _ => None,
        }
    }

    pub fn to_float(&self) -> Option<f64> {
        match *self {
            Self::Int(value) => Some(value as f64),
            Self::Float(value) => Some(value),
            Self::Complex(re, im) if im == 0.0 => Some(re),
            _ => None,
        }
    }

    pub fn to_complex(&self) -> Option<(f64, f64)> {
        match *self {
            Self::Complex(re, im) => Some((re, im)),
            _ => self.to_float().map(|re| (re, 0.0)),
        }
    }

    pub fn unary(&self, op: UnaryOp) -> Result<Self, ConstOpError> {
        let undefined = || ConstOpError::UndefinedUnary {
            op,
            operand: self.kind(),
        };

        match (op, self) {
            (_, Self::Unknown) => Ok(Self::Unknown),
            (UnaryOp::Plus, value) if value.kind() >= ConstKind::Int => {
                Ok(value.clone())
            }
            (UnaryOp::Neg, Self::Int(value)) => {
                Ok(value.checked_neg().map_or(Self::Unknown, Self::Int))
            }
            (UnaryOp::Neg, Self::Float(value)) => Ok(Self::Float(-value)),
            (UnaryOp::Neg, Self::Complex(re, im)) => Ok(Self::Complex(-re, -im)),
            (UnaryOp::Not, Self::Bool(value)) => Ok(Self::Bool(!value)),
            (UnaryOp::Complement, Self::Int(value)) => Ok(Self::Int(!value)),
            _ => Err(undefined()),
        }
    }

    pub fn binary(
        &self,
        op: BinaryOp,
        rhs: &Self,
    ) -> Result<Self, ConstOpError> {
        let undefined = || ConstOpError::Undefined {
            op,
            lhs: self.kind(),
            rhs: rhs.kind(),
        };

        if matches!(self, Self::Unknown) || matches!(rhs, Self::Unknown) {
            return Ok(Self::Unknown);
        }

        if op.is_shift() {
            return self.shift(op, rhs);
        }

        match (self, rhs) {
            (Self::Bool(lhs), Self::Bool(rhs)) => match op {
                BinaryOp::LogicalAnd => Ok(Self::Bool(*lhs && *rhs)),
                BinaryOp::LogicalOr => Ok(Self::Bool(*lhs || *rhs)),
                BinaryOp::Eq => Ok(Self::Bool(lhs == rhs)),
                BinaryOp::Ne => Ok(Self::Bool(lhs != rhs)),
                _ => Err(undefined()),
            },
            (Self::String(lhs), Self::String(rhs)) => match op {
                BinaryOp::Add => Ok(Self::String(format!("{lhs}{rhs}").into())),
                op if op.is_comparison() => {
                    Ok(Self::Bool(compare(op, lhs.cmp(rhs))))
                }
                _ => Err(undefined()),
            },
            (lhs, rhs)
                if lhs.kind() >= ConstKind::Int
                    && rhs.kind() >= ConstKind::Int =>
            {
                match lhs.kind().max(rhs.kind()) {
                    ConstKind::Int => match int_binary(op, lhs, rhs) {
                        Some(value) => Ok(value),
                        None => match op {
                            BinaryOp::Div | BinaryOp::Rem
                                if rhs.to_int() == Some(0) =>
                            {
                                Err(ConstOpError::DivisionByZero)
                            }
                            op if int_op(op) => Ok(Self::Unknown),
                            _ => Err(undefined()),
                        },
                    },
                    ConstKind::Float => float_binary(op, lhs, rhs)
                        .unwrap_or_else(|| Err(undefined())),
                    _ => complex_binary(op, lhs, rhs)
                        .unwrap_or_else(|| Err(undefined())),
                }
            }
            _ => Err(undefined()),
        }
    }

    fn shift(&self, op: BinaryOp, count: &Self) -> Result<Self, ConstOpError> {
        let count = count
            .to_int()
            .and_then(|count| u32::try_from(count).ok())
            .ok_or_else(|| ConstOpError::ShiftCount(count.clone()))?;

        let value = self.to_int().ok_or(ConstOpError::Undefined {
            op,
            lhs: self.kind(),
            rhs: ConstKind::Int,
        })?;

        Ok(match op {
            BinaryOp::Shl => 2i128
                .checked_pow(count)
                .and_then(|factor| value.checked_mul(factor))
                .map_or(Self::Unknown, Self::Int),
            _ => Self::Int(value >> count.min(127)),
        })
    }
}

impl std::fmt::Display for ConstValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Complex(re, im) => write!(f, "({re:?} + {im:?}i)"),
            Self::String(value) => write!(f, "{value:?}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Converts `value` to an integer if it is one, up to the rounding error of
/// a few `f64` operations: `0.1 * 3 * 10` is 3.
fn float_to_int(value: f64) -> Option<i128> {
    let rounded = value.round();
    let in_range = rounded >= i128::MIN as f64 && rounded < i128::MAX as f64;
    let tolerance = rounded.abs().max(1.0) * 4.0 * f64::EPSILON;
    ((value - rounded).abs() <= tolerance && in_range).then_some(rounded as i128)
}

fn compare(op: BinaryOp, ordering: Ordering) -> bool {
    match op {
        BinaryOp::Eq => ordering.is_eq(),
        BinaryOp::Ne => ordering.is_ne(),
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::Ge => ordering.is_ge(),
        _ => false,
    }
}

fn int_op(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::Add
            | BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Rem
            | BinaryOp::And
            | BinaryOp::Or
            | BinaryOp::Xor
            | BinaryOp::AndNot
    )
}

/// Integer arithmetic; `None` means overflow, division by zero, or an
/// operator that is not defined on integers.
fn int_binary(
    op: BinaryOp,
    lhs: &ConstValue,
    rhs: &ConstValue,
) -> Option<ConstValue> {
    let (lhs, rhs) = (lhs.to_int()?, rhs.to_int()?);

    let value = match op {
        BinaryOp::Add => lhs.checked_add(rhs)?,
        BinaryOp::Sub => lhs.checked_sub(rhs)?,
        BinaryOp::Mul => lhs.checked_mul(rhs)?,
        BinaryOp::Div => lhs.checked_div(rhs)?,
        BinaryOp::Rem => lhs.checked_rem(rhs)?,
        BinaryOp::And => lhs & rhs,
        BinaryOp::Or => lhs | rhs,
        BinaryOp::Xor => lhs ^ rhs,
        BinaryOp::AndNot => lhs & !rhs,
        op if op.is_comparison() => {
            return Some(ConstValue::Bool(compare(op, lhs.cmp(&rhs))));
        }
        _ => return None,
    };

    Some(ConstValue::Int(value))
}

fn float_binary(
    op: BinaryOp,
    lhs: &ConstValue,
    rhs: &ConstValue,
) -> Option<Result<ConstValue, ConstOpError>> {
    let (lhs, rhs) = (lhs.to_float()?, rhs.to_float()?);

    let value = match op {
        BinaryOp::Add => lhs + rhs,
        BinaryOp::Sub => lhs - rhs,
        BinaryOp::Mul => lhs * rhs,
        BinaryOp::Div if rhs == 0.0 => {
            return Some(Err(ConstOpError::DivisionByZero));
        }
        BinaryOp::Div => lhs / rhs,
        op if op.is_comparison() => {
            let ordering = lhs.partial_cmp(&rhs)?;
            return Some(Ok(ConstValue::Bool(compare(op, ordering))));
        }
        _ => return None,
    };

    Some(Ok(ConstValue::float(value)))
}

fn complex_binary(
    op: BinaryOp,
    lhs: &ConstValue,
    rhs: &ConstValue,
) -> Option<Result<ConstValue, ConstOpError>> {
    let ((a, b), (c, d)) = (lhs.to_complex()?, rhs.to_complex()?);

    let (re, im) = match op {
        BinaryOp::Add => (a + c, b + d),
        BinaryOp::Sub => (a - c, b - d),
        BinaryOp::Mul => (a * c - b * d, a * d + b * c),
        BinaryOp::Div => {
            let denominator = c * c + d * d;
            if denominator == 0.0 {
                return Some(Err(ConstOpError::DivisionByZero));
            }
            ((a * c + b * d) / denominator, (b * c - a * d) / denominator)
        }
        BinaryOp::Eq => return Some(Ok(ConstValue::Bool(a == c && b == d))),
        BinaryOp::Ne => return Some(Ok(ConstValue::Bool(a != c || b != d))),
        _ => return None,
    };

    Some(Ok(ConstValue::Complex(re, im)))
}
