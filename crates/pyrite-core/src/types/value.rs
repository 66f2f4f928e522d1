//! Constant values known at compile time
//!
//! `Constant` covers the immutable values the optimizer can reason about and
//! the container values it can still build from constants. Rendering follows
//! the target language (`repr` / `str`), which matters because folded results
//! and error messages must match what the program would produce at run time.

use super::version::PythonVersion;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// A constant value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Constant {
    None,
    Bool(bool),
    Int(i64),
    /// Python 2 `long`; only produced when compiling for Python 2
    Long(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Tuple(Vec<Constant>),
    List(Vec<Constant>),
    /// Insertion ordered; keys are unique under `py_eq`
    Dict(Vec<(Constant, Constant)>),
    Range {
        start: i64,
        stop: i64,
        step: i64,
    },
}

impl Constant {
    pub fn str(value: impl Into<String>) -> Self {
        Constant::Str(value.into())
    }

    /// Name of the runtime type of this value
    pub fn type_name(&self, version: PythonVersion) -> &'static str {
        match self {
            Constant::None => "NoneType",
            Constant::Bool(_) => "bool",
            Constant::Int(_) => "int",
            Constant::Long(_) if version.is_python3() => "int",
            Constant::Long(_) => "long",
            Constant::Float(_) => "float",
            Constant::Str(_) => "str",
            Constant::Bytes(_) if version.is_python3() => "bytes",
            Constant::Bytes(_) => "str",
            Constant::Tuple(_) => "tuple",
            Constant::List(_) => "list",
            Constant::Dict(_) => "dict",
            Constant::Range { .. } if version.is_python3() => "range",
            Constant::Range { .. } => "xrange",
        }
    }

    /// Integer value of `bool`, `int` and `long` constants
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Constant::Bool(value) => Some(i64::from(*value)),
            Constant::Int(value) | Constant::Long(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Constant::Float(value) => Some(*value),
            other => other.as_int().map(|value| value as f64),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Constant::None => false,
            Constant::Bool(value) => *value,
            Constant::Int(value) | Constant::Long(value) => *value != 0,
            Constant::Float(value) => *value != 0.0,
            other => other.len().map(|len| len > 0).unwrap_or(true),
        }
    }

    /// Length for sized values, `None` when `len()` would raise
    pub fn len(&self) -> Option<usize> {
        match self {
            Constant::Str(value) => Some(value.chars().count()),
            Constant::Bytes(value) => Some(value.len()),
            Constant::Tuple(items) | Constant::List(items) => Some(items.len()),
            Constant::Dict(items) => Some(items.len()),
            Constant::Range { start, stop, step } => Some(range_len(*start, *stop, *step)),
            _ => None,
        }
    }

    pub fn hashable(&self) -> bool {
        match self {
            Constant::List(_) | Constant::Dict(_) => false,
            Constant::Tuple(items) => items.iter().all(Constant::hashable),
            _ => true,
        }
    }

    /// The values iteration would produce, `None` for non-iterables.
    pub fn elements(&self, version: PythonVersion) -> Option<Vec<Constant>> {
        match self {
            Constant::Str(value) => Some(value.chars().map(|c| Constant::Str(c.to_string())).collect()),
            Constant::Bytes(value) if version.is_python3() => {
                Some(value.iter().map(|b| Constant::Int(i64::from(*b))).collect())
            }
            Constant::Bytes(value) => Some(
                value
                    .iter()
                    .map(|b| Constant::Bytes(vec![*b]))
                    .collect(),
            ),
            Constant::Tuple(items) | Constant::List(items) => Some(items.clone()),
            Constant::Dict(items) => Some(items.iter().map(|(key, _)| key.clone()).collect()),
            Constant::Range { start, stop, step } => {
                let len = range_len(*start, *stop, *step);
                (0..len)
                    .map(|index| {
                        let value = range_value(*start, *step, index);
                        i64::try_from(value).ok().map(Constant::Int)
                    })
                    .collect()
            }
            _ => None,
        }
    }

    /// Equality as the language defines it: numbers compare across types.
    pub fn py_eq(&self, other: &Constant) -> bool {
        if let (Some(left), Some(right)) = (self.as_int(), other.as_int()) {
            return left == right;
        }
        if matches!(self, Constant::Float(_)) || matches!(other, Constant::Float(_)) {
            if let (Some(left), Some(right)) = (self.as_float(), other.as_float()) {
                return left == right;
            }
        }

        match (self, other) {
            (Constant::None, Constant::None) => true,
            (Constant::Str(left), Constant::Str(right)) => left == right,
            (Constant::Bytes(left), Constant::Bytes(right)) => left == right,
            (Constant::Tuple(left), Constant::Tuple(right))
            | (Constant::List(left), Constant::List(right)) => {
                left.len() == right.len() && left.iter().zip(right).all(|(a, b)| a.py_eq(b))
            }
            (Constant::Dict(left), Constant::Dict(right)) => {
                left.len() == right.len()
                    && left.iter().all(|(key, value)| {
                        right
                            .iter()
                            .any(|(other_key, other_value)| key.py_eq(other_key) && value.py_eq(other_value))
                    })
            }
            (left @ Constant::Range { .. }, right @ Constant::Range { .. }) => {
                left.elements(PythonVersion::Python3) == right.elements(PythonVersion::Python3)
            }
            _ => false,
        }
    }

    /// `repr()` of the value
    pub fn py_repr(&self, version: PythonVersion) -> String {
        match self {
            Constant::None => "None".to_string(),
            Constant::Bool(true) => "True".to_string(),
            Constant::Bool(false) => "False".to_string(),
            Constant::Int(value) => value.to_string(),
            Constant::Long(value) if version.is_python3() => value.to_string(),
            Constant::Long(value) => format!("{}L", value),
            Constant::Float(value) => float_repr(*value),
            Constant::Str(value) => str_repr(value, version),
            Constant::Bytes(value) if version.is_python3() => format!("b{}", bytes_repr(value)),
            Constant::Bytes(value) => bytes_repr(value),
            Constant::Tuple(items) if items.len() == 1 => format!("({},)", items[0].py_repr(version)),
            Constant::Tuple(items) => format!("({})", join_repr(items, version)),
            Constant::List(items) => format!("[{}]", join_repr(items, version)),
            Constant::Dict(items) => {
                let rendered: Vec<String> = items
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key.py_repr(version), value.py_repr(version)))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
            Constant::Range { start, stop, step } if version.is_python3() => {
                if *step == 1 {
                    format!("range({}, {})", start, stop)
                } else {
                    format!("range({}, {}, {})", start, stop, step)
                }
            }
            Constant::Range { start, stop, step } => {
                let stop = range_value(*start, *step, range_len(*start, *stop, *step));
                match (*start, *step) {
                    (0, 1) => format!("xrange({})", stop),
                    (_, 1) => format!("xrange({}, {})", start, stop),
                    _ => format!("xrange({}, {}, {})", start, stop, step),
                }
            }
        }
    }

    /// `str()` of the value
    pub fn py_str(&self, version: PythonVersion) -> String {
        match self {
            Constant::Str(value) => value.clone(),
            Constant::Bytes(value) if !version.is_python3() => String::from_utf8_lossy(value).into_owned(),
            other => other.py_repr(version),
        }
    }
}

fn join_repr(items: &[Constant], version: PythonVersion) -> String {
    items
        .iter()
        .map(|item| item.py_repr(version))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn range_len(start: i64, stop: i64, step: i64) -> usize {
    let (start, stop, step) = (i128::from(start), i128::from(stop), i128::from(step));
    let len = if step > 0 && start < stop {
        (stop - start - 1) / step + 1
    } else if step < 0 && start > stop {
        (start - stop - 1) / (-step) + 1
    } else {
        0
    };
    usize::try_from(len).unwrap_or(usize::MAX)
}

/// `start + step * index` without intermediate overflow
fn range_value(start: i64, step: i64, index: usize) -> i128 {
    i128::from(start) + i128::from(step) * index as i128
}

/// Shortest round-tripping float rendering, switching to exponent notation
/// below 1e-4 and from 1e16 on.
pub fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let scientific = format!("{:e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if !(-4..16).contains(&exponent) {
        let mut out = String::from(sign);
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let _ = write!(
            out,
            "e{}{:02}",
            if exponent < 0 { '-' } else { '+' },
            exponent.abs()
        );
        out
    } else if exponent < 0 {
        format!(
            "{}0.{}{}",
            sign,
            "0".repeat((-exponent - 1) as usize),
            digits
        )
    } else {
        let point = exponent as usize + 1;
        if digits.len() > point {
            format!("{}{}.{}", sign, &digits[..point], &digits[point..])
        } else {
            format!("{}{}{}.0", sign, digits, "0".repeat(point - digits.len()))
        }
    }
}

fn quote_for(contains_single: bool, contains_double: bool) -> char {
    if contains_single && !contains_double {
        '"'
    } else {
        '\''
    }
}

fn str_repr(value: &str, version: PythonVersion) -> String {
    let quote = quote_for(value.contains('\''), value.contains('"'));
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c if (c as u32) < 0x7f => out.push(c),
            c if !version.is_python3() => {
                let mut buffer = [0u8; 4];
                for byte in c.encode_utf8(&mut buffer).bytes() {
                    let _ = write!(out, "\\x{:02x}", byte);
                }
            }
            c if (c as u32) < 0xa0 => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn bytes_repr(value: &[u8]) -> String {
    let quote = quote_for(value.contains(&b'\''), value.contains(&b'"'));
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for &byte in value {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b as char == quote => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\x{:02x}", byte);
            }
        }
    }
    out.push(quote);
    out
}
