//! Pure simulations of builtins over constant arguments
//!
//! A simulation either produces the value the builtin returns, raises the
//! exception the builtin raises (same type, same message), or declines when
//! the result is outside what a `Constant` can represent faithfully.

use super::builtin_spec::BoundArguments;
use pyrite_core::ast::RaisedException;
use pyrite_core::types::value::float_repr;
use pyrite_core::{Constant, ExceptionKind, PythonVersion};

/// Why a simulation did not produce a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// The call raises this at run time
    Raise(RaisedException),
    /// Not simulated; leave the call alone
    Decline,
}

pub type Simulation = Result<Constant, Fault>;

pub type Simulator = fn(&BoundArguments<Constant>, PythonVersion) -> Simulation;

/// Longest sequence a range may expand to when folded
pub const MAX_RANGE_ELEMENTS: usize = 256;

fn raise(kind: ExceptionKind, message: impl Into<String>) -> Fault {
    Fault::Raise(RaisedException::new(kind, message))
}

fn type_error(message: impl Into<String>) -> Fault {
    raise(ExceptionKind::TypeError, message)
}

fn value_error(message: impl Into<String>) -> Fault {
    raise(ExceptionKind::ValueError, message)
}

/// `TypeError` for a value that is not usable as an integer
fn index_error(value: &Constant, version: PythonVersion) -> Fault {
    if version.is_python3() {
        type_error(format!(
            "'{}' object cannot be interpreted as an integer",
            value.type_name(version)
        ))
    } else if matches!(value, Constant::Float(_)) {
        type_error("integer argument expected, got float")
    } else {
        type_error("an integer is required")
    }
}

/// Integer value as `__index__` would produce it
fn index_value(value: &Constant, version: PythonVersion) -> Result<i64, Fault> {
    value.as_int().ok_or_else(|| index_error(value, version))
}

pub fn chr(args: &BoundArguments<Constant>, version: PythonVersion) -> Simulation {
    let value = index_value(args.get(0).ok_or(Fault::Decline)?, version)?;

    if version.is_python3() {
        if !(0..0x110000).contains(&value) {
            return Err(value_error("chr() arg not in range(0x110000)"));
        }
        let code = u32::try_from(value).map_err(|_| Fault::Decline)?;
        // Surrogates have no `char`
        let c = char::from_u32(code).ok_or(Fault::Decline)?;
        Ok(Constant::Str(c.to_string()))
    } else {
        if !(0..256).contains(&value) {
            return Err(value_error("chr() arg not in range(256)"));
        }
        let byte = value as u8;
        if byte.is_ascii() {
            Ok(Constant::Str((byte as char).to_string()))
        } else {
            Ok(Constant::Bytes(vec![byte]))
        }
    }
}

pub fn ord(args: &BoundArguments<Constant>, version: PythonVersion) -> Simulation {
    let value = args.get(0).ok_or(Fault::Decline)?;

    let length = match value {
        Constant::Str(text) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => return Ok(Constant::Int(i64::from(u32::from(c)))),
                _ => text.chars().count(),
            }
        }
        Constant::Bytes(bytes) if bytes.len() == 1 => return Ok(Constant::Int(i64::from(bytes[0]))),
        Constant::Bytes(bytes) => bytes.len(),
        other => {
            return Err(type_error(format!(
                "ord() expected string of length 1, but {} found",
                other.type_name(version)
            )))
        }
    };

    Err(type_error(format!(
        "ord() expected a character, but string of length {} found",
        length
    )))
}

pub fn len(args: &BoundArguments<Constant>, version: PythonVersion) -> Simulation {
    let value = args.get(0).ok_or(Fault::Decline)?;
    match value.len() {
        Some(length) => i64::try_from(length)
            .map(Constant::Int)
            .map_err(|_| Fault::Decline),
        None => Err(type_error(format!(
            "object of type '{}' has no len()",
            value.type_name(version)
        ))),
    }
}

fn format_radix(
    args: &BoundArguments<Constant>,
    version: PythonVersion,
    name: &str,
    render: fn(u64, bool) -> String,
) -> Simulation {
    let value = args.get(0).ok_or(Fault::Decline)?;
    let number = match value.as_int() {
        Some(number) => number,
        None if version.is_python3() || name == "bin" => return Err(index_error(value, version)),
        None => {
            return Err(type_error(format!(
                "{}() argument can't be converted to {}",
                name, name
            )))
        }
    };

    let is_long = matches!(value, Constant::Long(_)) && !version.is_python3();
    let mut text = String::new();
    if number < 0 {
        text.push('-');
    }
    text.push_str(&render(number.unsigned_abs(), version.is_python3()));
    if is_long && name != "bin" {
        text.push('L');
    }
    Ok(Constant::Str(text))
}

pub fn bin(args: &BoundArguments<Constant>, version: PythonVersion) -> Simulation {
    format_radix(args, version, "bin", |value, _| format!("0b{:b}", value))
}

pub fn oct(args: &BoundArguments<Constant>, version: PythonVersion) -> Simulation {
    format_radix(args, version, "oct", |value, python3| {
        if python3 {
            format!("0o{:o}", value)
        } else if value == 0 {
            "0".to_string()
        } else {
            format!("0{:o}", value)
        }
    })
}

pub fn hex(args: &BoundArguments<Constant>, version: PythonVersion) -> Simulation {
    format_radix(args, version, "hex", |value, _| format!("0x{:x}", value))
}

fn not_iterable(value: &Constant, version: PythonVersion) -> Fault {
    type_error(format!("'{}' object is not iterable", value.type_name(version)))
}

fn iterate(value: &Constant, version: PythonVersion) -> Result<Vec<Constant>, Fault> {
    if let Constant::Range { .. } = value {
        if value.len().unwrap_or(usize::MAX) > MAX_RANGE_ELEMENTS {
            return Err(Fault::Decline);
        }
    }
    value.elements(version).ok_or_else(|| not_iterable(value, version))
}

pub fn tuple(args: &BoundArguments<Constant>, version: PythonVersion) -> Simulation {
    match args.get(0) {
        None => Ok(Constant::Tuple(Vec::new())),
        Some(value) => iterate(value, version).map(Constant::Tuple),
    }
}

pub fn list(args: &BoundArguments<Constant>, version: PythonVersion) -> Simulation {
    match args.get(0) {
        None => Ok(Constant::List(Vec::new())),
        Some(value) => iterate(value, version).map(Constant::List),
    }
}

fn unhashable(value: &Constant, version: PythonVersion) -> Fault {
    type_error(format!("unhashable type: '{}'", value.type_name(version)))
}

fn dict_insert(
    entries: &mut Vec<(Constant, Constant)>,
    key: Constant,
    value: Constant,
    version: PythonVersion,
) -> Result<(), Fault> {
    if !key.hashable() {
        return Err(unhashable(&key, version));
    }
    match entries.iter_mut().find(|(existing, _)| existing.py_eq(&key)) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
    Ok(())
}

pub fn dict(args: &BoundArguments<Constant>, version: PythonVersion) -> Simulation {
    let mut entries = Vec::new();

    match args.get(0) {
        None => {}
        Some(Constant::Dict(items)) => entries = items.clone(),
        Some(source) => {
            let elements = iterate(source, version)?;
            for (index, element) in elements.into_iter().enumerate() {
                let pair = element.elements(version).ok_or_else(|| {
                    type_error(format!(
                        "cannot convert dictionary update sequence element #{} to a sequence",
                        index
                    ))
                })?;
                if pair.len() != 2 {
                    return Err(value_error(format!(
                        "dictionary update sequence element #{} has length {}; 2 is required",
                        index,
                        pair.len()
                    )));
                }
                let mut pair = pair.into_iter();
                if let (Some(key), Some(value)) = (pair.next(), pair.next()) {
                    dict_insert(&mut entries, key, value, version)?;
                }
            }
        }
    }

    for (name, value) in &args.star_dict {
        dict_insert(&mut entries, Constant::str(name.clone()), value.clone(), version)?;
    }

    Ok(Constant::Dict(entries))
}

pub fn float(args: &BoundArguments<Constant>, version: PythonVersion) -> Simulation {
    let value = match args.get(0) {
        None => return Ok(Constant::Float(0.0)),
        Some(value) => value,
    };

    let text = match value {
        Constant::Str(text) => text.clone(),
        Constant::Bytes(bytes) => String::from_utf8(bytes.clone()).map_err(|_| Fault::Decline)?,
        other => {
            return match other.as_float() {
                Some(number) => Ok(Constant::Float(number)),
                None if version.is_python3() => Err(type_error(format!(
                    "float() argument must be a string or a number, not '{}'",
                    other.type_name(version)
                ))),
                None => Err(type_error("float() argument must be a string or a number")),
            }
        }
    };

    let trimmed = text.trim();
    if trimmed.contains('_') || !trimmed.is_ascii() {
        return Err(Fault::Decline);
    }
    match trimmed.parse::<f64>() {
        Ok(number) => Ok(Constant::Float(number)),
        Err(_) if version.is_python3() => Err(value_error(format!(
            "could not convert string to float: {}",
            value.py_repr(version)
        ))),
        Err(_) => Err(value_error(format!("could not convert string to float: {}", text))),
    }
}

pub fn str(args: &BoundArguments<Constant>, version: PythonVersion) -> Simulation {
    let Some(value) = args.get(0) else {
        return Ok(Constant::str(""));
    };
    // Python 2 renders floats with 12 significant digits; only floats whose
    // repr is that short render the same.
    if let Constant::Float(number) = value {
        if !version.is_python3() && significant_digits(&float_repr(*number)) > 12 {
            return Err(Fault::Decline);
        }
    }
    Ok(Constant::Str(value.py_str(version)))
}

fn significant_digits(repr: &str) -> usize {
    let mantissa = repr.split('e').next().unwrap_or(repr);
    mantissa
        .chars()
        .filter(char::is_ascii_digit)
        .skip_while(|c| *c == '0')
        .count()
}

pub fn bool(args: &BoundArguments<Constant>, _version: PythonVersion) -> Simulation {
    Ok(Constant::Bool(args.get(0).map(Constant::is_truthy).unwrap_or(false)))
}

pub fn int(args: &BoundArguments<Constant>, version: PythonVersion) -> Simulation {
    convert_integer(args, version, "int").map(Constant::Int)
}

pub fn long(args: &BoundArguments<Constant>, version: PythonVersion) -> Simulation {
    convert_integer(args, version, "long").map(Constant::Long)
}

fn convert_integer(args: &BoundArguments<Constant>, version: PythonVersion, name: &str) -> Result<i64, Fault> {
    let value = args.get(0);
    let base = args.get(1);

    let Some(value) = value else {
        return match base {
            None => Ok(0),
            Some(_) => Err(Fault::Decline),
        };
    };

    let text = match value {
        Constant::Str(text) => text.clone(),
        Constant::Bytes(bytes) => String::from_utf8(bytes.clone()).map_err(|_| Fault::Decline)?,
        _ if base.is_some() => {
            return Err(type_error(format!(
                "{}() can't convert non-string with explicit base",
                name
            )));
        }
        Constant::Float(number) => {
            if number.is_nan() {
                return Err(value_error("cannot convert float NaN to integer"));
            }
            if number.is_infinite() {
                return Err(raise(
                    ExceptionKind::OverflowError,
                    "cannot convert float infinity to integer",
                ));
            }
            let truncated = number.trunc();
            if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
                return Err(Fault::Decline);
            }
            return Ok(truncated as i64);
        }
        other => {
            return match other.as_int() {
                Some(number) => Ok(number),
                None if version.is_python3() => Err(type_error(format!(
                    "{}() argument must be a string, a bytes-like object or a number, not '{}'",
                    name,
                    other.type_name(version)
                ))),
                None => Err(type_error(format!(
                    "{}() argument must be a string or a number, not '{}'",
                    name,
                    other.type_name(version)
                ))),
            }
        }
    };

    let base = match base {
        None => 10,
        Some(base) => base.as_int().ok_or(Fault::Decline)?,
    };
    if base != 0 && !(2..=36).contains(&base) {
        return Err(value_error(if version.is_python3() {
            format!("{}() base must be >= 2 and <= 36, or 0", name)
        } else {
            format!("{}() base must be >= 2 and <= 36", name)
        }));
    }

    let invalid = || {
        value_error(format!(
            "invalid literal for {}() with base {}: {}",
            name,
            base,
            value.py_repr(version)
        ))
    };

    parse_integer(&text, base as u32, version).ok_or_else(invalid)?
}

/// Parse an integer literal the way `int(text, base)` does.
///
/// `None` means the literal is invalid; `Some(Err(Decline))` means it is
/// valid but does not fit.
fn parse_integer(text: &str, base: u32, version: PythonVersion) -> Option<Result<i64, Fault>> {
    let digits = text.trim();
    // Underscores and non-ASCII digits are accepted at run time
    if digits.contains('_') || !digits.is_ascii() {
        return Some(Err(Fault::Decline));
    }

    let (negative, unsigned) = match digits.as_bytes().first() {
        Some(b'-') => (true, &digits[1..]),
        Some(b'+') => (false, &digits[1..]),
        _ => (false, digits),
    };

    let lower = unsigned.to_ascii_lowercase();
    let prefixed = |prefix: &str| lower.strip_prefix(prefix).map(str::to_string);
    let (radix, body) = match base {
        0 => {
            if let Some(rest) = prefixed("0x") {
                (16, rest)
            } else if let Some(rest) = prefixed("0o") {
                (8, rest)
            } else if let Some(rest) = prefixed("0b") {
                (2, rest)
            } else if !version.is_python3() && lower.len() > 1 && lower.starts_with('0') {
                (8, lower[1..].to_string())
            } else if version.is_python3() && lower.len() > 1 && lower.starts_with('0') {
                // Leading zeros are only valid for zero itself
                if lower.chars().all(|c| c == '0') {
                    (10, lower.clone())
                } else {
                    return None;
                }
            } else {
                (10, lower.clone())
            }
        }
        16 => (16, prefixed("0x").unwrap_or_else(|| lower.clone())),
        8 => (8, prefixed("0o").unwrap_or_else(|| lower.clone())),
        2 => (2, prefixed("0b").unwrap_or_else(|| lower.clone())),
        other => (other, lower.clone()),
    };

    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = match u64::from_str_radix(&body, radix) {
        Ok(magnitude) => magnitude,
        Err(_) => return Some(Err(Fault::Decline)),
    };
    let value = if negative {
        0i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    };
    Some(value.ok_or(Fault::Decline))
}

/// Fold `range(...)`; Python 2 builds a list and only short ones are folded.
pub fn range(args: &BoundArguments<Constant>, version: PythonVersion) -> Simulation {
    let mut numbers = Vec::with_capacity(3);
    for value in args.values.iter().flatten() {
        let number = match value.as_int() {
            Some(number) => number,
            None if version.is_python3() => return Err(index_error(value, version)),
            None => {
                return Err(type_error(format!(
                    "range() integer end argument expected, got {}.",
                    value.type_name(version)
                )))
            }
        };
        numbers.push(number);
    }

    let (start, stop, step) = match numbers.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => return Err(Fault::Decline),
    };
    if step == 0 {
        return Err(value_error(if version.is_python3() {
            "range() arg 3 must not be zero"
        } else {
            "range() step argument must not be zero"
        }));
    }

    let range = Constant::Range { start, stop, step };
    if version.is_python3() {
        return Ok(range);
    }
    if range.len().unwrap_or(usize::MAX) > MAX_RANGE_ELEMENTS {
        return Err(Fault::Decline);
    }
    range.elements(version).map(Constant::List).ok_or(Fault::Decline)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PY3: PythonVersion = PythonVersion::Python3;
    const PY2: PythonVersion = PythonVersion::Python2;

    fn one(value: Constant) -> BoundArguments<Constant> {
        BoundArguments::from_values(vec![Some(value)])
    }

    fn two(value: Constant, base: Constant) -> BoundArguments<Constant> {
        BoundArguments::from_values(vec![Some(value), Some(base)])
    }

    fn raised(kind: ExceptionKind, message: &str) -> Simulation {
        Err(Fault::Raise(RaisedException::new(kind, message)))
    }

    #[test]
    fn test_chr() {
        assert_eq!(chr(&one(Constant::Int(65)), PY3), Ok(Constant::str("A")));
        assert_eq!(chr(&one(Constant::Int(233)), PY3), Ok(Constant::str("é")));
        assert_eq!(chr(&one(Constant::Int(233)), PY2), Ok(Constant::Bytes(vec![233])));
        assert_eq!(
            chr(&one(Constant::Int(-1)), PY3),
            raised(ExceptionKind::ValueError, "chr() arg not in range(0x110000)")
        );
        assert_eq!(
            chr(&one(Constant::Int(256)), PY2),
            raised(ExceptionKind::ValueError, "chr() arg not in range(256)")
        );
        assert_eq!(
            chr(&one(Constant::str("a")), PY3),
            raised(ExceptionKind::TypeError, "'str' object cannot be interpreted as an integer")
        );
        assert_eq!(chr(&one(Constant::Int(0xD800)), PY3), Err(Fault::Decline));
    }

    #[test]
    fn test_ord() {
        assert_eq!(ord(&one(Constant::str("a")), PY3), Ok(Constant::Int(97)));
        assert_eq!(
            ord(&one(Constant::str("ab")), PY3),
            raised(
                ExceptionKind::TypeError,
                "ord() expected a character, but string of length 2 found"
            )
        );
    }

    #[test]
    fn test_len() {
        let tuple = Constant::Tuple(vec![Constant::Int(1), Constant::Int(2), Constant::Int(3)]);
        assert_eq!(len(&one(tuple), PY3), Ok(Constant::Int(3)));
        assert_eq!(
            len(&one(Constant::Int(5)), PY3),
            raised(ExceptionKind::TypeError, "object of type 'int' has no len()")
        );
    }

    #[test]
    fn test_radix_formatting() {
        assert_eq!(bin(&one(Constant::Int(5)), PY3), Ok(Constant::str("0b101")));
        assert_eq!(bin(&one(Constant::Int(-5)), PY3), Ok(Constant::str("-0b101")));
        assert_eq!(oct(&one(Constant::Int(8)), PY3), Ok(Constant::str("0o10")));
        assert_eq!(oct(&one(Constant::Int(8)), PY2), Ok(Constant::str("010")));
        assert_eq!(oct(&one(Constant::Int(0)), PY2), Ok(Constant::str("0")));
        assert_eq!(hex(&one(Constant::Int(255)), PY3), Ok(Constant::str("0xff")));
        assert_eq!(hex(&one(Constant::Long(255)), PY2), Ok(Constant::str("0xffL")));
        assert_eq!(
            hex(&one(Constant::Float(1.0)), PY3),
            raised(ExceptionKind::TypeError, "'float' object cannot be interpreted as an integer")
        );
    }

    #[test]
    fn test_tuple_and_list() {
        assert_eq!(
            tuple(&one(Constant::str("ab")), PY3),
            Ok(Constant::Tuple(vec![Constant::str("a"), Constant::str("b")]))
        );
        assert_eq!(
            list(&BoundArguments::from_values(vec![None]), PY3),
            Ok(Constant::List(vec![]))
        );
        assert_eq!(
            list(&one(Constant::Int(3)), PY3),
            raised(ExceptionKind::TypeError, "'int' object is not iterable")
        );
        let big = Constant::Range {
            start: 0,
            stop: 1000,
            step: 1,
        };
        assert_eq!(tuple(&one(big), PY3), Err(Fault::Decline));
    }

    #[test]
    fn test_dict() {
        let pairs = Constant::List(vec![
            Constant::Tuple(vec![Constant::Int(1), Constant::str("a")]),
            Constant::Tuple(vec![Constant::Float(1.0), Constant::str("b")]),
        ]);
        assert_eq!(
            dict(&one(pairs), PY3),
            Ok(Constant::Dict(vec![(Constant::Int(1), Constant::str("b"))]))
        );

        let mut keywords = BoundArguments::from_values(vec![None]);
        keywords.star_dict.push(("x".to_string(), Constant::Int(1)));
        assert_eq!(
            dict(&keywords, PY3),
            Ok(Constant::Dict(vec![(Constant::str("x"), Constant::Int(1))]))
        );

        let bad = Constant::List(vec![Constant::Int(1)]);
        assert_eq!(
            dict(&one(bad), PY3),
            raised(
                ExceptionKind::TypeError,
                "cannot convert dictionary update sequence element #0 to a sequence"
            )
        );

        let unhashable = Constant::List(vec![Constant::Tuple(vec![
            Constant::List(vec![]),
            Constant::None,
        ])]);
        assert_eq!(
            dict(&one(unhashable), PY3),
            raised(ExceptionKind::TypeError, "unhashable type: 'list'")
        );
    }

    #[test]
    fn test_float() {
        assert_eq!(float(&one(Constant::str(" 1.5 ")), PY3), Ok(Constant::Float(1.5)));
        assert_eq!(float(&one(Constant::Int(2)), PY3), Ok(Constant::Float(2.0)));
        assert_eq!(
            float(&one(Constant::str("abc")), PY3),
            raised(ExceptionKind::ValueError, "could not convert string to float: 'abc'")
        );
        assert_eq!(
            float(&one(Constant::str("abc")), PY2),
            raised(ExceptionKind::ValueError, "could not convert string to float: abc")
        );
        assert_eq!(float(&one(Constant::str("\u{661}.\u{665}")), PY3), Err(Fault::Decline));
    }

    #[test]
    fn test_str_and_bool() {
        assert_eq!(str(&one(Constant::Int(5)), PY3), Ok(Constant::str("5")));
        assert_eq!(str(&BoundArguments::from_values(vec![None]), PY3), Ok(Constant::str("")));
        assert_eq!(str(&one(Constant::Float(0.1)), PY3), Ok(Constant::str("0.1")));
        assert_eq!(bool(&one(Constant::str("")), PY3), Ok(Constant::Bool(false)));
        assert_eq!(bool(&one(Constant::Tuple(vec![Constant::None])), PY3), Ok(Constant::Bool(true)));
    }

    #[test]
    fn test_int() {
        assert_eq!(int(&two(Constant::str("10"), Constant::Int(2)), PY3), Ok(Constant::Int(2)));
        assert_eq!(int(&one(Constant::str(" -42 ")), PY3), Ok(Constant::Int(-42)));
        assert_eq!(int(&two(Constant::str("0x1f"), Constant::Int(0)), PY3), Ok(Constant::Int(31)));
        assert_eq!(int(&two(Constant::str("ff"), Constant::Int(16)), PY3), Ok(Constant::Int(255)));
        assert_eq!(int(&one(Constant::Float(3.9)), PY3), Ok(Constant::Int(3)));
        assert_eq!(int(&one(Constant::Bool(true)), PY3), Ok(Constant::Int(1)));
        assert_eq!(
            int(&one(Constant::str("x")), PY3),
            raised(ExceptionKind::ValueError, "invalid literal for int() with base 10: 'x'")
        );
        assert_eq!(
            int(&two(Constant::Int(5), Constant::Int(2)), PY3),
            raised(ExceptionKind::TypeError, "int() can't convert non-string with explicit base")
        );
        assert_eq!(
            int(&two(Constant::str("1"), Constant::Int(1)), PY3),
            raised(ExceptionKind::ValueError, "int() base must be >= 2 and <= 36, or 0")
        );
        assert_eq!(
            int(&one(Constant::Float(f64::NAN)), PY3),
            raised(ExceptionKind::ValueError, "cannot convert float NaN to integer")
        );
        assert_eq!(int(&one(Constant::str("99999999999999999999")), PY3), Err(Fault::Decline));
        assert_eq!(int(&one(Constant::str("\u{661}\u{662}")), PY3), Err(Fault::Decline));
        assert_eq!(long(&one(Constant::str("7")), PY2), Ok(Constant::Long(7)));
    }

    #[test]
    fn test_range() {
        let args = BoundArguments::from_values(vec![Some(Constant::Int(3)), None, None]);
        assert_eq!(
            range(&args, PY3),
            Ok(Constant::Range {
                start: 0,
                stop: 3,
                step: 1
            })
        );
        assert_eq!(
            range(&args, PY2),
            Ok(Constant::List(vec![Constant::Int(0), Constant::Int(1), Constant::Int(2)]))
        );

        let zero_step = BoundArguments::from_values(vec![
            Some(Constant::Int(0)),
            Some(Constant::Int(3)),
            Some(Constant::Int(0)),
        ]);
        assert_eq!(
            range(&zero_step, PY3),
            raised(ExceptionKind::ValueError, "range() arg 3 must not be zero")
        );

        let long = BoundArguments::from_values(vec![Some(Constant::Int(10_000)), None, None]);
        assert_eq!(range(&long, PY2), Err(Fault::Decline));
    }
}
