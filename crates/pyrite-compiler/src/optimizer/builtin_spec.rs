//! Builtin call specifications
//!
//! A specification describes how a builtin accepts its arguments. It binds
//! call-site arguments to parameter slots, producing the same `TypeError`
//! messages the interpreter would, and names the pure function that
//! computes the builtin for constant arguments.

use super::simulate::{self, Simulator};
use std::fmt;

/// How arity errors are phrased by the builtin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArityStyle {
    /// `len() takes exactly one argument (2 given)`
    Takes,
    /// `dict expected at most 1 arguments, got 2`
    Expected,
}

/// Declarative signature of one builtin
pub struct BuiltinParameterSpec {
    pub name: &'static str,
    pub params: &'static [&'static str],
    /// Trailing parameters that may be omitted
    pub default_count: usize,
    pub accepts_keywords: bool,
    /// Parameters can only be given positionally
    pub pos_only: bool,
    /// Excess positional arguments are collected
    pub star_list: bool,
    /// Unknown keyword arguments are collected
    pub star_dict: bool,
    pub style: ArityStyle,
    pub simulate: Option<Simulator>,
}

impl fmt::Debug for BuiltinParameterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinParameterSpec")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("default_count", &self.default_count)
            .field("simulated", &self.simulate.is_some())
            .finish()
    }
}

/// Arguments after binding, one entry per parameter
#[derive(Debug, Clone, PartialEq)]
pub struct BoundArguments<T> {
    pub values: Vec<Option<T>>,
    pub star_list: Vec<T>,
    pub star_dict: Vec<(String, T)>,
}

impl<T> BoundArguments<T> {
    pub fn from_values(values: Vec<Option<T>>) -> Self {
        Self {
            values,
            star_list: Vec::new(),
            star_dict: Vec::new(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index).and_then(Option::as_ref)
    }

    pub fn take(&mut self, index: usize) -> Option<T> {
        self.values.get_mut(index).and_then(Option::take)
    }

    /// Number of parameters that received a value
    pub fn given(&self) -> usize {
        self.values.iter().filter(|value| value.is_some()).count()
    }
}

const fn spec(
    name: &'static str,
    params: &'static [&'static str],
    default_count: usize,
    accepts_keywords: bool,
    style: ArityStyle,
    simulate: Option<Simulator>,
) -> BuiltinParameterSpec {
    BuiltinParameterSpec {
        name,
        params,
        default_count,
        accepts_keywords,
        pos_only: false,
        star_list: false,
        star_dict: false,
        style,
        simulate,
    }
}

use ArityStyle::{Expected, Takes};

pub static GLOBALS: BuiltinParameterSpec = spec("globals", &[], 0, false, Takes, None);
pub static LOCALS: BuiltinParameterSpec = spec("locals", &[], 0, false, Takes, None);
pub static DIR: BuiltinParameterSpec = spec("dir", &["object"], 1, false, Expected, None);
pub static VARS: BuiltinParameterSpec = spec("vars", &["object"], 1, false, Expected, None);
pub static EVAL: BuiltinParameterSpec =
    spec("eval", &["source", "globals", "locals"], 2, false, Expected, None);
pub static EXEC: BuiltinParameterSpec =
    spec("exec", &["source", "globals", "locals"], 2, false, Expected, None);
pub static EXECFILE: BuiltinParameterSpec =
    spec("execfile", &["filename", "globals", "locals"], 2, false, Takes, None);
pub static OPEN: BuiltinParameterSpec =
    spec("open", &["name", "mode", "buffering"], 2, true, Takes, None);
pub static IMPORT: BuiltinParameterSpec = spec(
    "__import__",
    &["name", "globals", "locals", "fromlist", "level"],
    4,
    true,
    Takes,
    None,
);
pub static CHR: BuiltinParameterSpec = spec("chr", &["i"], 0, false, Takes, Some(simulate::chr));
pub static ORD: BuiltinParameterSpec = spec("ord", &["c"], 0, false, Takes, Some(simulate::ord));
pub static BIN: BuiltinParameterSpec =
    spec("bin", &["number"], 0, false, Takes, Some(simulate::bin));
pub static OCT: BuiltinParameterSpec =
    spec("oct", &["number"], 0, false, Takes, Some(simulate::oct));
pub static HEX: BuiltinParameterSpec =
    spec("hex", &["number"], 0, false, Takes, Some(simulate::hex));
pub static ITER: BuiltinParameterSpec =
    spec("iter", &["callable", "sentinel"], 1, false, Expected, None);
pub static NEXT: BuiltinParameterSpec =
    spec("next", &["iterator", "default"], 1, false, Expected, None);
pub static RANGE: BuiltinParameterSpec = spec(
    "range",
    &["start", "stop", "step"],
    2,
    false,
    Expected,
    Some(simulate::range),
);
pub static TUPLE: BuiltinParameterSpec =
    spec("tuple", &["sequence"], 1, true, Takes, Some(simulate::tuple));
pub static LIST: BuiltinParameterSpec =
    spec("list", &["sequence"], 1, true, Takes, Some(simulate::list));
pub static FLOAT: BuiltinParameterSpec =
    spec("float", &["x"], 1, true, Takes, Some(simulate::float));
pub static STR: BuiltinParameterSpec =
    spec("str", &["object"], 1, true, Takes, Some(simulate::str));
pub static BOOL: BuiltinParameterSpec =
    spec("bool", &["x"], 1, true, Takes, Some(simulate::bool));
pub static INT: BuiltinParameterSpec =
    spec("int", &["x", "base"], 2, true, Takes, Some(simulate::int));
pub static LONG: BuiltinParameterSpec =
    spec("long", &["x", "base"], 2, true, Takes, Some(simulate::long));
pub static REPR: BuiltinParameterSpec = spec("repr", &["object"], 0, false, Takes, None);
pub static LEN: BuiltinParameterSpec = spec("len", &["object"], 0, false, Takes, Some(simulate::len));

/// `dict` takes one positional-only argument and any keywords as entries.
pub static DICT: BuiltinParameterSpec = BuiltinParameterSpec {
    name: "dict",
    params: &["iterable"],
    default_count: 1,
    accepts_keywords: true,
    pos_only: true,
    star_list: false,
    star_dict: true,
    style: Expected,
    simulate: Some(simulate::dict),
};

/// Builtin exception constructors take any positional arguments.
pub fn exception_spec(name: &'static str) -> BuiltinParameterSpec {
    BuiltinParameterSpec {
        name,
        params: &[],
        default_count: 0,
        accepts_keywords: false,
        pos_only: true,
        star_list: true,
        star_dict: false,
        style: Takes,
        simulate: None,
    }
}

/// Specification of a builtin operation by its folding key
pub fn for_key(key: &str) -> Option<&'static BuiltinParameterSpec> {
    let spec = match key {
        "chr" => &CHR,
        "ord" => &ORD,
        "bin" => &BIN,
        "oct" => &OCT,
        "hex" => &HEX,
        "len" => &LEN,
        "range" => &RANGE,
        "tuple" => &TUPLE,
        "list" => &LIST,
        "dict" => &DICT,
        "float" => &FLOAT,
        "str" => &STR,
        "bool" => &BOOL,
        "int" => &INT,
        "long" => &LONG,
        "import" => &IMPORT,
        "vars" => &VARS,
        "iter1" | "iter2" => &ITER,
        "next1" | "next2" => &NEXT,
        _ => return None,
    };
    Some(spec)
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "argument"
    } else {
        "arguments"
    }
}

impl BuiltinParameterSpec {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn min_args(&self) -> usize {
        self.params.len() - self.default_count
    }

    fn arity_error(&self, given: usize) -> String {
        let min = self.min_args();
        let max = self.params.len();

        match self.style {
            ArityStyle::Takes if min == max && max == 1 => {
                format!("{}() takes exactly one argument ({} given)", self.name, given)
            }
            ArityStyle::Takes if min == max => format!(
                "{}() takes exactly {} {} ({} given)",
                self.name,
                max,
                plural(max),
                given
            ),
            ArityStyle::Takes if given > max => format!(
                "{}() takes at most {} {} ({} given)",
                self.name,
                max,
                plural(max),
                given
            ),
            ArityStyle::Takes => format!(
                "{}() takes at least {} {} ({} given)",
                self.name,
                min,
                plural(min),
                given
            ),
            ArityStyle::Expected if min == max => {
                format!("{} expected {} arguments, got {}", self.name, max, given)
            }
            ArityStyle::Expected if given > max => {
                format!("{} expected at most {} arguments, got {}", self.name, max, given)
            }
            ArityStyle::Expected => {
                format!("{} expected at least {} arguments, got {}", self.name, min, given)
            }
        }
    }

    /// Bind positional then keyword arguments to parameters.
    ///
    /// On failure the error is the `TypeError` message the call raises.
    /// Whether keywords naming parameters appear in parameter order, so
    /// that moving them into their slots keeps the evaluation order.
    pub fn keywords_in_order<T>(&self, keywords: &[(String, T)]) -> bool {
        if self.pos_only {
            return true;
        }
        let positions = keywords.iter().filter_map(|(name, _)| {
            self.params.iter().position(|param| *param == name.as_str())
        });
        let mut last = None;
        for position in positions {
            if last.is_some_and(|last| position < last) {
                return false;
            }
            last = Some(position);
        }
        true
    }

    pub fn bind<T>(
        &self,
        positional: Vec<T>,
        keywords: Vec<(String, T)>,
    ) -> Result<BoundArguments<T>, String> {
        if !keywords.is_empty() && !self.accepts_keywords {
            return Err(if self.star_list {
                format!("{} does not take keyword arguments", self.name)
            } else {
                format!("{}() takes no keyword arguments", self.name)
            });
        }

        let max = self.params.len();
        let given = match self.style {
            ArityStyle::Expected => positional.len(),
            ArityStyle::Takes => positional.len() + keywords.len(),
        };
        if positional.len() > max && !self.star_list {
            return Err(self.arity_error(given));
        }

        let mut bound = BoundArguments {
            values: (0..max).map(|_| None).collect(),
            star_list: Vec::new(),
            star_dict: Vec::new(),
        };
        for (index, value) in positional.into_iter().enumerate() {
            if index < max {
                bound.values[index] = Some(value);
            } else {
                bound.star_list.push(value);
            }
        }

        for (name, value) in keywords {
            let position = if self.pos_only {
                None
            } else {
                self.params.iter().position(|param| *param == name)
            };

            match position {
                Some(index) if bound.values[index].is_some() => {
                    return Err(format!(
                        "{}() got multiple values for keyword argument '{}'",
                        self.name, name
                    ));
                }
                Some(index) => bound.values[index] = Some(value),
                None if self.star_dict => bound.star_dict.push((name, value)),
                None => {
                    return Err(format!(
                        "{}() got an unexpected keyword argument '{}'",
                        self.name, name
                    ));
                }
            }
        }

        if bound.values[..self.min_args()].iter().any(Option::is_none) {
            return Err(self.arity_error(given));
        }

        Ok(bound)
    }
}
