//! Typed answer values and the type registry used to coerce raw input.

use std::fmt;
use std::str::FromStr;

/// A resolved answer: the result of a prompt or an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Name of the value's type as written in templates.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// Shortest round-trip form of `x`, in the notation templates expect:
/// whole numbers keep `.0`, and exponents carry a sign and two digits
/// (`1e+20`, `1.5e-07`).
fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    // Debug switches to exponent form below 1e-4 and from 1e16 on.
    let debug = format!("{:?}", x);
    let Some((mantissa, exponent)) = debug.split_once('e') else {
        return debug;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{}e{}{:0>2}", mantissa, sign, digits)
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// Raw text or a value could not be converted to the requested type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionError {
    pub input: String,
    pub target: ValueType,
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid {}", self.input, self.target)
    }
}

impl std::error::Error for CoercionError {}

/// Declared type of a prompted marker (`name:int`, `name:float`, `name:str`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Float,
    Str,
}

impl ValueType {
    /// Coerce one line of raw user input.
    ///
    /// Numbers tolerate surrounding whitespace; strings are passed through
    /// untouched.
    pub fn coerce(self, raw: &str) -> Result<Value, CoercionError> {
        let fail = || CoercionError {
            input: raw.to_string(),
            target: self,
        };
        match self {
            ValueType::Int => raw.trim().parse::<i64>().map(Value::Int).map_err(|_| fail()),
            ValueType::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| fail()),
            ValueType::Str => Ok(Value::Str(raw.to_string())),
        }
    }

    /// Convert an already-typed value, such as an evaluated default.
    ///
    /// Floats truncate toward zero when converted to integers.
    pub fn convert(self, value: &Value) -> Result<Value, CoercionError> {
        match (self, value) {
            (ValueType::Int, Value::Int(i)) => Ok(Value::Int(*i)),
            (ValueType::Int, Value::Float(x)) => {
                let truncated = x.trunc();
                if truncated.is_finite()
                    && truncated >= i64::MIN as f64
                    && truncated <= i64::MAX as f64
                {
                    Ok(Value::Int(truncated as i64))
                } else {
                    Err(CoercionError {
                        input: value.to_string(),
                        target: self,
                    })
                }
            }
            (ValueType::Float, Value::Int(i)) => Ok(Value::Float(*i as f64)),
            (ValueType::Float, Value::Float(x)) => Ok(Value::Float(*x)),
            (ValueType::Str, v) => Ok(Value::Str(v.to_string())),
            (_, Value::Str(s)) => self.coerce(s),
        }
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(ValueType::Int),
            "float" => Ok(ValueType::Float),
            "str" => Ok(ValueType::Str),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Str => "str",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_int() {
        assert_eq!(ValueType::Int.coerce("3"), Ok(Value::Int(3)));
        assert_eq!(ValueType::Int.coerce(" -42 "), Ok(Value::Int(-42)));
    }

    #[test]
    fn coerce_int_rejects_garbage() {
        let err = ValueType::Int.coerce("abc").unwrap_err();
        assert_eq!(err.target, ValueType::Int);
        assert_eq!(err.to_string(), "'abc' is not a valid int");
        assert!(ValueType::Int.coerce("3.5").is_err());
        assert!(ValueType::Int.coerce("").is_err());
    }

    #[test]
    fn coerce_float() {
        assert_eq!(ValueType::Float.coerce("2.5"), Ok(Value::Float(2.5)));
        assert_eq!(ValueType::Float.coerce("4"), Ok(Value::Float(4.0)));
        assert!(ValueType::Float.coerce("four").is_err());
    }

    #[test]
    fn coerce_str_passes_through_whitespace() {
        assert_eq!(ValueType::Str.coerce("  spaced "), Ok(Value::from("  spaced ")));
        assert_eq!(ValueType::Str.coerce(""), Ok(Value::from("")));
    }

    #[test]
    fn convert_typed_defaults() {
        assert_eq!(ValueType::Int.convert(&Value::Float(10.9)), Ok(Value::Int(10)));
        assert_eq!(ValueType::Int.convert(&Value::Float(-2.5)), Ok(Value::Int(-2)));
        assert_eq!(ValueType::Float.convert(&Value::Int(3)), Ok(Value::Float(3.0)));
        assert_eq!(ValueType::Str.convert(&Value::Int(7)), Ok(Value::from("7")));
        assert_eq!(ValueType::Int.convert(&Value::from("12")), Ok(Value::Int(12)));
        assert!(ValueType::Int.convert(&Value::Float(f64::NAN)).is_err());
        assert!(ValueType::Int.convert(&Value::from("twelve")).is_err());
    }

    #[test]
    fn type_registry_tokens() {
        assert_eq!("int".parse::<ValueType>(), Ok(ValueType::Int));
        assert_eq!("float".parse::<ValueType>(), Ok(ValueType::Float));
        assert_eq!("str".parse::<ValueType>(), Ok(ValueType::Str));
        assert_eq!("bool".parse::<ValueType>(), Err("bool".to_string()));
    }

    #[test]
    fn display_forms() {
        assert_eq!(Value::Int(5).to_string(), "5");
        assert_eq!(Value::Float(10.0).to_string(), "10.0");
        assert_eq!(Value::Float(1e20).to_string(), "1e+20");
        assert_eq!(Value::Float(1e16).to_string(), "1e+16");
        assert_eq!(Value::Float(1e-5).to_string(), "1e-05");
        assert_eq!(Value::Float(-1.5e-7).to_string(), "-1.5e-07");
        assert_eq!(Value::Float(2.5e123).to_string(), "2.5e+123");
        assert_eq!(Value::Float(1e15).to_string(), "1000000000000000.0");
        assert_eq!(Value::Float(0.0001).to_string(), "0.0001");
        assert_eq!(Value::Float(f64::INFINITY).to_string(), "inf");
        assert_eq!(Value::Float(f64::NAN).to_string(), "nan");
        assert_eq!(Value::Float(0.25).to_string(), "0.25");
        assert_eq!(Value::from("text").to_string(), "text");
    }
}
