//! Script values and the engine's standard coercions

use std::fmt;

use crate::context::ObjectId;

/// A value as seen by script code
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScriptValue {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    /// Reference to an object in the owning context's object table
    Object(ObjectId),
}

impl ScriptValue {
    /// `undefined` or `null`
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// The number if this is a `Number`, without coercion
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The string if this is a `String`, without coercion
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The object id if this is an `Object`
    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Self::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Standard numeric coercion (ToNumber)
    ///
    /// Objects coerce to NaN; host objects have no `valueOf` here.
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Undefined => f64::NAN,
            Self::Null => 0.0,
            Self::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Number(n) => *n,
            Self::String(s) => string_to_number(s),
            Self::Object(_) => f64::NAN,
        }
    }

    /// Standard boolean coercion (ToBoolean)
    pub fn to_boolean(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Boolean(b) => *b,
            Self::Number(n) => !(*n == 0.0 || n.is_nan()),
            Self::String(s) => !s.is_empty(),
            Self::Object(_) => true,
        }
    }

    /// Standard string coercion (ToString)
    pub fn to_script_string(&self) -> String {
        match self {
            Self::Undefined => "undefined".to_string(),
            Self::Null => "null".to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::Number(n) => number_to_string(*n),
            Self::String(s) => s.clone(),
            Self::Object(_) => "[object Object]".to_string(),
        }
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_script_string())
    }
}

/// Whitespace and line terminators trimmed by ToNumber
fn is_script_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0009}' | '\u{000B}' | '\u{000C}' | '\u{FEFF}' | '\u{000A}' | '\u{000D}' | '\u{2028}'
            | '\u{2029}'
    ) || c.is_whitespace()
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(is_script_whitespace);
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match trimmed.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &trimmed[2..];
        if digits.is_empty() {
            return f64::NAN;
        }
        let mut value = 0.0f64;
        for c in digits.chars() {
            match c.to_digit(radix) {
                Some(d) => value = value * radix as f64 + d as f64,
                None => return f64::NAN,
            }
        }
        return value;
    }

    // Rust's float parser also accepts "inf"/"nan", which script does not
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 {
        // Covers -0 as well
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        exponent_form(n)
    } else {
        n.to_string()
    }
}

/// Script exponent notation, e.g. `1.5e+21` and `1e-7`
fn exponent_form(n: f64) -> String {
    let formatted = format!("{:e}", n);
    match formatted.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => formatted,
    }
}

impl From<f64> for ScriptValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for ScriptValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for ScriptValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<ObjectId> for ScriptValue {
    fn from(value: ObjectId) -> Self {
        Self::Object(value)
    }
}

/// Conversion from a native field into a script value
pub trait ToScriptValue {
    fn to_script_value(&self) -> ScriptValue;
}

/// Conversion from a script value into a native field, using the engine's
/// standard coercions
pub trait FromScriptValue: Sized {
    fn from_script_value(value: &ScriptValue) -> Self;
}

impl ToScriptValue for f64 {
    fn to_script_value(&self) -> ScriptValue {
        ScriptValue::Number(*self)
    }
}

impl FromScriptValue for f64 {
    fn from_script_value(value: &ScriptValue) -> Self {
        value.to_number()
    }
}

impl ToScriptValue for bool {
    fn to_script_value(&self) -> ScriptValue {
        ScriptValue::Boolean(*self)
    }
}

impl FromScriptValue for bool {
    fn from_script_value(value: &ScriptValue) -> Self {
        value.to_boolean()
    }
}

impl ToScriptValue for String {
    fn to_script_value(&self) -> ScriptValue {
        ScriptValue::String(self.clone())
    }
}

impl FromScriptValue for String {
    fn from_script_value(value: &ScriptValue) -> Self {
        value.to_script_string()
    }
}

impl ToScriptValue for ScriptValue {
    fn to_script_value(&self) -> ScriptValue {
        self.clone()
    }
}

impl FromScriptValue for ScriptValue {
    fn from_script_value(value: &ScriptValue) -> Self {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_number_primitives() {
        assert!(ScriptValue::Undefined.to_number().is_nan());
        assert_eq!(ScriptValue::Null.to_number(), 0.0);
        assert_eq!(ScriptValue::Boolean(true).to_number(), 1.0);
        assert_eq!(ScriptValue::Boolean(false).to_number(), 0.0);
        assert_eq!(ScriptValue::Number(0.42).to_number(), 0.42);
    }

    #[test]
    fn test_to_number_strings() {
        assert_eq!(ScriptValue::from("  0.5\n").to_number(), 0.5);
        assert_eq!(ScriptValue::from("").to_number(), 0.0);
        assert_eq!(ScriptValue::from("   ").to_number(), 0.0);
        assert_eq!(ScriptValue::from("1e-1").to_number(), 0.1);
        assert_eq!(ScriptValue::from("0x10").to_number(), 16.0);
        assert_eq!(ScriptValue::from("0b101").to_number(), 5.0);
        assert_eq!(ScriptValue::from("-Infinity").to_number(), f64::NEG_INFINITY);
        assert!(ScriptValue::from("inf").to_number().is_nan());
        assert!(ScriptValue::from("nan").to_number().is_nan());
        assert!(ScriptValue::from("1px").to_number().is_nan());
        assert!(ScriptValue::from("0x").to_number().is_nan());
    }

    #[test]
    fn test_to_boolean() {
        assert!(!ScriptValue::Number(f64::NAN).to_boolean());
        assert!(!ScriptValue::Number(0.0).to_boolean());
        assert!(ScriptValue::Number(0.1).to_boolean());
        assert!(!ScriptValue::from("").to_boolean());
        assert!(ScriptValue::from("false").to_boolean());
        assert!(!ScriptValue::Null.to_boolean());
    }

    #[test]
    fn test_to_script_string() {
        assert_eq!(ScriptValue::Number(1.0).to_script_string(), "1");
        assert_eq!(ScriptValue::Number(0.25).to_script_string(), "0.25");
        assert_eq!(ScriptValue::Number(-0.0).to_script_string(), "0");
        assert_eq!(ScriptValue::Number(f64::NAN).to_script_string(), "NaN");
        assert_eq!(ScriptValue::Number(f64::INFINITY).to_script_string(), "Infinity");
        assert_eq!(ScriptValue::Undefined.to_script_string(), "undefined");
        assert_eq!(ScriptValue::Boolean(true).to_string(), "true");
    }

    #[test]
    fn test_number_to_string_exponent_range() {
        let cases = [
            (1e20, "100000000000000000000"),
            (1e21, "1e+21"),
            (1.5e21, "1.5e+21"),
            (-1e21, "-1e+21"),
            (0.000001, "0.000001"),
            (1e-7, "1e-7"),
            (-2.5e-8, "-2.5e-8"),
        ];
        for (n, expected) in cases {
            assert_eq!(ScriptValue::Number(n).to_script_string(), expected);
        }
    }

    #[test]
    fn test_field_conversions() {
        assert_eq!(f64::from_script_value(&ScriptValue::from("0.75")), 0.75);
        assert!(bool::from_script_value(&ScriptValue::Number(2.0)));
        assert_eq!(String::from_script_value(&ScriptValue::Null), "null");
        assert_eq!(0.5f64.to_script_value(), ScriptValue::Number(0.5));
    }
}
