use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// The declared kind of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    String,
    Int,
    Float,
    Bool,
}

impl VarType {
    pub const ALL: [VarType; 4] = [VarType::String, VarType::Int, VarType::Float, VarType::Bool];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            VarType::String => "string",
            VarType::Int => "int",
            VarType::Float => "float",
            VarType::Bool => "bool",
        }
    }

    /// Parses raw text under this kind's grammar.
    pub fn parse_value(self, raw: &str) -> Result<TypedValue> {
        let invalid = || Error::InvalidValue {
            kind: self,
            value: raw.to_string(),
        };

        match self {
            VarType::String => Ok(TypedValue::String(raw.to_string())),
            VarType::Int => raw.parse::<i64>().map(TypedValue::Int).map_err(|_| invalid()),
            VarType::Float => {
                if !is_float_numeral(raw) {
                    return Err(invalid());
                }
                match raw.parse::<f64>() {
                    Ok(f) if f.is_finite() => Ok(TypedValue::Float(f)),
                    _ => Err(invalid()),
                }
            }
            VarType::Bool => match raw {
                "true" => Ok(TypedValue::Bool(true)),
                "false" => Ok(TypedValue::Bool(false)),
                _ => Err(invalid()),
            },
        }
    }

    /// Like [`VarType::parse_value`], but accepts the empty text as "unset".
    pub fn check_stored(self, raw: &str) -> Result<()> {
        if raw.is_empty() {
            return Ok(());
        }
        self.parse_value(raw).map(|_| ())
    }
}

/// Rejects `inf`, `NaN` and friends, which `f64::from_str` would accept.
fn is_float_numeral(raw: &str) -> bool {
    !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VarType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "string" => Ok(VarType::String),
            "int" => Ok(VarType::Int),
            "float" => Ok(VarType::Float),
            "bool" => Ok(VarType::Bool),
            other => Err(Error::InvalidType(other.to_string())),
        }
    }
}

/// A value that has passed validation for its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl TypedValue {
    #[must_use]
    pub fn kind(&self) -> VarType {
        match self {
            TypedValue::String(_) => VarType::String,
            TypedValue::Int(_) => VarType::Int,
            TypedValue::Float(_) => VarType::Float,
            TypedValue::Bool(_) => VarType::Bool,
        }
    }
}

/// Deserializes a JSON scalar (string, number or bool) into its text form.
/// Devices commonly send `5` rather than `"5"`.
pub fn scalar_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    use serde_json::Value;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(D::Error::custom("value must be a string, number or boolean")),
    }
}
