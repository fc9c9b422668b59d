//! Parameter environment and value typing
//!
//! The web tool hands the adapter a flat mapping of parameter names to
//! values. Operations here take that environment by value and return the
//! updated copy, so every change to it is visible in the function signature.
//!
//! Keys follow the `TopoFlow` convention: `<name>`, `<name>_ptype`,
//! `<name>_dtype`, `<name>_file`, `<name>_scalar`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{InvalidParameterTypeError, MaterializeError};

/// A single parameter value: a number, or a piece of text such as a choice
/// tag or an uploaded file name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Numeric parameter value
    Number(f64),
    /// Textual parameter value (choice tags, file names)
    Text(String),
}

impl Value {
    /// Numeric view of the value. Text that parses as a number counts.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(t) => t.trim().parse().ok(),
        }
    }

    /// Textual view of the value; `None` for numbers.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Number(_) => None,
            Value::Text(t) => Some(t),
        }
    }

    /// Non-negative integer view of the value (step counts, dimensions).
    pub fn as_usize(&self) -> Option<usize> {
        match self {
            Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as usize),
            Value::Number(_) => None,
            Value::Text(t) => t.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(t) => f.write_str(t),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(t: &str) -> Self {
        Value::Text(t.to_string())
    }
}

impl From<String> for Value {
    fn from(t: String) -> Self {
        Value::Text(t)
    }
}

/// Parameter representation tag: how a parameter value is expanded into a
/// full grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ptype {
    /// A single value covering the whole grid
    Scalar,
    /// One value per time step, uniform across the grid
    #[serde(rename = "Time_Series")]
    TimeSeries,
    /// A 2-D grid, constant in time
    Grid,
    /// A time-indexed stack of 2-D grids
    #[serde(rename = "Grid_Sequence")]
    GridSequence,
}

impl Ptype {
    /// Wire tag as it appears in the environment.
    pub fn as_str(self) -> &'static str {
        match self {
            Ptype::Scalar => "Scalar",
            Ptype::TimeSeries => "Time_Series",
            Ptype::Grid => "Grid",
            Ptype::GridSequence => "Grid_Sequence",
        }
    }
}

impl fmt::Display for Ptype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ptype {
    type Err = InvalidParameterTypeError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "Scalar" => Ok(Ptype::Scalar),
            "Time_Series" => Ok(Ptype::TimeSeries),
            "Grid" => Ok(Ptype::Grid),
            "Grid_Sequence" => Ok(Ptype::GridSequence),
            other => Err(InvalidParameterTypeError(other.to_string())),
        }
    }
}

/// `TopoFlow` data type of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    /// Value parses as a number
    Float,
    /// Anything else
    String,
}

impl Dtype {
    /// Infer the data type of a value.
    ///
    /// A numeric parse failure is the expected path for file names and choice
    /// tags, never an error.
    ///
    /// ```
    /// use topoflow_adapter_core::{Dtype, Value};
    ///
    /// assert_eq!(Dtype::of(&Value::from("3.14")), Dtype::Float);
    /// assert_eq!(Dtype::of(&Value::from("abc")), Dtype::String);
    /// ```
    pub fn of(value: &Value) -> Self {
        if value.as_f64().is_some() {
            Dtype::Float
        } else {
            Dtype::String
        }
    }

    /// Wire tag as it appears in the environment.
    pub fn as_str(self) -> &'static str {
        match self {
            Dtype::Float => "float",
            Dtype::String => "string",
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of the `*_ptype` companion entry for a parameter.
pub fn ptype_key(name: &str) -> String {
    format!("{name}_ptype")
}

/// Key of the `*_dtype` companion entry for a parameter.
pub fn dtype_key(name: &str) -> String {
    format!("{name}_dtype")
}

/// Key of the `*_file` companion entry for a parameter.
pub fn file_key(name: &str) -> String {
    format!("{name}_file")
}

/// Key of the `*_scalar` companion entry for a parameter.
pub fn scalar_key(name: &str) -> String {
    format!("{name}_scalar")
}

/// Flat mapping of parameter names to values, as supplied by the web tool.
///
/// Serializes transparently as a JSON object, so a request body like
/// `{"rain": 5.0, "rain_ptype": "Scalar"}` deserializes directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment {
    values: BTreeMap<String, Value>,
}

impl Environment {
    /// Create an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an environment from a JSON object.
    ///
    /// # Errors
    /// Returns the underlying `serde_json` error if the text is not a flat
    /// object of numbers and strings.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Serialize the environment back to JSON.
    ///
    /// # Errors
    /// Returns the underlying `serde_json` error on serialization failure.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Insert or replace a parameter value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a parameter value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Look up a parameter value, failing if absent.
    ///
    /// # Errors
    /// `MaterializeError::MissingParameter` if the key is not set.
    pub fn require(&self, key: &str) -> Result<&Value, MaterializeError> {
        self.values
            .get(key)
            .ok_or_else(|| MaterializeError::MissingParameter(key.to_string()))
    }

    /// Look up a parameter as text.
    ///
    /// # Errors
    /// `MissingParameter` if absent, `NotText` if the value is a number.
    pub fn require_str(&self, key: &str) -> Result<&str, MaterializeError> {
        let value = self.require(key)?;
        value.as_str().ok_or_else(|| MaterializeError::NotText {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Look up a parameter as a number.
    ///
    /// # Errors
    /// `MissingParameter` if absent, `NotANumber` if the value does not
    /// parse as a number.
    pub fn require_f64(&self, key: &str) -> Result<f64, MaterializeError> {
        let value = self.require(key)?;
        value.as_f64().ok_or_else(|| MaterializeError::NotANumber {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Look up a parameter as a non-negative integer.
    ///
    /// # Errors
    /// `MissingParameter` if absent, `NotANumber` if the value is not a
    /// non-negative whole number.
    pub fn require_usize(&self, key: &str) -> Result<usize, MaterializeError> {
        let value = self.require(key)?;
        value.as_usize().ok_or_else(|| MaterializeError::NotANumber {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Iterate over the parameter keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of entries in the environment.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the environment holds no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Environment {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Result of [`assign_parameters`]: the updated environment plus the base
/// names of parameters that were supplied through uploaded files.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Environment with base parameters and dtypes filled in
    pub env: Environment,
    /// Base names of parameters whose value is a file name
    pub files: Vec<String>,
}

/// Resolve user selections into concrete parameter values.
///
/// A subset of `TopoFlow` input parameters can take a scalar value or, through
/// an uploaded file, a time series, grid, or grid sequence. For every
/// `<name>_ptype` entry, the base parameter `<name>` is assigned from
/// `<name>_scalar` when the tag is `Scalar` and from `<name>_file` otherwise
/// (recording `<name>` in the returned file list), and `<name>_dtype` is set
/// from [`Dtype::of`].
///
/// # Errors
/// `MaterializeError::MissingParameter` if a referenced `*_scalar`, `*_file`,
/// or `*_ptype` companion entry is absent.
pub fn assign_parameters(mut env: Environment) -> Result<Assignment, MaterializeError> {
    let names: Vec<String> = env
        .keys()
        .filter_map(|key| key.strip_suffix("_ptype"))
        .map(ToString::to_string)
        .collect();

    let mut files = Vec::new();
    for name in names {
        let is_scalar = env
            .require(&ptype_key(&name))?
            .as_str()
            .is_some_and(|tag| tag == Ptype::Scalar.as_str());

        let source_key = if is_scalar {
            scalar_key(&name)
        } else {
            file_key(&name)
        };
        let value = env.require(&source_key)?.clone();
        if !is_scalar {
            files.push(name.clone());
        }

        let dtype = Dtype::of(&value);
        env.insert(name.clone(), value);
        env.insert(dtype_key(&name), dtype.as_str());
    }

    Ok(Assignment { env, files })
}
