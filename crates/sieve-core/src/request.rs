//! Incoming request parameters.
//!
//! A [`RequestParams`] is the flat key/value view of a request that filters
//! read from. It can be built by hand, from a JSON object, or from a URL
//! query string using the usual web-form list convention (`k[]=a&k[]=b`).

use std::collections::{btree_map, BTreeMap};

use serde::Serialize;
use sieve_db::Value;

use crate::error::{FilterError, FilterResult};

/// A single request value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// `Null` and the empty string disable every built-in operator.
    pub fn is_blank(&self) -> bool {
        match self {
            ParamValue::Null => true,
            ParamValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// The bind value for a scalar. Lists have none.
    pub fn as_scalar(&self) -> Option<Value> {
        match self {
            ParamValue::Null => Some(Value::Null),
            ParamValue::Bool(v) => Some(Value::from(*v)),
            ParamValue::Integer(v) => Some(Value::Integer(*v)),
            ParamValue::Real(v) => Some(Value::Real(*v)),
            ParamValue::Text(v) => Some(Value::Text(v.clone())),
            ParamValue::List(_) => None,
        }
    }

    /// A scalar rendered as text, e.g. for an order-by column name.
    pub fn as_text(&self) -> Option<String> {
        match self {
            ParamValue::Null | ParamValue::List(_) => None,
            ParamValue::Bool(v) => Some(if *v { "1" } else { "0" }.to_string()),
            other => other.as_scalar().map(|value| value.to_text()),
        }
    }

    /// Every item of a flat list. `None` for scalars and nested lists.
    pub fn as_scalars(&self) -> Option<Vec<Value>> {
        self.as_list()?
            .iter()
            .map(ParamValue::as_scalar)
            .collect()
    }

    /// The two bounds of a range. Anything but a two-item flat list is `None`.
    pub fn as_range(&self) -> Option<(Value, Value)> {
        let mut bounds = self.as_scalars()?;
        if bounds.len() != 2 {
            return None;
        }
        let high = bounds.pop()?;
        let low = bounds.pop()?;
        Some((low, high))
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Integer(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Real(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::Null, Into::into)
    }
}

/// JSON objects nested inside a request become lists of their values in
/// document order, the same as a form field sent as `k[from]=..&k[to]=..`.
impl From<serde_json::Value> for ParamValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ParamValue::Null,
            serde_json::Value::Bool(v) => ParamValue::Bool(v),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(v) => ParamValue::Integer(v),
                None => n.as_f64().map_or(ParamValue::Null, ParamValue::Real),
            },
            serde_json::Value::String(v) => ParamValue::Text(v),
            serde_json::Value::Array(items) => {
                ParamValue::List(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(map) => {
                ParamValue::List(map.into_iter().map(|(_, v)| v.into()).collect())
            }
        }
    }
}

/// Request parameters keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequestParams {
    params: BTreeMap<String, ParamValue>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`RequestParams::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.params.insert(key.into(), value.into());
    }

    /// Looks up `key`. An explicit `Null` reads the same as a missing key.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.params
            .get(key)
            .filter(|value| !matches!(value, ParamValue::Null))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ParamValue> {
        self.params.iter()
    }

    /// Parses a URL query string. A leading `?` is ignored.
    ///
    /// `k[]=a&k[]=b` and `k[0]=a&k[1]=b` collect into a list in the order
    /// they appear; a repeated plain key keeps its last value. All values are
    /// text.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::new();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match list_key(&key) {
                Some(base) => params.push(base, value.into_owned()),
                None => params.insert(key.into_owned(), value.into_owned()),
            }
        }

        params
    }

    /// Builds parameters from a JSON object.
    pub fn from_json(value: serde_json::Value) -> FilterResult<Self> {
        match value {
            serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(FilterError::InvalidRequest(json_kind(&other).to_string())),
        }
    }

    fn push(&mut self, key: &str, value: String) {
        let entry = self
            .params
            .entry(key.to_string())
            .or_insert_with(|| ParamValue::List(Vec::new()));

        match entry {
            ParamValue::List(items) => items.push(ParamValue::Text(value)),
            scalar => *scalar = ParamValue::List(vec![ParamValue::Text(value)]),
        }
    }
}

/// `name[]` or `name[anything]` yields `name`.
fn list_key(key: &str) -> Option<&str> {
    let open = key.find('[')?;
    if open == 0 || !key.ends_with(']') {
        return None;
    }
    Some(&key[..open])
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl<K, V> FromIterator<(K, V)> for RequestParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RequestParams {
    type Item = (&'a String, &'a ParamValue);
    type IntoIter = btree_map::Iter<'a, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}
