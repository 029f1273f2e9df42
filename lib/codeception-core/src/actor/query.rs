use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use url::Url;

use super::ActorError;

/// Query parameters for a GET or DELETE request.
///
/// Each value is turned into its string form before encoding: strings are
/// kept as is, numbers and booleans use their usual representation, `null`
/// becomes an empty string, and arrays or objects are rendered as compact
/// JSON. Parameters are kept sorted by name, one value per name.
///
/// # Example
///
/// ```rust
/// use codeception_core::QueryParams;
///
/// let query = QueryParams::new()
///     .add_param("page", 2)
///     .add_param("active", true)
///     .add_param("q", "rust & http");
///
/// assert_eq!(query.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    params: BTreeMap<String, Value>,
}

impl QueryParams {
    /// Creates an empty set of parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, replacing any previous value with the same name.
    pub fn add_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Checks if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    fn to_query_string(&self) -> Result<String, ActorError> {
        let pairs = self
            .params
            .iter()
            .map(|(name, value)| (name.as_str(), value_to_string(value)))
            .collect::<Vec<_>>();
        let query = serde_urlencoded::to_string(pairs)?;
        Ok(query)
    }

    /// Appends the encoded parameters to the URL, after any query already present.
    pub(super) fn append_to(&self, url: &mut Url) -> Result<(), ActorError> {
        if self.is_empty() {
            return Ok(());
        }

        let encoded = self.to_query_string()?;
        let query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
            _ => encoded,
        };
        url.set_query(Some(&query));
        Ok(())
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Number(_) | Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            value.to_string()
        }
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let params = iter
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        Self { params }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for QueryParams
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(value: [(K, V); N]) -> Self {
        value.into_iter().collect()
    }
}

impl<K, V> From<Vec<(K, V)>> for QueryParams
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(value: Vec<(K, V)>) -> Self {
        value.into_iter().collect()
    }
}

impl<K, V, S> From<HashMap<K, V, S>> for QueryParams
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(value: HashMap<K, V, S>) -> Self {
        value.into_iter().collect()
    }
}

impl<K, V> From<BTreeMap<K, V>> for QueryParams
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(value: BTreeMap<K, V>) -> Self {
        value.into_iter().collect()
    }
}
