use indexmap::IndexMap;
use serde_json::Value;

use crate::database::Quote;

/// Placeholder name to value. Iteration order is insertion order, which is
/// the order textual substitution is applied in.
pub type ParamMap = IndexMap<String, Value>;

/// Builds a [`ParamMap`] from `name => value` pairs; values go through
/// `serde_json::json!`.
///
/// ```
/// let params = sqlnest::params! { ":age" => 21, ":city" => "Porto" };
/// assert_eq!(params.len(), 2);
/// ```
#[macro_export]
macro_rules! params {
    () => { $crate::ParamMap::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::ParamMap::new();
        $( map.insert(($name).to_string(), $crate::serde_json::json!($value)); )+
        map
    }};
}

/// SQL literal text for `value`. Strings are quoted by the collaborator,
/// numbers are emitted raw.
pub fn literal_for<Q: Quote + ?Sized>(value: &Value, quoter: &Q) -> String {
    match value {
        Value::String(text) => quoter.quote(text),
        Value::Number(number) => number.to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Null => "NULL".to_string(),
        Value::Array(_) | Value::Object(_) => quoter.quote(&value.to_string()),
    }
}
