//! Request body decoding.
//!
//! Handlers declare a `Deserialize` struct per route and decode the JSON body
//! into it; any shape mismatch becomes [`Error::InvalidArgument`].

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decodes a request body into a typed argument struct.
///
/// A `null` body is treated as an empty object, so routes whose fields are
/// all optional accept a missing body.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] naming the offending field when the
/// body does not match `T`.
///
/// # Examples
///
/// ```
/// use serde::Deserialize;
/// use serde_json::json;
/// use toolgate_core::parse_args;
///
/// #[derive(Debug, Deserialize)]
/// struct ReadArgs {
///     path: String,
/// }
///
/// let args: ReadArgs = parse_args(json!({ "path": "notes.md" })).unwrap();
/// assert_eq!(args.path, "notes.md");
///
/// let err = parse_args::<ReadArgs>(json!({})).unwrap_err();
/// assert!(err.to_string().contains("path"));
/// ```
pub fn parse_args<T: DeserializeOwned>(body: Value) -> Result<T> {
    let body = if body.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        body
    };

    serde_json::from_value(body).map_err(|e| Error::InvalidArgument(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct SearchArgs {
        query: String,
        #[serde(default)]
        path: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    struct OptionalArgs {
        #[serde(default)]
        depth: Option<u32>,
    }

    #[test]
    fn test_parse_required_and_optional() {
        let args: SearchArgs = parse_args(json!({ "query": "flange" })).unwrap();
        assert_eq!(args.query, "flange");
        assert!(args.path.is_none());
    }

    #[test]
    fn test_parse_missing_field() {
        let err = parse_args::<SearchArgs>(json!({ "path": "." })).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("query"));
    }

    #[test]
    fn test_parse_wrong_type() {
        let err = parse_args::<SearchArgs>(json!({ "query": 42 })).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_null_body_is_empty_object() {
        let args: OptionalArgs = parse_args(Value::Null).unwrap();
        assert!(args.depth.is_none());
    }
}
