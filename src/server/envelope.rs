//! server::envelope
//!
//! The uniform response envelope.
//!
//! Handlers emit only a [`Payload`] — a data list or an errors map. The
//! envelope stage merges that payload into an [`Envelope`] carrying the API
//! version and per-request metadata, decoding the handler's bytes into the
//! typed payload slot exactly once and re-encoding exactly once, so numbers
//! survive the rewrite untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::server::context::RequestContext;

/// The domain half of a response: either records or errors, never both.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Payload {
    /// Ordered records, omitted when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Value>>,
    /// Keyed error details, omitted when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Map<String, Value>>,
}

impl Payload {
    /// A data payload from serializable records.
    ///
    /// # Errors
    ///
    /// Propagates serialization failures; those are internal bugs surfaced
    /// as 500s, never user conditions.
    pub fn with_data<T: Serialize>(
        records: impl IntoIterator<Item = T>,
    ) -> Result<Self, serde_json::Error> {
        let data = records
            .into_iter()
            .map(|record| serde_json::to_value(record))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            data: Some(data),
            errors: None,
        })
    }

    /// An error payload with a human-readable message under `errors.error`.
    pub fn error(message: impl Into<String>) -> Self {
        let mut errors = Map::new();
        errors.insert("error".to_string(), Value::String(message.into()));

        Self {
            data: None,
            errors: Some(errors),
        }
    }
}

/// The shape of every response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// The API version, always present
    pub api_version: String,
    /// The request id, omitted when empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// The route signature, omitted when empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method: String,
    /// The handler's payload, flattened into the envelope
    #[serde(flatten)]
    pub payload: Payload,
}

/// Merge a handler's serialized payload into the envelope.
///
/// # Errors
///
/// Fails when `body` does not decode as a [`Payload`]; the caller treats
/// that as an internal bug.
pub fn wrap(
    body: &[u8],
    api_version: &str,
    ctx: &RequestContext,
) -> Result<Vec<u8>, serde_json::Error> {
    let payload: Payload = serde_json::from_slice(body)?;

    serde_json::to_vec(&Envelope {
        api_version: api_version.to_string(),
        id: ctx.id.clone(),
        method: ctx.method.clone(),
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RequestContext {
        RequestContext {
            id: "dc380b72-41c9-47bf-8be5-f3a7a493f4ca".to_string(),
            method: "repositories.commits.get".to_string(),
        }
    }

    #[test]
    fn wraps_data_payload() {
        let body = serde_json::to_vec(&Payload::with_data(["a", "b"]).unwrap()).unwrap();
        let wrapped = wrap(&body, "0.1.0", &ctx()).unwrap();

        let value: Value = serde_json::from_slice(&wrapped).unwrap();
        assert_eq!(value["apiVersion"], "0.1.0");
        assert_eq!(value["id"], "dc380b72-41c9-47bf-8be5-f3a7a493f4ca");
        assert_eq!(value["method"], "repositories.commits.get");
        assert_eq!(value["data"], serde_json::json!(["a", "b"]));
        assert!(value.get("errors").is_none());
    }

    #[test]
    fn wraps_error_payload() {
        let body = serde_json::to_vec(&Payload::error("Unauthorized")).unwrap();
        let wrapped = wrap(&body, "0.1.0", &ctx()).unwrap();

        let value: Value = serde_json::from_slice(&wrapped).unwrap();
        assert_eq!(value["errors"]["error"], "Unauthorized");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn empty_context_fields_are_omitted() {
        let body = serde_json::to_vec(&Payload::error("x")).unwrap();
        let empty = RequestContext {
            id: String::new(),
            method: String::new(),
        };
        let wrapped = wrap(&body, "0.1.0", &empty).unwrap();

        let value: Value = serde_json::from_slice(&wrapped).unwrap();
        assert!(value.get("id").is_none());
        assert!(value.get("method").is_none());
        assert_eq!(value["apiVersion"], "0.1.0");
    }

    #[test]
    fn numbers_survive_the_rewrite_exactly() {
        // A value outside f64's exact range must not be re-quantized.
        let body = br#"{"data":[{"n":9007199254740993}]}"#;
        let wrapped = wrap(body, "0.1.0", &ctx()).unwrap();
        assert!(String::from_utf8(wrapped)
            .unwrap()
            .contains("9007199254740993"));
    }

    #[test]
    fn garbage_body_is_an_error() {
        assert!(wrap(b"not json", "0.1.0", &ctx()).is_err());
    }
}
