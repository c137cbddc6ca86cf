//! The `{data, message, errors}` wrapper every person service responds with.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorItem {
  pub message: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub field:   Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
  #[serde(default = "none")]
  pub data:    Option<T>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub errors:  Vec<ErrorItem>,
}

fn none<T>() -> Option<T> { None }

impl<T> Envelope<T> {
  pub fn ok(data: T, message: impl Into<String>) -> Self {
    Self { data: Some(data), message: Some(message.into()), errors: Vec::new() }
  }

  pub fn failure(message: impl Into<String>) -> Self {
    let message = message.into();
    Self {
      data:    None,
      message: Some(message.clone()),
      errors:  vec![ErrorItem { message, field: None }],
    }
  }

  /// The message to show for a failed call: the first listed error, else
  /// the top-level message.
  pub fn error_message(&self) -> Option<&str> {
    self
      .errors
      .first()
      .map(|e| e.message.as_str())
      .or(self.message.as_deref())
  }

  /// The payload, or [`Error::MissingData`].
  pub fn into_data(self) -> Result<T> { self.data.ok_or(Error::MissingData) }
}

impl<T: DeserializeOwned> Envelope<T> {
  /// Decode a response body. `success` is the HTTP outcome; a failed call
  /// becomes [`Error::Rejected`] with the best available message.
  pub fn decode(body: &[u8], success: bool, fallback: &str) -> Result<Self> {
    if success {
      return Ok(serde_json::from_slice(body)?);
    }
    let message = serde_json::from_slice::<Envelope<serde_json::Value>>(body)
      .ok()
      .and_then(|env| env.error_message().map(str::to_owned))
      .unwrap_or_else(|| fallback.to_owned());
    Err(Error::Rejected(message))
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn first_error_wins() {
    let env: Envelope<()> = serde_json::from_value(json!({
      "message": "general",
      "errors": [{ "message": "El documento ya existe", "field": "documentNumber" }]
    }))
    .unwrap();
    assert_eq!(env.error_message(), Some("El documento ya existe"));
  }

  #[test]
  fn decode_success_and_missing_data() {
    let body = br#"{"message":"ok"}"#;
    let env = Envelope::<Vec<u8>>::decode(body, true, "x").unwrap();
    assert_eq!(env.message.as_deref(), Some("ok"));
    assert!(matches!(env.into_data(), Err(Error::MissingData)));
  }

  #[test]
  fn decode_failure_uses_payload_or_fallback() {
    let err = Envelope::<()>::decode(br#"{"message":"Persona no encontrada"}"#, false, "fallo")
      .unwrap_err();
    assert_eq!(err.to_string(), "Persona no encontrada");

    let err = Envelope::<()>::decode(b"<html>502</html>", false, "fallo").unwrap_err();
    assert_eq!(err.to_string(), "fallo");
  }
}
