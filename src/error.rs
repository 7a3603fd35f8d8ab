//! Errors surfaced by the REST client, the query cache and form validation.
//!
//! Every variant is shown to the user as a transient notification. None of
//! them are fatal: the current view stays interactive and cached data is kept.

use thiserror::Error;

/// Failure of a read, a write, or a client-side check before a write.
///
/// `Clone` because a single in-flight fetch hands the same outcome to every
/// caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
  /// The request could not be sent or no response came back.
  #[error("network error: {message}")]
  Network { message: String },

  /// The backend answered with a non-2xx status.
  #[error("request failed with status {status}: {}", summarize_body(.body))]
  Request { status: u16, body: String },

  /// A 2xx response whose body did not match the expected schema.
  #[error("unexpected response body: {message}")]
  Decode { message: String },

  /// A form field failed a client-side check.
  #[error("{field}: {message}")]
  Validation {
    field: &'static str,
    message: String,
  },
}

impl ApiError {
  pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
    Self::Validation {
      field,
      message: message.into(),
    }
  }

  /// HTTP status for request failures.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Request { status, .. } => Some(*status),
      _ => None,
    }
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      Self::Decode {
        message: err.to_string(),
      }
    } else {
      Self::Network {
        message: err.to_string(),
      }
    }
  }
}

impl From<serde_json::Error> for ApiError {
  fn from(err: serde_json::Error) -> Self {
    Self::Decode {
      message: err.to_string(),
    }
  }
}

/// Keep error bodies on one short line for notifications.
fn summarize_body(body: &str) -> String {
  let line = body.lines().next().unwrap_or("").trim();
  if line.is_empty() {
    "(empty body)".to_string()
  } else if line.chars().count() > 80 {
    format!("{}...", line.chars().take(77).collect::<String>())
  } else {
    line.to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_request_error_display_summarizes_body() {
    let err = ApiError::Request {
      status: 422,
      body: "{\"detail\":\"bad\"}\nmore".to_string(),
    };
    assert_eq!(
      err.to_string(),
      "request failed with status 422: {\"detail\":\"bad\"}"
    );
    assert_eq!(err.status(), Some(422));
  }

  #[test]
  fn test_request_error_empty_body() {
    let err = ApiError::Request {
      status: 500,
      body: String::new(),
    };
    assert_eq!(err.to_string(), "request failed with status 500: (empty body)");
  }

  #[test]
  fn test_long_body_is_truncated() {
    let body = "x".repeat(200);
    let summary = summarize_body(&body);
    assert_eq!(summary.chars().count(), 80);
    assert!(summary.ends_with("..."));
  }

  #[test]
  fn test_validation_error() {
    let err = ApiError::validation("email", "is required");
    assert!(matches!(err, ApiError::Validation { field: "email", .. }));
    assert_eq!(err.to_string(), "email: is required");
    assert_eq!(err.status(), None);
  }
}
