//! Remote store errors

use serde::Deserialize;
use thiserror::Error;

/// Errors from the Supabase REST API
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Supabase is not configured: missing {0}")]
    MissingConfig(&'static str),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Supabase API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
        details: Option<String>,
        hint: Option<String>,
    },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// PostgREST error body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

impl RemoteError {
    /// Build an API error from a non-success response
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body.trim().to_string()
                }
            });

        RemoteError::Api {
            status,
            code: parsed.code,
            message,
            details: parsed.details,
            hint: parsed.hint,
        }
    }
}
