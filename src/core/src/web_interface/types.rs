use serde::{Deserialize, Serialize};

use crate::storage::types::User;

/// Uniform JSON envelope returned by every `/api` route except health.
///
/// Absent fields are left out of the JSON entirely.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String, // RFC3339
    pub uptime: f64,       // seconds
}

/// POST /api/users body. Missing fields deserialize to `None` so they can be
/// reported as a validation failure instead of a body error.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl CreateUserRequest {
    pub const REQUIRED_FIELDS: &'static str = "Name and email are required";

    /// Returns `(name, email)` when both are present and not blank.
    ///
    /// This is the only place user input is checked; the storage layer stores
    /// whatever it is given.
    pub fn validate(&self) -> Result<(&str, &str), &'static str> {
        match (self.name.as_deref(), self.email.as_deref()) {
            (Some(name), Some(email)) if !name.trim().is_empty() && !email.trim().is_empty() => {
                Ok((name, email))
            }
            _ => Err(Self::REQUIRED_FIELDS),
        }
    }
}

/// Raw query strings are kept as text: an unparsable value falls back to the
/// configured default rather than rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct SlowQueryParams {
    pub delay: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MemoryParams {
    pub size: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MemoryReport {
    pub elements: usize,
    pub approximate_bytes: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCallData {
    pub service: &'static str,
    pub data: ExternalPayload,
    pub response_time: u64,
}

#[derive(Debug, Serialize)]
pub struct ExternalPayload {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexOperationData {
    pub total_users: usize,
    pub sample_users: Vec<Option<User>>,
}
