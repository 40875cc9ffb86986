//! Wire types for the catalog API that are not domain types.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/auth/login` and `POST /api/auth/signup`.
#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful auth response.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

/// `{message}` body used by error responses and delete confirmations.
#[derive(Debug, Default, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl MessageBody {
    /// Extract a non-empty `message` from a raw body.
    #[must_use]
    pub fn extract(raw: &str) -> Option<String> {
        serde_json::from_str::<Self>(raw)
            .ok()
            .and_then(|body| body.message)
            .filter(|m| !m.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message() {
        assert_eq!(
            MessageBody::extract(r#"{"message":"Token expired"}"#).as_deref(),
            Some("Token expired")
        );
        assert_eq!(MessageBody::extract(r#"{"message":""}"#), None);
        assert_eq!(MessageBody::extract(r#"{"error":"x"}"#), None);
        assert_eq!(MessageBody::extract("<html>502</html>"), None);
    }

    #[test]
    fn test_auth_request_shape() {
        let body = serde_json::to_value(AuthRequest {
            email: "ops@producthub.io",
            password: "hunter22",
        })
        .unwrap_or_default();
        assert_eq!(body["email"], "ops@producthub.io");
        assert_eq!(body["password"], "hunter22");
    }
}
