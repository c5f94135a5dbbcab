use crate::models::{Credentials, Session, TokenResponse};
use chrono::Utc;

const FALLBACK_MESSAGE: &str = "Authentication failed";

/// Error type for authentication operations
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    NetworkError(String),
    JsonError(String),
    /// The service refused the request; carries its explanation
    Rejected(String),
    ServerError(String),
}

impl AuthError {
    /// Text for the inline form error
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Rejected(detail) => detail.clone(),
            _ => FALLBACK_MESSAGE.to_string(),
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            AuthError::JsonError(msg) => write!(f, "JSON error: {}", msg),
            AuthError::Rejected(msg) => write!(f, "Rejected: {}", msg),
            AuthError::ServerError(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

/// Pulls the `detail` field out of an error body.
///
/// String details are returned as is; validation error lists are reduced to
/// their first `msg`.
pub fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) if !detail.trim().is_empty() => Some(detail.clone()),
        serde_json::Value::Array(items) => items
            .iter()
            .find_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .map(str::to_string),
        _ => None,
    }
}

/// Client for the story service's account endpoints
#[derive(Clone)]
pub struct AuthService {
    base_url: String,
    client: reqwest::Client,
}

impl AuthService {
    pub fn new(base_url: String) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .connect_timeout(std::time::Duration::from_secs(10))
            .user_agent("Kathakalpana/0.1.0")
            .build()
            .map_err(|e| AuthError::NetworkError(format!("Client build failed: {}", e)))?;

        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Exchanges email and password for a bearer token
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let credentials = validate(email, password)?;

        let response = self
            .client
            .post(self.endpoint("login"))
            .form(&[
                ("username", credentials.email.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(format!("Request failed: {}", e)))?;

        let response = check_status(response).await?;
        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::JsonError(format!("Failed to parse token: {}", e)))?;

        log::info!("Logged in as {}", credentials.email);

        Ok(Session {
            email: credentials.email,
            access_token: token.access_token,
            token_type: token.token_type,
            issued_at: Utc::now(),
        })
    }

    /// Creates an account; the caller logs in separately afterwards
    pub async fn signup(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let credentials = validate(email, password)?;

        let response = self
            .client
            .post(self.endpoint("signup"))
            .json(&credentials)
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(format!("Request failed: {}", e)))?;

        check_status(response).await?;
        log::info!("Created account for {}", credentials.email);
        Ok(())
    }
}

fn validate(email: &str, password: &str) -> Result<Credentials, AuthError> {
    let credentials = Credentials::new(email, password);
    if credentials.email.is_empty() || credentials.password.is_empty() {
        return Err(AuthError::Rejected(
            "Please enter your email and password".to_string(),
        ));
    }
    Ok(credentials)
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    log::warn!("Auth request failed with {}: {}", status, body);

    match error_detail(&body) {
        Some(detail) if status.is_client_error() => Err(AuthError::Rejected(detail)),
        Some(detail) => Err(AuthError::ServerError(detail)),
        None => Err(AuthError::ServerError(format!(
            "Server returned status: {}",
            status
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_detail() {
        let body = r#"{"detail": "Incorrect email or password"}"#;
        assert_eq!(error_detail(body).as_deref(), Some("Incorrect email or password"));
    }

    #[test]
    fn test_validation_list_detail() {
        let body = r#"{"detail": [{"loc": ["body", "email"], "msg": "field required", "type": "value_error"}]}"#;
        assert_eq!(error_detail(body).as_deref(), Some("field required"));
    }

    #[test]
    fn test_missing_or_garbage_detail() {
        assert_eq!(error_detail("<html>502 Bad Gateway</html>"), None);
        assert_eq!(error_detail(r#"{"message": "nope"}"#), None);
        assert_eq!(error_detail(r#"{"detail": ""}"#), None);
    }

    #[test]
    fn test_user_message_falls_back() {
        assert_eq!(
            AuthError::Rejected("Email already registered".to_string()).user_message(),
            "Email already registered"
        );
        assert_eq!(
            AuthError::NetworkError("dns".to_string()).user_message(),
            "Authentication failed"
        );
    }

    #[test]
    fn test_endpoint_joins_cleanly() {
        let service = AuthService::new("http://localhost:8000/".to_string()).unwrap();
        assert_eq!(service.endpoint("login"), "http://localhost:8000/login");
    }

    #[tokio::test]
    async fn test_blank_input_is_rejected_before_sending() {
        // unroutable address: any request would fail with NetworkError
        let service = AuthService::new("http://127.0.0.1:9".to_string()).unwrap();
        let err = service.login("   ", "secret").await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected(_)));

        let err = service.signup("reader@example.com", "").await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected(_)));
    }
}
