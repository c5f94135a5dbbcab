use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of a successful `/login` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Body sent to `/signup`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.to_string(),
        }
    }
}

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub access_token: String,
    pub token_type: String,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    /// Value for the `Authorization` header
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// Which form is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Signup,
            AuthMode::Signup => AuthMode::Login,
        }
    }
}

/// State of the login form
#[derive(Debug, Clone, PartialEq)]
pub enum LoginState {
    /// Waiting for input
    Idle,
    /// Request in flight
    Submitting,
    /// Account created; the user can now log in
    SignedUp,
    /// Logged in
    Success(Session),
    /// Request failed with a message for the user
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_type_defaults_to_bearer() {
        let token: TokenResponse = serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        assert_eq!(token.token_type, "bearer");
    }

    #[test]
    fn test_authorization_header() {
        let session = Session {
            email: "a@b.c".to_string(),
            access_token: "tok".to_string(),
            token_type: "bearer".to_string(),
            issued_at: Utc::now(),
        };
        assert_eq!(session.authorization(), "Bearer tok");
    }

    #[test]
    fn test_credentials_trim_email_only() {
        let creds = Credentials::new("  someone@example.com ", " pass ");
        assert_eq!(creds.email, "someone@example.com");
        assert_eq!(creds.password, " pass ");
    }

    #[test]
    fn test_mode_toggle() {
        assert_eq!(AuthMode::Login.toggled(), AuthMode::Signup);
        assert_eq!(AuthMode::Signup.toggled(), AuthMode::Login);
    }
}
