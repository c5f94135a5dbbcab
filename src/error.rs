use std::fmt;

/// Central error types for the story app
#[derive(Debug)]
pub enum AppError {
    /// Database error (rusqlite)
    Database(rusqlite::Error),
    /// Filesystem error
    Filesystem(std::io::Error),
    /// Request never got an answer (connection, timeout, TLS)
    Network(String),
    /// Story service answered with an error status
    Server { status: u16, detail: String },
    /// Token missing, expired or rejected
    Unauthorized,
    /// Unreadable configuration file
    Config(String),
    /// Validation error (e.g. invalid inputs)
    Validation(String),
    /// General error
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Database(e) => write!(f, "Database error: {}", e),
            AppError::Filesystem(e) => write!(f, "Filesystem error: {}", e),
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Server { status, detail } => {
                write!(f, "Server error ({}): {}", status, detail)
            }
            AppError::Unauthorized => write!(f, "Not authorized"),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Conversions from other error types
impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Filesystem(e)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AppError::Network("The request timed out".to_string())
        } else if e.is_decode() {
            AppError::Other(format!("Unexpected response: {}", e))
        } else {
            AppError::Network(e.to_string())
        }
    }
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

/// User-friendly error messages for UI
impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(_) => "A database error occurred. Please try again.".to_string(),
            AppError::Filesystem(_) => {
                "Error accessing files. Please check app permissions.".to_string()
            }
            AppError::Network(_) => {
                "The story service could not be reached. Please try again.".to_string()
            }
            AppError::Server { detail, .. } if !detail.is_empty() => detail.clone(),
            AppError::Server { .. } => "The story service had a problem. Please try again.".to_string(),
            AppError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            AppError::Config(msg) => format!("The configuration file is invalid: {}", msg),
            AppError::Validation(msg) => msg.clone(),
            AppError::Other(msg) => msg.clone(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_detail_is_shown() {
        let err = AppError::Server {
            status: 500,
            detail: "Model overloaded".to_string(),
        };
        assert_eq!(err.user_message(), "Model overloaded");

        let err = AppError::Server {
            status: 502,
            detail: String::new(),
        };
        assert!(err.user_message().contains("problem"));
    }

    #[test]
    fn test_config_error_message() {
        let err = AppError::Config("expected a table".to_string());
        assert_eq!(err.to_string(), "Configuration error: expected a table");
        assert!(err.user_message().contains("expected a table"));
    }

    #[test]
    fn test_unauthorized() {
        assert!(AppError::Unauthorized.is_unauthorized());
        assert!(!AppError::Validation("x".to_string()).is_unauthorized());
    }
}
