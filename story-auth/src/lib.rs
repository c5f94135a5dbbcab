//! # Story Auth
//!
//! Email/password authentication against the story service.
//!
//! This crate provides:
//! - Login (form-encoded, returns a bearer token) and signup (JSON)
//! - A [`Session`] value carrying the token for later API calls
//! - A Dioxus login/signup form component
//!
//! ## Separation of Concerns
//!
//! This crate does **not** persist sessions; the application decides where
//! a [`Session`] lives.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use story_auth::{AuthService, LoginForm};
//!
//! let service = AuthService::new("http://localhost:8000".to_string())?;
//! let session = service.login("reader@example.com", "secret").await?;
//!
//! LoginForm {
//!     api_base_url: "http://localhost:8000".to_string(),
//!     on_success: move |session| {
//!         // Store the session and move on
//!     },
//! }
//! ```

pub mod component;
pub mod models;
pub mod service;

pub use component::{AuthLabels, LoginForm, LoginFormProps};
pub use models::{AuthMode, Credentials, LoginState, Session, TokenResponse};
pub use service::{AuthError, AuthService};
