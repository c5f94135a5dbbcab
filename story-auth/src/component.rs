use crate::models::{AuthMode, LoginState, Session};
use crate::service::AuthService;
use dioxus::prelude::*;

/// Props for the LoginForm
#[derive(Props, Clone, PartialEq)]
pub struct LoginFormProps {
    /// Base URL of the story service
    pub api_base_url: String,
    /// Callback when login succeeds
    pub on_success: EventHandler<Session>,
    /// Custom labels for UI elements (optional)
    #[props(default)]
    pub labels: Option<AuthLabels>,
}

/// Custom labels for the login form
#[derive(Clone, PartialEq)]
pub struct AuthLabels {
    pub login_title: String,
    pub signup_title: String,
    pub email_placeholder: String,
    pub password_placeholder: String,
    pub login_button: String,
    pub signup_button: String,
    pub submitting: String,
    pub switch_to_signup: String,
    pub switch_to_login: String,
    pub signed_up: String,
}

impl Default for AuthLabels {
    fn default() -> Self {
        Self {
            login_title: "Welcome Back!".to_string(),
            signup_title: "Join Story Buddy".to_string(),
            email_placeholder: "Email".to_string(),
            password_placeholder: "Password".to_string(),
            login_button: "Log In".to_string(),
            signup_button: "Sign Up".to_string(),
            submitting: "Please wait...".to_string(),
            switch_to_signup: "Need an account? Sign up".to_string(),
            switch_to_login: "Already have an account? Log in".to_string(),
            signed_up: "Account created! Please log in.".to_string(),
        }
    }
}

/// Email/password form with a login/signup toggle
///
/// Signup does not log in: on success the form flips back to login mode and
/// shows a notice.
#[component]
pub fn LoginForm(props: LoginFormProps) -> Element {
    let mut mode = use_signal(AuthMode::default);
    let mut state = use_signal(|| LoginState::Idle);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);

    let labels = props.labels.clone().unwrap_or_default();

    let submit = {
        let api_base_url = props.api_base_url.clone();
        let on_success = props.on_success;

        move |evt: FormEvent| {
            evt.prevent_default();
            if state() == LoginState::Submitting {
                return;
            }
            state.set(LoginState::Submitting);

            let api_base_url = api_base_url.clone();
            let current_mode = mode();
            let email_value = email();
            let password_value = password();

            spawn(async move {
                let service = match AuthService::new(api_base_url) {
                    Ok(service) => service,
                    Err(e) => {
                        log::error!("{}", e);
                        state.set(LoginState::Error(e.user_message()));
                        return;
                    }
                };

                match current_mode {
                    AuthMode::Login => match service.login(&email_value, &password_value).await {
                        Ok(session) => {
                            state.set(LoginState::Success(session.clone()));
                            on_success.call(session);
                        }
                        Err(e) => {
                            log::warn!("Login failed: {}", e);
                            state.set(LoginState::Error(e.user_message()));
                        }
                    },
                    AuthMode::Signup => match service.signup(&email_value, &password_value).await {
                        Ok(()) => {
                            password.set(String::new());
                            mode.set(AuthMode::Login);
                            state.set(LoginState::SignedUp);
                        }
                        Err(e) => {
                            log::warn!("Signup failed: {}", e);
                            state.set(LoginState::Error(e.user_message()));
                        }
                    },
                }
            });
        }
    };

    let is_login = mode() == AuthMode::Login;
    let submitting = state() == LoginState::Submitting;

    rsx! {
        div {
            class: "auth-box",
            style: "max-width: 400px; margin: 40px auto; padding: 30px; background: #2a2a2a; border-radius: 15px; color: white; text-align: center;",
            h2 {
                if is_login { "{labels.login_title}" } else { "{labels.signup_title}" }
            }

            form {
                style: "display: flex; flex-direction: column; gap: 15px;",
                onsubmit: submit,
                input {
                    r#type: "email",
                    placeholder: "{labels.email_placeholder}",
                    value: "{email}",
                    required: true,
                    style: "padding: 10px; border-radius: 5px;",
                    oninput: move |evt| email.set(evt.value()),
                }
                input {
                    r#type: "password",
                    placeholder: "{labels.password_placeholder}",
                    value: "{password}",
                    required: true,
                    style: "padding: 10px; border-radius: 5px;",
                    oninput: move |evt| password.set(evt.value()),
                }

                match state() {
                    LoginState::Error(message) => rsx! {
                        p { style: "color: #ff6b6b; margin: 0;", "{message}" }
                    },
                    LoginState::SignedUp => rsx! {
                        p { style: "color: #7bd88f; margin: 0;", "{labels.signed_up}" }
                    },
                    _ => rsx! {},
                }

                button {
                    r#type: "submit",
                    disabled: submitting,
                    style: "margin-top: 10px; padding: 10px; cursor: pointer; background: #4facfe; border: none; color: white; border-radius: 5px;",
                    if submitting {
                        "{labels.submitting}"
                    } else if is_login {
                        "{labels.login_button}"
                    } else {
                        "{labels.signup_button}"
                    }
                }
            }

            p {
                style: "margin-top: 20px; color: #ccc; cursor: pointer;",
                onclick: move |_| {
                    mode.set(mode().toggled());
                    state.set(LoginState::Idle);
                },
                if is_login { "{labels.switch_to_signup}" } else { "{labels.switch_to_login}" }
            }
        }
    }
}
