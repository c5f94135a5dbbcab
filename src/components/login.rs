use crate::database;
use crate::services;
use crate::Screen;
use dioxus::prelude::*;
use dioxus_i18n::t;
use story_auth::{AuthLabels, LoginForm, Session};

use crate::config::AppConfig;

#[component]
pub fn LoginScreen(on_navigate: EventHandler<Screen>) -> Element {
    let config = use_context::<AppConfig>();
    let mut session_state = use_context::<Signal<Option<Session>>>();

    let labels = AuthLabels {
        login_title: t!("login-title"),
        signup_title: t!("signup-title"),
        email_placeholder: t!("login-email"),
        password_placeholder: t!("login-password"),
        login_button: t!("login-submit"),
        signup_button: t!("signup-submit"),
        submitting: t!("login-submitting"),
        switch_to_signup: t!("login-switch-to-signup"),
        switch_to_login: t!("login-switch-to-login"),
        signed_up: t!("signup-success"),
    };

    let on_success = move |session: Session| {
        match database::init_database().and_then(|conn| services::save_session(&conn, &session)) {
            Ok(()) => {}
            // the login itself worked; it just won't survive a restart
            Err(e) => log::error!("Failed to persist session: {}", e),
        }
        session_state.set(Some(session));
        on_navigate.call(Screen::Generate);
    };

    rsx! {
        LoginForm {
            api_base_url: config.api_base_url.clone(),
            on_success,
            labels,
        }
    }
}
