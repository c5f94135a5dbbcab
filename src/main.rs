use dioxus::prelude::*;

mod components;
mod config;
mod database;
mod error;
mod i18n;
mod models;
mod services;

use components::{
    end_session, AboutScreen, GeneratorScreen, HomeScreen, LibraryScreen, LoginScreen,
    NavigationBar, ReaderScreen, TestimonialsScreen,
};
use config::AppConfig;
use models::SavedStory;
use story_auth::Session;

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    #[cfg(target_os = "android")]
    android_logger::init_once(
        android_logger::Config::default().with_max_level(log::LevelFilter::Info),
    );
    #[cfg(not(target_os = "android"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    dioxus::launch(App);
}

/// Screen navigation for the app
#[derive(Clone, PartialEq, Debug)]
pub enum Screen {
    Home,
    Testimonials,
    About,
    Login,
    Generate,
    Library,
    Reader(SavedStory),
}

impl Screen {
    pub fn requires_session(&self) -> bool {
        !matches!(
            self,
            Screen::Home | Screen::Testimonials | Screen::About | Screen::Login
        )
    }
}

fn load_config() -> AppConfig {
    AppConfig::load().unwrap_or_else(|e| {
        log::error!("{}; using defaults", e);
        AppConfig::default()
    })
}

fn restore_session() -> Option<Session> {
    match database::init_database().and_then(|conn| services::load_session(&conn)) {
        Ok(session) => {
            if let Some(s) = &session {
                log::info!("Restored session for {}", s.email);
            }
            session
        }
        Err(e) => {
            log::error!("Could not restore session: {}", e);
            None
        }
    }
}

#[component]
fn App() -> Element {
    dioxus_i18n::prelude::use_init_i18n(i18n::init_i18n);
    let config = use_context_provider(load_config);
    let session = use_context_provider(|| Signal::new(restore_session()));
    let mut current_screen = use_signal(|| Screen::Home);

    log::debug!("Rendering with API at {}", config.api_base_url);

    let screen = current_screen();
    let active_session = session();
    let logged_in = active_session.is_some();
    if screen.requires_session() && !logged_in {
        log::debug!("Screen needs a session, showing login");
    }

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        div { class: "app-container",
            NavigationBar {
                current_screen: screen.clone(),
                logged_in,
                on_navigate: move |s| current_screen.set(s),
                on_logout: move |_| {
                    end_session(session);
                    current_screen.set(Screen::Home);
                },
            }

            // Main Content
            div { class: "main-content",
                match (screen, active_session) {
                    (Screen::Home, _) => rsx! {
                        HomeScreen { on_navigate: move |s| current_screen.set(s) }
                    },
                    (Screen::Testimonials, _) => rsx! { TestimonialsScreen {} },
                    (Screen::About, _) => rsx! { AboutScreen {} },
                    (Screen::Login, _) | (_, None) => rsx! {
                        LoginScreen { on_navigate: move |s| current_screen.set(s) }
                    },
                    (Screen::Generate, Some(session)) => rsx! {
                        GeneratorScreen { session, on_navigate: move |s| current_screen.set(s) }
                    },
                    (Screen::Library, Some(session)) => rsx! {
                        LibraryScreen { session, on_navigate: move |s| current_screen.set(s) }
                    },
                    (Screen::Reader(story), Some(_)) => rsx! {
                        ReaderScreen { story, on_navigate: move |s| current_screen.set(s) }
                    },
                }
            }

            footer { class: "app-footer",
                p { {dioxus_i18n::t!("footer")} }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_screens() {
        assert!(!Screen::Home.requires_session());
        assert!(!Screen::Login.requires_session());
        assert!(!Screen::Testimonials.requires_session());
        assert!(!Screen::About.requires_session());
        assert!(Screen::Generate.requires_session());
        assert!(Screen::Library.requires_session());
    }

    #[test]
    fn test_stylesheet_defines_spinner() {
        let css = include_str!("../assets/main.css");
        assert!(css.contains("@keyframes spin"));
    }
}
