use crate::Screen;
use dioxus::prelude::*;
use dioxus_i18n::t;

#[component]
pub fn HomeScreen(on_navigate: EventHandler<Screen>) -> Element {
    rsx! {
        div { class: "home-page",
            div { class: "hero-section",
                h1 { {t!("home-welcome")} }
                p { {t!("home-tagline")} }
                button {
                    class: "cta-button",
                    onclick: move |_| on_navigate.call(Screen::Generate),
                    {t!("home-cta")}
                }
            }
            div { class: "features-section",
                Feature { icon: "⭐", title: t!("feature-genres-title"), description: t!("feature-genres-text") }
                Feature { icon: "📖", title: t!("feature-stories-title"), description: t!("feature-stories-text") }
                Feature { icon: "🧒", title: t!("feature-kids-title"), description: t!("feature-kids-text") }
            }
        }
    }
}

#[component]
fn Feature(icon: String, title: String, description: String) -> Element {
    rsx! {
        div { class: "feature",
            div { style: "font-size: 32px;", "{icon}" }
            h3 { "{title}" }
            p { "{description}" }
        }
    }
}
