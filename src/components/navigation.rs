use crate::Screen;
use dioxus::prelude::*;
use dioxus_i18n::t;

const TAB: &str = "padding: 8px 14px; margin: 0 4px; border: none; border-radius: 20px; cursor: pointer; font-size: 14px; background: transparent; color: #ffffff;";
const TAB_ACTIVE: &str = "padding: 8px 14px; margin: 0 4px; border: none; border-radius: 20px; cursor: pointer; font-size: 14px; background: #4facfe; color: #ffffff;";

#[component]
pub fn NavigationBar(
    current_screen: Screen,
    logged_in: bool,
    on_navigate: EventHandler<Screen>,
    on_logout: EventHandler<()>,
) -> Element {
    rsx! {
        nav { class: "navbar",
            h1 { class: "title", {t!("app-title")} }
            div { class: "nav-links",
                button {
                    style: if matches!(current_screen, Screen::Home) { TAB_ACTIVE } else { TAB },
                    onclick: move |_| on_navigate.call(Screen::Home),
                    {t!("nav-home")}
                }
                button {
                    style: if matches!(current_screen, Screen::Testimonials) { TAB_ACTIVE } else { TAB },
                    onclick: move |_| on_navigate.call(Screen::Testimonials),
                    {t!("nav-testimonials")}
                }
                button {
                    style: if matches!(current_screen, Screen::About) { TAB_ACTIVE } else { TAB },
                    onclick: move |_| on_navigate.call(Screen::About),
                    {t!("nav-about")}
                }
                if logged_in {
                    button {
                        style: if matches!(current_screen, Screen::Generate) { TAB_ACTIVE } else { TAB },
                        onclick: move |_| on_navigate.call(Screen::Generate),
                        {t!("nav-create")}
                    }
                    button {
                        style: if matches!(current_screen, Screen::Library | Screen::Reader(_)) { TAB_ACTIVE } else { TAB },
                        onclick: move |_| on_navigate.call(Screen::Library),
                        {t!("nav-library")}
                    }
                    button {
                        style: TAB,
                        onclick: move |_| on_logout.call(()),
                        {t!("nav-logout")}
                    }
                } else {
                    button {
                        style: if matches!(current_screen, Screen::Login) { TAB_ACTIVE } else { TAB },
                        onclick: move |_| on_navigate.call(Screen::Login),
                        {t!("nav-login")}
                    }
                }
            }
        }
    }
}
