use dioxus::prelude::*;
use dioxus_i18n::t;

/// Quotes shown on the testimonials page: (avatar, text key, author key)
const TESTIMONIALS: [(&str, &str, &str); 2] = [
    ("👧", "testimonial-child-text", "testimonial-child-name"),
    ("👨", "testimonial-parent-text", "testimonial-parent-name"),
];

#[component]
pub fn TestimonialsScreen() -> Element {
    rsx! {
        div { class: "testimonials",
            h2 { {t!("testimonials-title")} }
            div { class: "testimonial-grid",
                for (avatar, text, name) in TESTIMONIALS {
                    div { key: "{name}", class: "testimonial-card",
                        div { style: "font-size: 48px;", "{avatar}" }
                        p { {t!("testimonial-quote", text: t!(text))} }
                        h4 { {t!("testimonial-author", name: t!(name))} }
                    }
                }
            }
        }
    }
}

#[component]
pub fn AboutScreen() -> Element {
    rsx! {
        div { class: "about-us",
            h2 { {t!("about-title")} }
            p { class: "mission", {t!("about-mission")} }
        }
    }
}
