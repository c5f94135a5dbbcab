use crate::components::StoryView;
use crate::models::SavedStory;
use crate::Screen;
use dioxus::prelude::*;
use dioxus_i18n::t;

/// A saved story, opened from the library
#[component]
pub fn ReaderScreen(story: SavedStory, on_navigate: EventHandler<Screen>) -> Element {
    rsx! {
        div { class: "reader-container",
            button {
                class: "back-btn",
                onclick: move |_| on_navigate.call(Screen::Library),
                {t!("reader-back")}
            }
            StoryView { key: "{story.id}", story: story.to_story(), numbered: true }
        }
    }
}
