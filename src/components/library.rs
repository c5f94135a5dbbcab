use crate::components::{end_session, format_date};
use crate::config::AppConfig;
use crate::models::SavedStory;
use crate::services::StoryService;
use crate::Screen;
use dioxus::prelude::*;
use dioxus_i18n::t;
use story_auth::Session;

#[derive(Clone, PartialEq)]
enum LibraryState {
    Loading,
    Loaded(Vec<SavedStory>),
    Failed(String),
}

/// The user's saved stories as cards
#[component]
pub fn LibraryScreen(session: Session, on_navigate: EventHandler<Screen>) -> Element {
    let config = use_context::<AppConfig>();
    let session_state = use_context::<Signal<Option<Session>>>();
    let mut state = use_signal(|| LibraryState::Loading);

    use_hook(move || {
        spawn(async move {
            let result = match StoryService::new(config) {
                Ok(service) => service.list_stories(&session).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(stories) => {
                    log::info!("Loaded {} saved stories", stories.len());
                    state.set(LibraryState::Loaded(stories));
                }
                Err(e) if e.is_unauthorized() => {
                    end_session(session_state);
                    on_navigate.call(Screen::Login);
                }
                Err(e) => {
                    log::error!("Failed to load library: {}", e);
                    state.set(LibraryState::Failed(e.user_message()));
                }
            }
        });
    });

    rsx! {
        div { class: "library-container",
            h2 { style: "text-align: center; margin-bottom: 30px;", {t!("library-title")} }

            match state() {
                LibraryState::Loading => rsx! {
                    div { class: "library-empty", {t!("library-loading")} }
                },
                LibraryState::Failed(message) => rsx! {
                    div { class: "notice", p { "{message}" } }
                },
                LibraryState::Loaded(stories) if stories.is_empty() => rsx! {
                    div { class: "library-empty", {t!("library-empty")} }
                },
                LibraryState::Loaded(stories) => rsx! {
                    div { class: "library-grid",
                        for story in stories {
                            StoryCard {
                                key: "{story.id}",
                                story: story.clone(),
                                on_open: move |s| on_navigate.call(Screen::Reader(s)),
                            }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn StoryCard(story: SavedStory, on_open: EventHandler<SavedStory>) -> Element {
    let date = format_date(&story.to_story());
    let chapters = story.chapters.len();
    let cover = story.cover().map(str::to_string);
    let opened = story.clone();

    rsx! {
        div {
            class: "story-card",
            onclick: move |_| on_open.call(opened.clone()),
            h3 { style: "margin-top: 0;", "{story.title}" }
            if let Some(date) = date {
                p { class: "story-date", "📅 {date}" }
            }
            if let Some(src) = cover {
                img { class: "story-cover", src: "{src}", alt: "cover" }
            }
            div { style: "margin-top: 15px;",
                span { class: "chapter-badge", {t!("library-chapter-count", count: chapters)} }
            }
        }
    }
}
