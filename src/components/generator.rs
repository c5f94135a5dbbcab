use crate::components::{end_session, StoryView};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::Story;
use crate::services::story_service::{validate_request, StoryService};
use crate::Screen;
use dioxus::prelude::*;
use dioxus_i18n::t;
use story_auth::Session;

/// Genre prompt, chapter slider and the freshly generated story
#[component]
pub fn GeneratorScreen(session: Session, on_navigate: EventHandler<Screen>) -> Element {
    let config = use_context::<AppConfig>();
    let session_state = use_context::<Signal<Option<Session>>>();

    let mut genre = use_signal(String::new);
    let mut chapter_count = use_signal(|| config.default_chapters);
    let mut story = use_signal(|| None::<Story>);
    let mut loading = use_signal(|| false);
    let mut saving = use_signal(|| false);
    let mut notice = use_signal(|| None::<String>);
    let mut saved = use_signal(|| false);

    let handle_error = move |e: AppError| {
        log::warn!("Story request failed: {}", e);
        if e.is_unauthorized() {
            end_session(session_state);
            on_navigate.call(Screen::Login);
        } else {
            notice.set(Some(e.user_message()));
        }
    };

    let generate = {
        let config = config.clone();
        let session = session.clone();
        move || {
            if loading() {
                return;
            }
            let genre_value = genre();
            let chapters = chapter_count();
            if let Err(e) = validate_request(&config, &genre_value, chapters) {
                notice.set(Some(e.user_message()));
                return;
            }

            // unmounts the old story view, dropping its images and narration
            story.set(None);
            loading.set(true);

            let config = config.clone();
            let session = session.clone();
            spawn(async move {
                let result = match StoryService::new(config) {
                    Ok(service) => service.generate(&session, &genre_value, chapters).await,
                    Err(e) => Err(e),
                };
                loading.set(false);
                match result {
                    Ok(new_story) => story.set(Some(new_story)),
                    Err(e) => {
                        let mut handle_error = handle_error;
                        handle_error(e);
                    }
                }
            });
        }
    };

    let save = {
        let config = config.clone();
        let session = session.clone();
        move |_: ()| {
            let Some(current) = story() else {
                return;
            };
            saving.set(true);
            let config = config.clone();
            let session = session.clone();
            spawn(async move {
                let result = match StoryService::new(config) {
                    Ok(service) => service.save_story(&session, &current).await,
                    Err(e) => Err(e),
                };
                saving.set(false);
                match result {
                    Ok(()) => {
                        saved.set(true);
                        notice.set(Some(t!("story-saved")));
                    }
                    Err(e) => {
                        let mut handle_error = handle_error;
                        handle_error(e);
                    }
                }
            });
        }
    };

    let mut submit = generate.clone();
    let mut click = generate.clone();
    let mut again = generate;
    let regenerate = move |_: ()| again();

    rsx! {
        div { class: "story-generator",
            h2 { {t!("generator-title")} }

            div { class: "genre-input-section",
                input {
                    class: "genre-input",
                    r#type: "text",
                    placeholder: t!("generator-genre-placeholder"),
                    value: "{genre}",
                    oninput: move |evt| genre.set(evt.value()),
                    onkeydown: move |evt: KeyboardEvent| {
                        if evt.key() == Key::Enter {
                            submit();
                        }
                    },
                }
                div { class: "chapter-count-section",
                    label { {t!("generator-length", count: chapter_count())} }
                    input {
                        r#type: "range",
                        min: "{config.min_chapters}",
                        max: "{config.max_chapters}",
                        value: "{chapter_count}",
                        oninput: move |evt| {
                            if let Ok(n) = evt.value().parse::<u32>() {
                                chapter_count.set(n);
                            }
                        },
                    }
                }
                button {
                    disabled: loading(),
                    onclick: move |_| click(),
                    if loading() { {t!("generator-loading")} } else { {t!("generator-submit")} }
                }
            }

            if let Some(message) = notice() {
                div { class: "notice-overlay",
                    div { class: "notice",
                        p { "{message}" }
                        button {
                            onclick: move |_| {
                                notice.set(None);
                                if saved() {
                                    on_navigate.call(Screen::Library);
                                }
                            },
                            {t!("notice-ok")}
                        }
                    }
                }
            }

            if let Some(current) = story() {
                StoryView {
                    key: "{current.created_at:?}",
                    story: current,
                    saving: saving(),
                    on_save: EventHandler::new(save),
                    on_regenerate: EventHandler::new(regenerate),
                }
            }
        }
    }
}
