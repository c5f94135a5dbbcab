use crate::config::AppConfig;
use crate::models::Story;
use crate::services::{BrowserSpeech, Narrator};
use chapter_images::{use_image_queue, ChapterImage, ChapterImageLabels, HttpImageFetcher};
use chrono::Local;
use dioxus::prelude::*;
use dioxus_i18n::t;

pub fn format_date(story: &Story) -> Option<String> {
    story
        .created_at
        .map(|dt| dt.with_timezone(&Local).format(&t!("date-format")).to_string())
}

/// A story with its illustrations, moral and read-aloud control.
///
/// Owns the image queue: mounting loads the chapters, unmounting drops every
/// pending and in-flight image. Give it a new `key` for a new story.
#[component]
pub fn StoryView(
    story: Story,
    #[props(default = false)] numbered: bool,
    #[props(default)] on_save: Option<EventHandler<()>>,
    #[props(default = false)] saving: bool,
    #[props(default)] on_regenerate: Option<EventHandler<()>>,
) -> Element {
    let config = use_context::<AppConfig>();

    let (queue, snapshot) = use_image_queue(
        config.images.queue.clone(),
        config.images.url.clone(),
        || {
            HttpImageFetcher::new().unwrap_or_else(|e| {
                log::error!("Falling back to a default image client: {}", e);
                HttpImageFetcher::default()
            })
        },
    );

    use_hook(|| queue.load_story(story.image_requests()));

    let mut ended = use_signal(|| None::<u64>);
    let rate = config.speech_rate;
    let mut narrator = use_signal(move || {
        Narrator::new(
            BrowserSpeech::new(EventHandler::new(move |id| ended.set(Some(id)))),
            rate,
        )
    });

    use_effect(move || {
        if let Some(id) = ended() {
            narrator.write().finished(id);
        }
    });

    use_drop(move || {
        if let Ok(mut narrator) = narrator.try_write() {
            narrator.stop();
        }
    });

    let labels = ChapterImageLabels {
        waiting: t!("image-waiting"),
        loading: t!("image-loading"),
        failed: t!("image-failed"),
        retry: t!("image-retry"),
    };
    let full_text = story.full_text();
    let speaking = narrator.read().is_speaking();
    let state = snapshot();

    rsx! {
        div { class: "generated-story",
            div { class: "story-header",
                h2 { class: "story-title", "{story.title}" }
                if let Some(date) = format_date(&story) {
                    p { class: "story-date", {t!("story-created-on", date: date)} }
                }
                div { class: "story-actions",
                    button {
                        class: if speaking { "audio-btn playing" } else { "audio-btn" },
                        onclick: move |_| narrator.write().toggle(&full_text),
                        if speaking { {t!("story-stop-reading")} } else { {t!("story-read-aloud")} }
                    }
                    if let Some(handler) = on_save {
                        button {
                            class: "audio-btn save-btn",
                            disabled: saving,
                            onclick: move |_| handler.call(()),
                            if saving { {t!("story-saving")} } else { {t!("story-save")} }
                        }
                    }
                    if let Some(handler) = on_regenerate {
                        button {
                            class: "audio-btn",
                            onclick: move |_| {
                                narrator.write().stop();
                                handler.call(());
                            },
                            {t!("story-regenerate")}
                        }
                    }
                }
            }

            div { class: "story-chapters",
                for (index, chapter) in story.chapters.iter().enumerate() {
                    div { key: "{index}", class: "story-chapter",
                        h3 { class: "chapter-title",
                            if numbered {
                                {t!("chapter-heading", number: index + 1, title: chapter.title.clone())}
                            } else {
                                "{chapter.title}"
                            }
                        }
                        ChapterImage {
                            entry: state.entry_or_waiting(index),
                            alt: chapter.title.clone(),
                            labels: labels.clone(),
                            on_retry: {
                                let queue = queue.clone();
                                move |i| queue.retry(i)
                            },
                        }
                        p { class: "chapter-content", "{chapter.content}" }
                    }
                }
            }

            div { class: "story-moral",
                h4 { {t!("story-moral-heading")} }
                p { "{story.moral}" }
            }
        }
    }
}
