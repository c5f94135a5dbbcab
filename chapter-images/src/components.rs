//! Dioxus UI components for chapter illustrations
//!
//! [`use_image_queue`] owns a running queue for the lifetime of the calling
//! component. [`ChapterImage`] renders one entry of a [`QueueSnapshot`].

use crate::fetch::ImageFetcher;
use crate::models::{EntrySnapshot, ImageQueueConfig, ImageUrlConfig, LoadStatus, QueueSnapshot};
use crate::queue::{image_queue, ImageQueueHandle};
use dioxus::prelude::*;

/// Texts shown around a chapter image; the app passes translated strings
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterImageLabels {
    pub waiting: String,
    pub loading: String,
    pub failed: String,
    pub retry: String,
}

impl Default for ChapterImageLabels {
    fn default() -> Self {
        Self {
            waiting: "Waiting for illustration".to_string(),
            loading: "Painting the illustration".to_string(),
            failed: "The illustration could not be loaded".to_string(),
            retry: "Try again".to_string(),
        }
    }
}

/// Starts an image queue scoped to the current component.
///
/// The driver and the snapshot watcher are spawned once and are cancelled
/// when the component is dropped, which also drops every in-flight request.
pub fn use_image_queue<F, M>(
    config: ImageQueueConfig,
    urls: ImageUrlConfig,
    make_fetcher: M,
) -> (ImageQueueHandle, Signal<QueueSnapshot>)
where
    F: ImageFetcher + 'static,
    M: FnOnce() -> F,
{
    let mut snapshot = use_signal(QueueSnapshot::default);

    let handle = use_hook(move || {
        let (handle, driver) = image_queue(config, urls, make_fetcher());
        spawn(driver.run());

        let mut updates = handle.subscribe();
        spawn(async move {
            while updates.changed().await.is_ok() {
                let next = updates.borrow_and_update().clone();
                snapshot.set(next);
            }
        });

        handle
    });

    (handle, snapshot)
}

const FRAME_STYLE: &str = "width: 100%; aspect-ratio: 3 / 2; border-radius: 12px; overflow: hidden; background: #f3efe6; display: flex; align-items: center; justify-content: center;";

/// Needs a `spin` keyframes rule in the host stylesheet
pub const LOADING_ICON_STYLE: &str = "font-size: 40px; display: inline-block; animation: spin 2s linear infinite;";

/// One chapter's illustration in whatever state it is in
#[component]
pub fn ChapterImage(
    entry: EntrySnapshot,
    #[props(default = "Chapter illustration".to_string())] alt: String,
    on_retry: EventHandler<usize>,
    #[props(default)] labels: ChapterImageLabels,
) -> Element {
    let index = entry.chapter_index;

    rsx! {
        div {
            class: "chapter-image",
            style: FRAME_STYLE,
            match entry.status {
                LoadStatus::Waiting => rsx! {
                    div {
                        style: "color: #a89f8c; text-align: center;",
                        div { style: "font-size: 40px;", "🖼️" }
                        p { style: "font-size: 13px; margin: 6px 0 0 0;", "{labels.waiting}" }
                    }
                },
                LoadStatus::Loading => rsx! {
                    div {
                        style: "color: #8a7f68; text-align: center;",
                        div { class: "chapter-image-spinner", style: LOADING_ICON_STYLE, "🎨" }
                        p { style: "font-size: 13px; margin: 6px 0 0 0;", "{labels.loading}" }
                    }
                },
                LoadStatus::Success => rsx! {
                    if let Some(src) = entry.image.clone() {
                        img {
                            src: "{src}",
                            alt: "{alt}",
                            style: "width: 100%; height: 100%; object-fit: cover;",
                        }
                    }
                },
                LoadStatus::Error => rsx! {
                    div {
                        style: "color: #b0543c; text-align: center; padding: 16px;",
                        div { style: "font-size: 32px;", "⚠️" }
                        p { style: "font-size: 13px; margin: 6px 0 12px 0;", "{labels.failed}" }
                        button {
                            style: "padding: 8px 16px; background: #b0543c; color: white; border: none; border-radius: 8px; cursor: pointer;",
                            onclick: move |_| on_retry.call(index),
                            "{labels.retry}"
                        }
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_icon_is_animated() {
        assert!(LOADING_ICON_STYLE.contains("animation: spin"));
        assert!(LOADING_ICON_STYLE.contains("infinite"));
    }
}
