//! # Chapter Images
//!
//! Sequential acquisition of generated chapter illustrations against a
//! rate-limited image service.
//!
//! This crate provides:
//! - Deterministic request URL construction from a chapter's prompt and seed
//! - A per-chapter load tracker with its own timeout bound
//! - A queue controller that admits one image at a time and paces admissions
//!   with an adaptive cooldown (doubling on failure, easing off on success)
//! - An async driver that runs the controller against an [`ImageFetcher`]
//!   and publishes snapshots over a `tokio::sync::watch` channel
//! - An HTTP fetcher returning inline `data:` URLs (feature `fetch`)
//! - Dioxus components for rendering a chapter image (feature `components`)
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use chapter_images::{image_queue, HttpImageFetcher, ImageQueueConfig, ImageRequest, ImageUrlConfig};
//!
//! let fetcher = HttpImageFetcher::new()?;
//! let (handle, driver) = image_queue(ImageQueueConfig::default(), ImageUrlConfig::default(), fetcher);
//! spawn(driver.run());
//!
//! handle.load_story(vec![ImageRequest::new(Some("A fox in a forest".into()), Some(4242))]);
//! let mut updates = handle.subscribe();
//! ```

pub mod backoff;
pub mod controller;
pub mod fetch;
pub mod models;
pub mod queue;
pub mod tracker;
pub mod url;

#[cfg(feature = "components")]
pub mod components;

pub use backoff::Cooldown;
pub use controller::{PollResult, QueueController};
pub use fetch::{FetchError, ImageFetcher};
pub use models::{
    Admission, EntrySnapshot, ImageQueueConfig, ImageRequest, ImageUrlConfig, LoadOutcome,
    LoadStatus, QueueEntry, QueueSnapshot,
};
pub use queue::{image_queue, ImageQueueDriver, ImageQueueHandle};
pub use tracker::LoadTracker;
pub use url::{build_image_url, sanitize_prompt};

#[cfg(feature = "fetch")]
pub use fetch::{to_data_url, HttpImageFetcher};

#[cfg(feature = "components")]
pub use components::{use_image_queue, ChapterImage, ChapterImageLabels};
