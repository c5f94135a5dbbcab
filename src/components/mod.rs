pub mod about;
pub mod generator;
pub mod home;
pub mod library;
pub mod login;
pub mod navigation;
pub mod reader;
pub mod story_view;

pub use about::{AboutScreen, TestimonialsScreen};
pub use generator::GeneratorScreen;
pub use home::HomeScreen;
pub use library::LibraryScreen;
pub use login::LoginScreen;
pub use navigation::NavigationBar;
pub use reader::ReaderScreen;
pub use story_view::{format_date, StoryView};

use crate::{database, services};
use dioxus::prelude::*;
use story_auth::Session;

/// Logs out: forgets the persisted token and the in-memory session
pub fn end_session(mut session: Signal<Option<Session>>) {
    if let Err(e) = database::init_database().and_then(|conn| services::clear_session(&conn)) {
        log::error!("Failed to clear stored session: {}", e);
    }
    session.set(None);
}
