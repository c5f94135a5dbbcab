pub mod narration;
pub mod session_service;
pub mod story_service;

pub use narration::{BrowserSpeech, Narrator, SpeechEngine};
pub use session_service::*;
pub use story_service::StoryService;
