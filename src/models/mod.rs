pub mod story;

pub use story::{Chapter, SavedStory, Story, StoryResponse};
