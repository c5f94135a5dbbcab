use crate::error::AppError;
use chapter_images::ImageRequest;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const LEGACY_MORAL: &str = "Every story has a lesson to learn.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chapter {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_prompt: Option<String>,
    #[serde(default)]
    pub image_seed: Option<u64>,
    /// Image that came with the story; never sent back to the service
    #[serde(default, skip_serializing)]
    pub image: Option<String>,
}

impl Chapter {
    pub fn image_request(&self) -> ImageRequest {
        ImageRequest::new(self.image_prompt.clone(), self.image_seed).with_preloaded(self.image.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Story {
    pub title: String,
    pub moral: String,
    pub chapters: Vec<Chapter>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Story {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.chapters.is_empty() {
            return Err(AppError::Validation(
                "The story came back without any chapters".to_string(),
            ));
        }
        Ok(())
    }

    pub fn image_requests(&self) -> Vec<ImageRequest> {
        self.chapters.iter().map(Chapter::image_request).collect()
    }

    /// All chapter texts, for narration
    pub fn full_text(&self) -> String {
        self.chapters
            .iter()
            .map(|c| c.content.trim())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A story as returned by the library endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedStory {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub moral: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SavedStory {
    pub fn to_story(&self) -> Story {
        Story {
            title: self.title.clone(),
            moral: self.moral.clone(),
            chapters: self.chapters.clone(),
            created_at: self.created_at,
        }
    }

    pub fn cover(&self) -> Option<&str> {
        self.chapters.first().and_then(|c| c.image.as_deref())
    }
}

/// Accepts RFC 3339 and the service's naive UTC timestamps
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => Some(naive.and_utc()),
        Err(e) => {
            log::warn!("Unparseable timestamp '{}': {}", raw, e);
            None
        }
    }
}

/// Current shape of `/generate`
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedStory {
    pub title: String,
    #[serde(default)]
    pub moral: String,
    pub chapters: Vec<Chapter>,
}

/// Older shape of `/generate`: a bare chapter list with inline images
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyChapter {
    #[serde(default)]
    pub chapter: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "imagePrompt", default)]
    pub image_prompt: Option<String>,
    #[serde(rename = "imageBase64", default)]
    pub image_base64: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoryResponse {
    Current(GeneratedStory),
    Legacy(Vec<LegacyChapter>),
}

impl StoryResponse {
    pub fn into_story(self, genre: &str, received_at: DateTime<Utc>) -> Story {
        match self {
            StoryResponse::Current(story) => Story {
                title: story.title,
                moral: story.moral,
                chapters: story.chapters,
                created_at: Some(received_at),
            },
            StoryResponse::Legacy(chapters) => Story {
                title: format!("A \"{}\" Story", genre.trim()),
                moral: LEGACY_MORAL.to_string(),
                chapters: chapters.into_iter().map(LegacyChapter::into_chapter).collect(),
                created_at: Some(received_at),
            },
        }
    }
}

impl LegacyChapter {
    fn into_chapter(self) -> Chapter {
        let image = self
            .image_base64
            .map(|b64| b64.trim().to_string())
            .filter(|b64| !b64.is_empty())
            .and_then(|b64| {
                use base64::{engine::general_purpose, Engine as _};
                match general_purpose::STANDARD.decode(&b64) {
                    Ok(_) => Some(format!("data:image/png;base64,{}", b64)),
                    Err(e) => {
                        log::warn!("Ignoring invalid inline image for '{}': {}", self.chapter, e);
                        None
                    }
                }
            });

        Chapter {
            title: self.chapter,
            content: self.content,
            image_prompt: self.image_prompt,
            image_seed: None,
            image,
        }
    }
}
