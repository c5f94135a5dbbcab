use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::{SavedStory, Story, StoryResponse};
use chrono::Utc;
use serde::Serialize;
use story_auth::Session;

#[derive(Debug, Serialize, PartialEq)]
struct GenerateRequest<'a> {
    genre: &'a str,
    chapters: u32,
}

#[derive(Debug, Serialize, PartialEq)]
struct SaveRequest<'a> {
    title: &'a str,
    moral: &'a str,
    chapters: Vec<SaveChapter<'a>>,
}

#[derive(Debug, Serialize, PartialEq)]
struct SaveChapter<'a> {
    title: &'a str,
    content: &'a str,
    image_prompt: &'a str,
    image_seed: u64,
}

/// Checks the generation form before anything is sent
pub fn validate_request(config: &AppConfig, genre: &str, chapters: u32) -> Result<(), AppError> {
    if genre.trim().is_empty() {
        return Err(AppError::Validation("Please enter a genre!".to_string()));
    }
    if chapters < config.min_chapters || chapters > config.max_chapters {
        return Err(AppError::Validation(format!(
            "A story has between {} and {} chapters",
            config.min_chapters, config.max_chapters
        )));
    }
    Ok(())
}

fn save_request<'a>(story: &'a Story, default_seed: u64) -> SaveRequest<'a> {
    SaveRequest {
        title: &story.title,
        moral: &story.moral,
        chapters: story
            .chapters
            .iter()
            .map(|c| SaveChapter {
                title: &c.title,
                content: &c.content,
                image_prompt: c.image_prompt.as_deref().unwrap_or_default(),
                image_seed: c.image_seed.unwrap_or(default_seed),
            })
            .collect(),
    }
}

/// Maps an error status of the story service
fn status_error(status: u16, body: &str) -> AppError {
    if status == 401 {
        return AppError::Unauthorized;
    }
    AppError::Server {
        status,
        detail: story_auth::service::error_detail(body).unwrap_or_default(),
    }
}

/// Client for story generation and the personal library
#[derive(Clone)]
pub struct StoryService {
    config: AppConfig,
    client: reqwest::Client,
}

impl StoryService {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(std::time::Duration::from_secs(10))
            .user_agent("Kathakalpana/0.1.0")
            .build()
            .map_err(|e| AppError::Network(format!("Client build failed: {}", e)))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        log::warn!("Story service returned {}: {}", status, body);
        Err(status_error(status.as_u16(), &body))
    }

    /// Asks the service for a new story
    pub async fn generate(
        &self,
        session: &Session,
        genre: &str,
        chapters: u32,
    ) -> Result<Story, AppError> {
        validate_request(&self.config, genre, chapters)?;
        let genre = genre.trim();

        log::info!("Generating a {}-chapter story about '{}'", chapters, genre);

        let response = self
            .client
            .post(self.endpoint("generate"))
            .header(reqwest::header::AUTHORIZATION, session.authorization())
            .json(&GenerateRequest { genre, chapters })
            .send()
            .await?;

        let response = Self::check(response).await?;
        let story = response
            .json::<StoryResponse>()
            .await?
            .into_story(genre, Utc::now());
        story.validate()?;

        log::info!("Received '{}' with {} chapters", story.title, story.chapters.len());
        Ok(story)
    }

    /// Stores a story in the user's library; inline images are not sent
    pub async fn save_story(&self, session: &Session, story: &Story) -> Result<(), AppError> {
        let payload = save_request(story, self.config.images.url.default_seed);

        let response = self
            .client
            .post(self.endpoint("save_story"))
            .header(reqwest::header::AUTHORIZATION, session.authorization())
            .json(&payload)
            .send()
            .await?;

        Self::check(response).await?;
        log::info!("Saved '{}' to the library", story.title);
        Ok(())
    }

    /// The user's saved stories, newest first
    pub async fn list_stories(&self, session: &Session) -> Result<Vec<SavedStory>, AppError> {
        let response = self
            .client
            .get(self.endpoint("my_stories"))
            .header(reqwest::header::AUTHORIZATION, session.authorization())
            .send()
            .await?;

        let response = Self::check(response).await?;
        let mut stories = response.json::<Vec<SavedStory>>().await?;
        sort_newest_first(&mut stories);
        Ok(stories)
    }
}

/// Undated stories go last
pub fn sort_newest_first(stories: &mut [SavedStory]) {
    stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chapter;
    use chrono::TimeZone;

    fn session() -> Session {
        Session {
            email: "reader@example.com".to_string(),
            access_token: "tok".to_string(),
            token_type: "bearer".to_string(),
            issued_at: Utc::now(),
        }
    }

    #[test]
    fn test_validation() {
        let config = AppConfig::default();
        assert!(validate_request(&config, "space pirates", 3).is_ok());
        assert!(validate_request(&config, "space pirates", 1).is_ok());
        assert!(validate_request(&config, "space pirates", 5).is_ok());
        assert!(matches!(
            validate_request(&config, "   ", 3),
            Err(AppError::Validation(_))
        ));
        assert!(validate_request(&config, "x", 0).is_err());
        assert!(validate_request(&config, "x", 6).is_err());
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(status_error(401, ""), AppError::Unauthorized));

        match status_error(500, r#"{"detail": "Groq quota exceeded"}"#) {
            AppError::Server { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(detail, "Groq quota exceeded");
            }
            other => panic!("unexpected {:?}", other),
        }

        match status_error(502, "<html>bad gateway</html>") {
            AppError::Server { detail, .. } => assert!(detail.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_save_payload_fills_missing_prompt_and_seed() {
        let story = Story {
            title: "Legacy".to_string(),
            moral: "m".to_string(),
            chapters: vec![Chapter {
                title: "One".to_string(),
                content: "text".to_string(),
                image_prompt: None,
                image_seed: None,
                image: Some("data:image/png;base64,AA".to_string()),
            }],
            created_at: None,
        };

        let json = serde_json::to_value(save_request(&story, 1234)).unwrap();
        assert_eq!(json["chapters"][0]["image_prompt"], "");
        assert_eq!(json["chapters"][0]["image_seed"], 1234);
        assert!(json["chapters"][0].get("image").is_none());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_sort_newest_first() {
        let story = |id: &str, day: Option<u32>| SavedStory {
            id: id.to_string(),
            title: id.to_string(),
            moral: String::new(),
            chapters: vec![],
            created_at: day.map(|d| Utc.with_ymd_and_hms(2025, 1, d, 0, 0, 0).unwrap()),
        };
        let mut stories = vec![story("a", Some(1)), story("none", None), story("c", Some(3))];
        sort_newest_first(&mut stories);

        let ids: Vec<&str> = stories.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "none"]);
    }

    #[tokio::test]
    async fn test_generate_rejects_before_sending() {
        let config = AppConfig {
            api_base_url: "http://127.0.0.1:9".to_string(),
            ..AppConfig::default()
        };
        let service = StoryService::new(config).unwrap();
        let err = service.generate(&session(), "", 3).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_endpoint() {
        let config = AppConfig {
            api_base_url: "http://localhost:8000/".to_string(),
            ..AppConfig::default()
        };
        let service = StoryService::new(config).unwrap();
        assert_eq!(service.endpoint("my_stories"), "http://localhost:8000/my_stories");
    }
}
