//! Request URLs for the image generation endpoint

use crate::models::ImageUrlConfig;

/// Reduces a free-text prompt to its first `max_words` alphanumeric words.
///
/// Returns `None` when nothing usable remains.
pub fn sanitize_prompt(prompt: &str, max_words: usize) -> Option<String> {
    let cleaned: String = prompt
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    let words: Vec<&str> = cleaned.split_whitespace().take(max_words).collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Builds the request URL for one chapter illustration.
///
/// `retry` is part of the query so that a retried request never hits a
/// cached failure.
pub fn build_image_url(
    config: &ImageUrlConfig,
    prompt: Option<&str>,
    seed: Option<u64>,
    retry: u32,
) -> String {
    let words = match prompt.and_then(|p| sanitize_prompt(p, config.prompt_words)) {
        Some(words) => words,
        None => return config.fallback_url.clone(),
    };

    let full_prompt = if config.style_suffix.is_empty() {
        words
    } else {
        format!("{} {}", words, config.style_suffix)
    };

    format!(
        "{}/{}?width={}&height={}&seed={}&nologo=true&model={}&retry={}",
        config.endpoint.trim_end_matches('/'),
        urlencoding::encode(&full_prompt),
        config.width,
        config.height,
        seed.unwrap_or(config.default_seed),
        urlencoding::encode(&config.model),
        retry
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ImageUrlConfig {
        ImageUrlConfig {
            endpoint: "https://img.example.com/prompt/".to_string(),
            fallback_url: "https://placehold.example.com/none".to_string(),
            width: 640,
            height: 480,
            model: "flux".to_string(),
            prompt_words: 5,
            style_suffix: "children's book illustration".to_string(),
            default_seed: 1234,
        }
    }

    #[test]
    fn test_sanitize_strips_punctuation_and_truncates() {
        let words = sanitize_prompt("A brave, little fox -- sails across the sea!", 5);
        assert_eq!(words.as_deref(), Some("A brave little fox sails"));
    }

    #[test]
    fn test_sanitize_keeps_non_ascii_letters() {
        let words = sanitize_prompt("Kāli the café cat!", 10);
        assert_eq!(words.as_deref(), Some("Kāli the café cat"));
    }

    #[test]
    fn test_sanitize_rejects_symbol_only_prompt() {
        assert_eq!(sanitize_prompt("   ?!, ... ", 5), None);
    }

    #[test]
    fn test_empty_prompt_uses_fallback() {
        let cfg = config();
        assert_eq!(build_image_url(&cfg, None, Some(7), 0), cfg.fallback_url);
        assert_eq!(build_image_url(&cfg, Some(""), Some(7), 0), cfg.fallback_url);
        assert_eq!(build_image_url(&cfg, Some("!!!"), Some(7), 3), cfg.fallback_url);
    }

    #[test]
    fn test_url_layout() {
        let url = build_image_url(&config(), Some("A dragon who loves tea"), Some(42), 0);
        assert_eq!(
            url,
            "https://img.example.com/prompt/A%20dragon%20who%20loves%20tea%20children%27s%20book%20illustration?width=640&height=480&seed=42&nologo=true&model=flux&retry=0"
        );
    }

    #[test]
    fn test_missing_seed_uses_default() {
        let url = build_image_url(&config(), Some("moon"), None, 0);
        assert!(url.contains("seed=1234"));
    }

    #[test]
    fn test_same_inputs_same_url_and_retry_changes_it() {
        let cfg = config();
        let a = build_image_url(&cfg, Some("the owl and the stars"), Some(99), 1);
        let b = build_image_url(&cfg, Some("the owl and the stars"), Some(99), 1);
        let c = build_image_url(&cfg, Some("the owl and the stars"), Some(99), 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(c.ends_with("retry=2"));
    }
}
