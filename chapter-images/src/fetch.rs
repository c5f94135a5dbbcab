//! Retrieval of generated images.
//!
//! The queue driver is generic over [`ImageFetcher`]; the HTTP
//! implementation lives behind the `fetch` feature.

use std::future::Future;

/// Result type for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors that can occur while fetching an image
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    Network(String),
    Status(u16),
    Empty,
    NotAnImage,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(e) => write!(f, "Network error: {}", e),
            FetchError::Status(code) => write!(f, "Image service returned HTTP {}", code),
            FetchError::Empty => write!(f, "Image service returned an empty body"),
            FetchError::NotAnImage => write!(f, "Image service returned something that is not an image"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Something that turns an image URL into displayable image data
pub trait ImageFetcher {
    /// Resolves to a URL the UI can put in an `img` tag (usually a `data:` URL)
    fn fetch(&self, url: &str) -> impl Future<Output = FetchResult<String>>;
}

#[cfg(feature = "fetch")]
/// Downloads images over HTTP and inlines them as `data:` URLs
#[derive(Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

#[cfg(feature = "fetch")]
impl HttpImageFetcher {
    /// No overall request timeout: the load tracker's bound governs
    pub fn new() -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .user_agent("Kathakalpana/0.1.0")
            .build()
            .map_err(|e| FetchError::Network(format!("Client build failed: {}", e)))?;
        Ok(Self { client })
    }
}

#[cfg(feature = "fetch")]
impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[cfg(feature = "fetch")]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        log::debug!("Fetching illustration {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(format!("Failed to read body: {}", e)))?;

        to_data_url(&bytes)
    }
}

#[cfg(feature = "fetch")]
/// Sniffs the image format and encodes the bytes as a `data:` URL
pub fn to_data_url(bytes: &[u8]) -> FetchResult<String> {
    use base64::{engine::general_purpose, Engine as _};

    if bytes.is_empty() {
        return Err(FetchError::Empty);
    }
    let format = image::guess_format(bytes).map_err(|_| FetchError::NotAnImage)?;
    let encoded = general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{};base64,{}", format.to_mime_type(), encoded))
}

#[cfg(all(test, feature = "fetch"))]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_png_becomes_data_url() {
        let url = to_data_url(PNG_HEADER).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_html_error_page_is_rejected() {
        let result = to_data_url(b"<html><body>rate limited</body></html>");
        assert_eq!(result, Err(FetchError::NotAnImage));
    }

    #[test]
    fn test_empty_body_is_rejected() {
        assert_eq!(to_data_url(&[]), Err(FetchError::Empty));
    }
}
