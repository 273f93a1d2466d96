//! Image service trait and utilities.

use crate::error::Result;
use crate::thumbnail::{AspectRatio, GeneratedImage};
use async_trait::async_trait;

/// An image sent inline with a request.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    /// MIME type of `data`.
    pub mime_type: String,
    /// Encoded image bytes.
    pub data: Vec<u8>,
}

impl InlineImage {
    /// Creates an inline image.
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }
}

/// One call to the generation service: an input image plus instructions.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRequest {
    /// Input image the instructions refer to.
    pub image: InlineImage,
    /// Natural-language instructions.
    pub prompt: String,
    /// Requested output aspect ratio, if any.
    pub aspect_ratio: Option<AspectRatio>,
}

impl ServiceRequest {
    /// Creates a request with no aspect ratio preference.
    pub fn new(image: InlineImage, prompt: impl Into<String>) -> Self {
        Self {
            image,
            prompt: prompt.into(),
            aspect_ratio: None,
        }
    }

    /// Sets the output aspect ratio.
    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(ratio);
        self
    }
}

/// An external image-synthesis service.
///
/// Implementations return exactly one image per call, or
/// [`ThumbError::NoImageInResponse`](crate::ThumbError::NoImageInResponse)
/// when the service answered without one.
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Sends one request and returns the produced image.
    async fn generate(&self, request: &ServiceRequest) -> Result<GeneratedImage>;

    /// Returns the name of this service for display.
    fn name(&self) -> &str;

    /// Checks if the service is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}

/// Extension trait for services with retry logic.
#[async_trait]
pub trait ImageServiceExt: ImageService {
    /// Generates with automatic retries on transient failures.
    async fn generate_with_retries(
        &self,
        request: &ServiceRequest,
        max_retries: u32,
    ) -> Result<GeneratedImage> {
        let mut attempt = 0;
        loop {
            match self.generate(request).await {
                Ok(image) => return Ok(image),
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    attempt += 1;
                    let delay = e.retry_after().unwrap_or(std::time::Duration::from_secs(1));
                    tracing::warn!(
                        attempt,
                        max_retries,
                        delay_ms = delay.as_millis(),
                        "retrying after transient error: {e}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl<T: ImageService> ImageServiceExt for T {}
