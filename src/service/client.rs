//! Thumbnail generation and region edits on top of an [`ImageService`].

use crate::editor::marker;
use crate::error::{Result, ServiceAction, ThumbError};
use crate::service::provider::{ImageService, ImageServiceExt, InlineImage, ServiceRequest};
use crate::thumbnail::prompt::{edit_prompt, generation_prompt};
use crate::thumbnail::{EditRequest, GeneratedImage, SourcePhoto, ThumbnailConfig};

/// Turns thumbnail configs and edit requests into service calls.
///
/// Every service failure comes back wrapped in
/// [`ThumbError::ServiceRequest`] with the "Failed to generate thumbnail" /
/// "Failed to edit thumbnail" prefix. Images that cannot be decoded locally
/// fail with [`ThumbError::ImageDecode`] before anything is sent.
pub struct ThumbnailClient<S> {
    service: S,
    max_retries: u32,
}

impl<S: ImageService> ThumbnailClient<S> {
    /// Wraps a service. Transient failures are not retried by default.
    pub fn new(service: S) -> Self {
        Self {
            service,
            max_retries: 0,
        }
    }

    /// Retries rate limits and network errors up to `max_retries` times.
    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// The underlying service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Generates a thumbnail from a photo.
    pub async fn generate(
        &self,
        photo: &SourcePhoto,
        config: &ThumbnailConfig,
    ) -> Result<GeneratedImage> {
        config.validate()?;
        let request = ServiceRequest::new(
            InlineImage::new(photo.format.mime_type(), photo.data.clone()),
            generation_prompt(config),
        )
        .with_aspect_ratio(config.aspect_ratio);

        tracing::debug!(
            service = self.service.name(),
            aspect_ratio = %config.aspect_ratio,
            "generating thumbnail"
        );
        self.call(&request, ServiceAction::Generate).await
    }

    /// Applies a region edit.
    ///
    /// The selection is stroked onto a copy of the image and the marked copy
    /// is what the service receives. Nothing is sent unless the selection
    /// overlaps the image.
    pub async fn edit(&self, request: &EditRequest) -> Result<GeneratedImage> {
        if request.instruction.trim().is_empty() {
            return Err(ThumbError::SubmitRejected("edit instruction is empty"));
        }
        if request.selection.is_empty() {
            return Err(ThumbError::SubmitRejected("no region selected"));
        }
        let marked = marker::encode_marked(&request.image, request.selection)?;
        let service_request = ServiceRequest::new(
            InlineImage::new(marker::MARKED_MIME_TYPE, marked),
            edit_prompt(&request.instruction),
        );

        tracing::debug!(
            service = self.service.name(),
            x = request.selection.x,
            y = request.selection.y,
            width = request.selection.width,
            height = request.selection.height,
            "editing thumbnail region"
        );
        self.call(&service_request, ServiceAction::Edit).await
    }

    async fn call(
        &self,
        request: &ServiceRequest,
        action: ServiceAction,
    ) -> Result<GeneratedImage> {
        self.service
            .generate_with_retries(request, self.max_retries)
            .await
            .map_err(|e| {
                tracing::warn!("{action}: {e}");
                e.for_action(action)
            })
    }
}
