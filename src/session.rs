//! Application workflow: photo → generation → review → region edits.
//!
//! The phase carries exactly the data that is valid in it, so states like
//! "editing without a generated image" cannot be expressed. Failures from
//! the service are recorded as one user-visible message and the session
//! falls back to the phase it came from, keeping the previous image.

use crate::editor::{SelectionEditor, SourceId};
use crate::error::{Result, ThumbError};
use crate::service::{ImageService, ThumbnailClient};
use crate::thumbnail::{EditRequest, GeneratedImage, SourcePhoto, ThumbnailConfig};

/// Observable workflow phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    /// No photo selected.
    Idle,
    /// Photo selected, no result yet.
    Configuring,
    /// Generation request in flight.
    Generating,
    /// A generated thumbnail is shown.
    Reviewing,
    /// Drawing a region to edit.
    Editing,
    /// Edit request in flight.
    EditSubmitting,
}

impl PhaseKind {
    /// Lower-case name used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Configuring => "configuring",
            Self::Generating => "generating",
            Self::Reviewing => "reviewing",
            Self::Editing => "editing",
            Self::EditSubmitting => "submitting an edit",
        }
    }
}

#[derive(Default)]
enum Phase {
    #[default]
    Idle,
    Configuring {
        photo: SourcePhoto,
    },
    Generating {
        photo: SourcePhoto,
    },
    Reviewing {
        photo: SourcePhoto,
        thumbnail: GeneratedImage,
    },
    Editing {
        photo: SourcePhoto,
        thumbnail: GeneratedImage,
        editor: Box<SelectionEditor>,
    },
    EditSubmitting {
        photo: SourcePhoto,
        thumbnail: GeneratedImage,
        editor: Box<SelectionEditor>,
    },
}

impl Phase {
    fn kind(&self) -> PhaseKind {
        match self {
            Self::Idle => PhaseKind::Idle,
            Self::Configuring { .. } => PhaseKind::Configuring,
            Self::Generating { .. } => PhaseKind::Generating,
            Self::Reviewing { .. } => PhaseKind::Reviewing,
            Self::Editing { .. } => PhaseKind::Editing,
            Self::EditSubmitting { .. } => PhaseKind::EditSubmitting,
        }
    }
}

/// A generation ready to be sent, returned by [`Session::start_generation`].
#[derive(Debug, Clone)]
pub struct GenerationJob {
    /// The photo to build on.
    pub photo: SourcePhoto,
    /// The configuration at the time generation started.
    pub config: ThumbnailConfig,
}

/// One user's thumbnail workflow.
pub struct Session<S> {
    client: ThumbnailClient<S>,
    phase: Phase,
    error: Option<String>,
    next_source: u64,
}

impl<S: ImageService> Session<S> {
    /// Creates an idle session.
    pub fn new(client: ThumbnailClient<S>) -> Self {
        Self {
            client,
            phase: Phase::Idle,
            error: None,
            next_source: 0,
        }
    }

    /// The client used for service calls.
    pub fn client(&self) -> &ThumbnailClient<S> {
        &self.client
    }

    /// Current phase.
    pub fn phase(&self) -> PhaseKind {
        self.phase.kind()
    }

    /// Last user-visible error, cleared when a new action starts.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The selected photo.
    pub fn photo(&self) -> Option<&SourcePhoto> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Configuring { photo }
            | Phase::Generating { photo }
            | Phase::Reviewing { photo, .. }
            | Phase::Editing { photo, .. }
            | Phase::EditSubmitting { photo, .. } => Some(photo),
        }
    }

    /// The current generated thumbnail.
    pub fn thumbnail(&self) -> Option<&GeneratedImage> {
        match &self.phase {
            Phase::Reviewing { thumbnail, .. }
            | Phase::Editing { thumbnail, .. }
            | Phase::EditSubmitting { thumbnail, .. } => Some(thumbnail),
            _ => None,
        }
    }

    /// The region editor, while editing or submitting an edit.
    pub fn editor(&self) -> Option<&SelectionEditor> {
        match &self.phase {
            Phase::Editing { editor, .. } | Phase::EditSubmitting { editor, .. } => Some(&**editor),
            _ => None,
        }
    }

    /// Mutable access to the region editor. Not available while an edit
    /// is in flight.
    pub fn editor_mut(&mut self) -> Option<&mut SelectionEditor> {
        match &mut self.phase {
            Phase::Editing { editor, .. } => Some(&mut **editor),
            _ => None,
        }
    }

    fn reject(&self, action: &'static str) -> ThumbError {
        ThumbError::InvalidTransition {
            action,
            phase: self.phase.kind().name(),
        }
    }

    /// Selects a new source photo, discarding any previous result.
    pub fn select_photo(&mut self, data: Vec<u8>) -> Result<()> {
        if !matches!(
            self.phase.kind(),
            PhaseKind::Idle | PhaseKind::Configuring | PhaseKind::Reviewing
        ) {
            return Err(self.reject("select a photo"));
        }
        let photo = SourcePhoto::from_bytes(data).map_err(|e| {
            self.error = Some(e.to_string());
            e
        })?;
        self.error = None;
        self.phase = Phase::Configuring { photo };
        Ok(())
    }

    /// Removes the photo and any result.
    pub fn clear_photo(&mut self) -> Result<()> {
        if !matches!(
            self.phase.kind(),
            PhaseKind::Idle | PhaseKind::Configuring | PhaseKind::Reviewing
        ) {
            return Err(self.reject("clear the photo"));
        }
        self.error = None;
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Moves to [`PhaseKind::Generating`] and returns what to send.
    ///
    /// Any previous thumbnail is dropped.
    pub fn start_generation(&mut self, config: &ThumbnailConfig) -> Result<GenerationJob> {
        if !matches!(
            self.phase.kind(),
            PhaseKind::Configuring | PhaseKind::Reviewing
        ) {
            return Err(self.reject("generate"));
        }
        if let Err(e) = config.validate() {
            self.error = Some(e.to_string());
            return Err(e);
        }
        let photo = match std::mem::take(&mut self.phase) {
            Phase::Configuring { photo } | Phase::Reviewing { photo, .. } => photo,
            other => {
                self.phase = other;
                return Err(self.reject("generate"));
            }
        };
        self.error = None;
        self.phase = Phase::Generating {
            photo: photo.clone(),
        };
        Ok(GenerationJob {
            photo,
            config: config.clone(),
        })
    }

    /// Records the outcome of a generation started with
    /// [`start_generation`](Self::start_generation).
    pub fn finish_generation(&mut self, outcome: Result<GeneratedImage>) -> Result<()> {
        let photo = match std::mem::take(&mut self.phase) {
            Phase::Generating { photo } => photo,
            other => {
                self.phase = other;
                return Err(self.reject("finish generating"));
            }
        };
        match outcome {
            Ok(thumbnail) => {
                tracing::debug!(bytes = thumbnail.size(), "thumbnail generated");
                self.phase = Phase::Reviewing { photo, thumbnail };
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.phase = Phase::Configuring { photo };
                Err(e)
            }
        }
    }

    /// Generates a thumbnail for the selected photo.
    pub async fn generate(&mut self, config: &ThumbnailConfig) -> Result<()> {
        let job = self.start_generation(config)?;
        let outcome = self.client.generate(&job.photo, &job.config).await;
        self.finish_generation(outcome)
    }

    /// Opens the region editor on the current thumbnail.
    pub fn enter_edit(&mut self) -> Result<()> {
        let (photo, thumbnail) = match std::mem::take(&mut self.phase) {
            Phase::Reviewing { photo, thumbnail } => (photo, thumbnail),
            other => {
                self.phase = other;
                return Err(self.reject("edit"));
            }
        };

        self.next_source += 1;
        let mut editor = Box::new(SelectionEditor::new());
        let ticket = editor.request_load(SourceId::new(self.next_source));
        match editor.complete_load(ticket, &thumbnail.data) {
            Ok(_) => {
                self.error = None;
                self.phase = Phase::Editing {
                    photo,
                    thumbnail,
                    editor,
                };
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.phase = Phase::Reviewing { photo, thumbnail };
                Err(e)
            }
        }
    }

    /// Leaves the region editor without submitting.
    pub fn cancel_edit(&mut self) -> Result<()> {
        match std::mem::take(&mut self.phase) {
            Phase::Editing {
                photo, thumbnail, ..
            } => {
                self.phase = Phase::Reviewing { photo, thumbnail };
                Ok(())
            }
            other => {
                self.phase = other;
                Err(self.reject("cancel editing"))
            }
        }
    }

    /// Moves to [`PhaseKind::EditSubmitting`] and returns the request to
    /// send. Rejected, with nothing changed, unless a region is selected and
    /// an instruction entered.
    pub fn start_edit(&mut self) -> Result<EditRequest> {
        let request = match &self.phase {
            Phase::Editing {
                thumbnail, editor, ..
            } => editor.edit_request(&thumbnail.data)?,
            _ => return Err(self.reject("submit an edit")),
        };
        let (photo, thumbnail, mut editor) = match std::mem::take(&mut self.phase) {
            Phase::Editing {
                photo,
                thumbnail,
                editor,
            } => (photo, thumbnail, editor),
            other => {
                self.phase = other;
                return Err(self.reject("submit an edit"));
            }
        };
        editor.set_busy(true);
        self.error = None;
        self.phase = Phase::EditSubmitting {
            photo,
            thumbnail,
            editor,
        };
        Ok(request)
    }

    /// Records the outcome of an edit started with
    /// [`start_edit`](Self::start_edit).
    ///
    /// Success replaces the thumbnail and leaves edit mode. Failure keeps
    /// the previous thumbnail and selection so the user can retry.
    pub fn finish_edit(&mut self, outcome: Result<GeneratedImage>) -> Result<()> {
        let (photo, thumbnail, mut editor) = match std::mem::take(&mut self.phase) {
            Phase::EditSubmitting {
                photo,
                thumbnail,
                editor,
            } => (photo, thumbnail, editor),
            other => {
                self.phase = other;
                return Err(self.reject("finish editing"));
            }
        };
        match outcome {
            Ok(edited) => {
                tracing::debug!(bytes = edited.size(), "thumbnail edited");
                self.phase = Phase::Reviewing {
                    photo,
                    thumbnail: edited,
                };
                Ok(())
            }
            Err(e) => {
                editor.set_busy(false);
                self.error = Some(e.to_string());
                self.phase = Phase::Editing {
                    photo,
                    thumbnail,
                    editor,
                };
                Err(e)
            }
        }
    }

    /// Submits the current selection and instruction.
    pub async fn submit_edit(&mut self) -> Result<()> {
        let request = self.start_edit()?;
        let outcome = self.client.edit(&request).await;
        self.finish_edit(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{DisplayRect, Point, Selection};
    use crate::service::testing::{FakeService, Reply};
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32, shade: u8) -> Vec<u8> {
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([shade, shade, shade, 255]),
        ))
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
        out
    }

    fn session(replies: impl IntoIterator<Item = Reply>) -> Session<FakeService> {
        Session::new(ThumbnailClient::new(FakeService::with_replies(replies)))
    }

    fn config() -> ThumbnailConfig {
        ThumbnailConfig::new("YOU WON'T BELIEVE THIS")
    }

    async fn reviewing(replies: impl IntoIterator<Item = Reply>) -> Session<FakeService> {
        let mut replies: Vec<Reply> = replies.into_iter().collect();
        replies.insert(0, Reply::Image(png(200, 100, 80)));
        let mut s = session(replies);
        s.select_photo(png(64, 64, 10)).unwrap();
        s.generate(&config()).await.unwrap();
        s
    }

    fn select_region(s: &mut Session<FakeService>, instruction: &str) {
        let display = DisplayRect::new(0.0, 0.0, 100.0, 50.0);
        let editor = s.editor_mut().unwrap();
        editor.pointer_down(Point::new(5.0, 5.0), display);
        editor.pointer_move(Point::new(30.0, 20.0), display);
        editor.pointer_up();
        editor.set_instruction(instruction);
    }

    #[tokio::test]
    async fn test_generate_happy_path() {
        let mut s = session([Reply::Image(png(16, 9, 1))]);
        assert_eq!(s.phase(), PhaseKind::Idle);

        s.select_photo(png(8, 8, 0)).unwrap();
        assert_eq!(s.phase(), PhaseKind::Configuring);

        s.generate(&config()).await.unwrap();
        assert_eq!(s.phase(), PhaseKind::Reviewing);
        assert!(s.thumbnail().is_some());
        assert_eq!(s.error(), None);
    }

    #[tokio::test]
    async fn test_generate_failure_returns_to_configuring() {
        let mut s = session([Reply::Status(500, "boom")]);
        s.select_photo(png(8, 8, 0)).unwrap();

        assert!(s.generate(&config()).await.is_err());
        assert_eq!(s.phase(), PhaseKind::Configuring);
        assert!(s.thumbnail().is_none());
        assert_eq!(
            s.error(),
            Some("Failed to generate thumbnail: API error: 500 - boom")
        );
    }

    #[tokio::test]
    async fn test_generate_requires_photo_and_text() {
        let mut s = session([]);
        assert!(matches!(
            s.generate(&config()).await,
            Err(ThumbError::InvalidTransition { .. })
        ));

        s.select_photo(png(8, 8, 0)).unwrap();
        assert!(s.generate(&ThumbnailConfig::new(" ")).await.is_err());
        assert_eq!(s.phase(), PhaseKind::Configuring);
        assert!(s.client().service().requests().is_empty());
    }

    #[test]
    fn test_non_image_upload_is_refused() {
        let mut s = session([]);
        assert!(s
            .select_photo(b"just some text, not a picture".to_vec())
            .is_err());
        assert_eq!(s.phase(), PhaseKind::Idle);
        assert!(s.error().is_some());
    }

    #[test]
    fn test_split_generation_exposes_in_flight_phase() {
        let mut s = session([]);
        s.select_photo(png(8, 8, 0)).unwrap();

        let job = s.start_generation(&config()).unwrap();
        assert_eq!(s.phase(), PhaseKind::Generating);
        assert!(matches!(
            s.select_photo(png(8, 8, 1)),
            Err(ThumbError::InvalidTransition { .. })
        ));
        assert!(s.start_generation(&config()).is_err());

        s.finish_generation(Ok(GeneratedImage::new(
            job.photo.data,
            job.photo.format,
            Default::default(),
        )))
        .unwrap();
        assert_eq!(s.phase(), PhaseKind::Reviewing);
    }

    #[tokio::test]
    async fn test_regenerate_drops_previous_result() {
        let mut s = reviewing([]).await;
        s.start_generation(&config()).unwrap();
        assert!(s.thumbnail().is_none());
    }

    #[tokio::test]
    async fn test_edit_round_trip() {
        let edited = png(200, 100, 200);
        let mut s = reviewing([Reply::Image(edited.clone())]).await;

        s.enter_edit().unwrap();
        assert_eq!(s.phase(), PhaseKind::Editing);
        select_region(&mut s, "put a crown on it");
        assert_eq!(
            s.editor().unwrap().selection(),
            Some(Selection::new(10.0, 10.0, 50.0, 30.0))
        );

        s.submit_edit().await.unwrap();
        assert_eq!(s.phase(), PhaseKind::Reviewing);
        assert_eq!(s.thumbnail().unwrap().data, edited);

        let sent = s.client().service().requests();
        assert_eq!(sent.len(), 2);
        assert!(sent[1].prompt.contains("put a crown on it"));
    }

    #[tokio::test]
    async fn test_submit_without_selection_sends_nothing() {
        let mut s = reviewing([]).await;
        s.enter_edit().unwrap();
        s.editor_mut().unwrap().set_instruction("make it pop");

        assert!(matches!(s.submit_edit().await, Err(ThumbError::SubmitRejected(_))));
        assert_eq!(s.phase(), PhaseKind::Editing);
        assert_eq!(s.client().service().requests().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_without_instruction_sends_nothing() {
        let mut s = reviewing([]).await;
        s.enter_edit().unwrap();
        select_region(&mut s, "");

        assert!(s.submit_edit().await.is_err());
        assert_eq!(s.client().service().requests().len(), 1);
    }

    #[tokio::test]
    async fn test_edit_without_image_keeps_previous_thumbnail() {
        let mut s = reviewing([Reply::NoImage]).await;
        let before = s.thumbnail().unwrap().data.clone();

        s.enter_edit().unwrap();
        select_region(&mut s, "add fireworks");
        let err = s.submit_edit().await.unwrap_err();

        assert!(matches!(err.root(), ThumbError::NoImageInResponse));
        assert_eq!(s.phase(), PhaseKind::Editing);
        assert_eq!(s.thumbnail().unwrap().data, before);
        assert!(s.error().unwrap().starts_with("Failed to edit thumbnail:"));

        // selection survives and can be resubmitted
        let editor = s.editor().unwrap();
        assert!(!editor.is_busy());
        assert!(editor.can_submit());
    }

    #[tokio::test]
    async fn test_in_flight_edit_locks_editor() {
        let mut s = reviewing([]).await;
        s.enter_edit().unwrap();
        select_region(&mut s, "swap the shirt colour");

        let request = s.start_edit().unwrap();
        assert_eq!(request.instruction, "swap the shirt colour");
        assert_eq!(s.phase(), PhaseKind::EditSubmitting);
        assert!(s.editor_mut().is_none());
        assert!(s.editor().unwrap().is_busy());
        assert!(s.cancel_edit().is_err());
        assert!(s.start_edit().is_err());
        assert_eq!(s.phase(), PhaseKind::EditSubmitting);
    }

    #[tokio::test]
    async fn test_cancel_edit_returns_to_review() {
        let mut s = reviewing([]).await;
        s.enter_edit().unwrap();
        s.cancel_edit().unwrap();
        assert_eq!(s.phase(), PhaseKind::Reviewing);
        assert!(s.editor().is_none());
    }

    #[tokio::test]
    async fn test_edit_requires_a_thumbnail() {
        let mut s = session([]);
        assert!(s.enter_edit().is_err());
        assert_eq!(s.phase(), PhaseKind::Idle);

        s.select_photo(png(8, 8, 0)).unwrap();
        assert!(s.enter_edit().is_err());
        assert_eq!(s.phase(), PhaseKind::Configuring);
    }

    #[tokio::test]
    async fn test_undecodable_thumbnail_cannot_be_edited() {
        let mut s = session([Reply::Image(b"not really an image".to_vec())]);
        s.select_photo(png(8, 8, 0)).unwrap();
        s.generate(&config()).await.unwrap();

        let err = s.enter_edit().unwrap_err();
        assert!(matches!(err, ThumbError::ImageDecode(_)));
        assert_eq!(s.phase(), PhaseKind::Reviewing);
    }

    #[tokio::test]
    async fn test_new_photo_resets_result() {
        let mut s = reviewing([]).await;
        s.select_photo(png(8, 8, 99)).unwrap();
        assert_eq!(s.phase(), PhaseKind::Configuring);
        assert!(s.thumbnail().is_none());
    }
}
