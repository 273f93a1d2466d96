#![warn(missing_docs)]
//! ThumbSnap - stylised video thumbnails from a single photo.
//!
//! A photo and a handful of style choices become a generated thumbnail.
//! Regions of that thumbnail can then be refined: the user drags a box over
//! the displayed image, types an instruction, and the box is burned into a
//! copy of the image as a red outline so the service knows where to apply it.
//!
//! # Quick Start
//!
//! ```no_run
//! use thumbsnap::{GeminiService, SourcePhoto, ThumbnailClient, ThumbnailConfig};
//!
//! #[tokio::main]
//! async fn main() -> thumbsnap::Result<()> {
//!     let client = ThumbnailClient::new(GeminiService::builder().build()?);
//!     let photo = SourcePhoto::open("me.jpg")?;
//!     let config = ThumbnailConfig::new("I QUIT MY JOB");
//!     let thumbnail = client.generate(&photo, &config).await?;
//!     thumbnail.save(thumbnail.download_file_name())?;
//!     Ok(())
//! }
//! ```
//!
//! # Region edits
//!
//! ```no_run
//! use thumbsnap::editor::{DisplayRect, Point, SelectionEditor, SourceId};
//! # fn demo(thumbnail: &[u8]) -> thumbsnap::Result<()> {
//! let mut editor = SelectionEditor::new();
//! let ticket = editor.request_load(SourceId::of_bytes(thumbnail));
//! editor.complete_load(ticket, thumbnail)?;
//!
//! // pointer positions are in display space; the editor maps them to pixels
//! let display = DisplayRect::new(0.0, 0.0, 640.0, 360.0);
//! editor.pointer_down(Point::new(100.0, 50.0), display);
//! editor.pointer_move(Point::new(300.0, 200.0), display);
//! editor.pointer_up();
//! editor.set_instruction("give him sunglasses");
//!
//! let request = editor.edit_request(thumbnail)?;
//! # let _ = request;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `gemini`: Gemini image service (default)
//! - `cli`: Command-line interface (default)

mod error;

pub mod editor;
pub mod service;
pub mod session;
pub mod thumbnail;

// Re-export error types at crate root
pub use error::{Result, ServiceAction, ThumbError};

pub use editor::{Selection, SelectionEditor};
pub use service::{ImageService, ImageServiceExt, ServiceRequest, ThumbnailClient};
pub use session::{PhaseKind, Session};
pub use thumbnail::{
    AspectRatio, EditRequest, Expression, GeneratedImage, GenerationMetadata, ImageFormat,
    SourcePhoto, StylePreset, TextStyle, ThumbnailConfig,
};

#[cfg(feature = "gemini")]
pub use service::{GeminiModel, GeminiService, GeminiServiceBuilder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::editor::{DisplayRect, Point, Selection, SelectionEditor};
    pub use crate::error::{Result, ThumbError};
    pub use crate::service::{ImageService, ImageServiceExt, ThumbnailClient};
    pub use crate::session::Session;
    pub use crate::thumbnail::{EditRequest, GeneratedImage, SourcePhoto, ThumbnailConfig};

    #[cfg(feature = "gemini")]
    pub use crate::service::GeminiService;
}
