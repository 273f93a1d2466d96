//! Thumbnail configuration, prompts and image payloads.

pub mod prompt;
mod types;

pub use types::{
    AspectRatio, EditRequest, Expression, GeneratedImage, GenerationMetadata, ImageFormat,
    SourcePhoto, StylePreset, TextStyle, ThumbnailConfig, DEFAULT_ACTION, DEFAULT_BACKGROUND,
    DEFAULT_VISUAL_STYLE,
};
