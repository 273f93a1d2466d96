//! The external generation service boundary.

mod client;
#[cfg(feature = "gemini")]
mod gemini;
mod provider;

pub use client::ThumbnailClient;
#[cfg(feature = "gemini")]
pub use gemini::{GeminiModel, GeminiService, GeminiServiceBuilder, API_KEY_ENV_VARS};
pub use provider::{ImageService, ImageServiceExt, InlineImage, ServiceRequest};

#[cfg(test)]
pub(crate) use provider::testing;
