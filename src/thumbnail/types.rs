//! Thumbnail configuration and image payload types.

use crate::editor::Selection;
use crate::error::{Result, ThumbError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Maps a MIME type reported by the service.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Output aspect ratios the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 16:9, YouTube.
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16, Shorts/TikTok.
    #[serde(rename = "9:16")]
    Portrait,
    /// 1:1.
    #[serde(rename = "1:1")]
    Square,
    /// 4:3.
    #[serde(rename = "4:3")]
    Classic,
}

impl AspectRatio {
    /// Every supported ratio, in display order.
    pub const ALL: [Self; 4] = [Self::Landscape, Self::Portrait, Self::Square, Self::Classic];

    /// Wire form, e.g. `"16:9"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Square => "1:1",
            Self::Classic => "4:3",
        }
    }

    /// Where this ratio is typically used.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Landscape => "YouTube",
            Self::Portrait => "Shorts/TikTok",
            Self::Square => "Square",
            Self::Classic => "Classic",
        }
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = ThumbError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| ThumbError::InvalidRequest(format!("unsupported aspect ratio: {s}")))
    }
}

/// Look of the overlay text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextStyle {
    /// Big, bold Impact lettering.
    #[default]
    BoldImpact,
    /// Neon / cyberpunk glow.
    NeonGlowing,
    /// Comic / pop art.
    ComicBook,
    /// Shiny 3D gold.
    Gold3d,
    /// Clean minimalist type.
    Minimalist,
    /// Glitch effect.
    Glitch,
}

impl TextStyle {
    /// Every style, in display order.
    pub const ALL: [Self; 6] = [
        Self::BoldImpact,
        Self::NeonGlowing,
        Self::ComicBook,
        Self::Gold3d,
        Self::Minimalist,
        Self::Glitch,
    ];

    /// Descriptor embedded in the prompt.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BoldImpact => "Bold Impact",
            Self::NeonGlowing => "Neon Glowing",
            Self::ComicBook => "Comic Book",
            Self::Gold3d => "3D Gold",
            Self::Minimalist => "Minimalist",
            Self::Glitch => "Glitch",
        }
    }

    /// Human-friendly name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BoldImpact => "Big & Bold (Impact)",
            Self::NeonGlowing => "Neon / Cyberpunk",
            Self::ComicBook => "Comic / Pop Art",
            Self::Gold3d => "Shiny 3D Gold",
            Self::Minimalist => "Clean Minimalist",
            Self::Glitch => "Glitch Effect",
        }
    }
}

impl std::fmt::Display for TextStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Facial expression asked of the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Expression {
    /// Wide eyes, open mouth.
    #[default]
    Shocked,
    /// Big grin.
    Happy,
    /// Furious.
    Angry,
    /// Raised eyebrow.
    Suspicious,
    /// In tears.
    Crying,
    /// Starstruck.
    Excited,
}

impl Expression {
    /// Every expression, in display order.
    pub const ALL: [Self; 6] = [
        Self::Shocked,
        Self::Happy,
        Self::Angry,
        Self::Suspicious,
        Self::Crying,
        Self::Excited,
    ];

    /// Descriptor embedded in the prompt.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shocked => "Shocked",
            Self::Happy => "Happy",
            Self::Angry => "Angry",
            Self::Suspicious => "Suspicious",
            Self::Crying => "Crying",
            Self::Excited => "Excited",
        }
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canned visual-style descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePreset {
    /// Saturated gaming look.
    Gaming,
    /// Bright, airy vlog look.
    Vlog,
    /// Sleek studio tech look.
    Tech,
    /// Film-graded movie look.
    Cinematic,
}

impl StylePreset {
    /// Every preset, in display order.
    pub const ALL: [Self; 4] = [Self::Gaming, Self::Vlog, Self::Tech, Self::Cinematic];

    /// Short name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gaming => "Gaming",
            Self::Vlog => "Vlog",
            Self::Tech => "Tech",
            Self::Cinematic => "Movie",
        }
    }

    /// Visual style text this preset fills in.
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Gaming => "High contrast gaming aesthetic, saturated colors, speed lines, glowing effects, 4k detailed.",
            Self::Vlog => "Bright, airy, high key lighting, vibrant natural colors, cozy atmosphere, bokeh background.",
            Self::Tech => "Sleek, modern, metallic textures, cool blue lighting, sharp focus, professional studio look.",
            Self::Cinematic => "Cinematic lighting, dramatic shadows, teal and orange color grading, film grain, realistic texture.",
        }
    }
}

/// Fallback used when no action is given.
pub const DEFAULT_ACTION: &str = "Posing for a thumbnail";
/// Fallback used when no background is given.
pub const DEFAULT_BACKGROUND: &str = "A cool abstract background";
/// Fallback used when no visual style is given.
pub const DEFAULT_VISUAL_STYLE: &str = "High quality viral YouTube style";

/// Everything the user configured for a generation.
///
/// Free-text fields left unset (or blank) fall back to fixed phrases when
/// the prompt is composed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Text rendered on the thumbnail. Required.
    pub overlay_text: String,
    /// Look of the overlay text.
    pub text_style: TextStyle,
    /// Facial expression of the subject.
    pub expression: Expression,
    /// What the subject is doing.
    pub action: Option<String>,
    /// Scene behind the subject.
    pub background: Option<String>,
    /// Overall visual style.
    pub visual_style: Option<String>,
    /// Output aspect ratio.
    pub aspect_ratio: AspectRatio,
}

impl ThumbnailConfig {
    /// Creates a config with the given overlay text and defaults elsewhere.
    pub fn new(overlay_text: impl Into<String>) -> Self {
        Self {
            overlay_text: overlay_text.into(),
            ..Self::default()
        }
    }

    /// Sets the text style.
    pub fn with_text_style(mut self, style: TextStyle) -> Self {
        self.text_style = style;
        self
    }

    /// Sets the facial expression.
    pub fn with_expression(mut self, expression: Expression) -> Self {
        self.expression = expression;
        self
    }

    /// Sets the subject's action.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Sets the background description.
    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    /// Sets the visual style description.
    pub fn with_visual_style(mut self, style: impl Into<String>) -> Self {
        self.visual_style = Some(style.into());
        self
    }

    /// Fills the visual style from a preset.
    pub fn with_preset(self, preset: StylePreset) -> Self {
        self.with_visual_style(preset.prompt())
    }

    /// Sets the aspect ratio.
    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Action, or its fallback.
    pub fn action_or_default(&self) -> &str {
        non_blank(&self.action).unwrap_or(DEFAULT_ACTION)
    }

    /// Background, or its fallback.
    pub fn background_or_default(&self) -> &str {
        non_blank(&self.background).unwrap_or(DEFAULT_BACKGROUND)
    }

    /// Visual style, or its fallback.
    pub fn visual_style_or_default(&self) -> &str {
        non_blank(&self.visual_style).unwrap_or(DEFAULT_VISUAL_STYLE)
    }

    /// Checks the config is complete enough to generate from.
    pub fn validate(&self) -> Result<()> {
        if self.overlay_text.trim().is_empty() {
            return Err(ThumbError::InvalidRequest("overlay text is required".into()));
        }
        Ok(())
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// The user's uploaded photo.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePhoto {
    /// Encoded image bytes.
    pub data: Vec<u8>,
    /// Format detected from the bytes.
    pub format: ImageFormat,
}

impl SourcePhoto {
    /// Accepts `data` if it looks like a supported image.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let format = ImageFormat::from_magic_bytes(&data).ok_or_else(|| {
            ThumbError::InvalidRequest("source file is not a PNG, JPEG or WebP image".into())
        })?;
        Ok(Self { data, format })
    }

    /// Reads and validates a photo from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_bytes(std::fs::read(path)?)
    }
}

/// A region edit to submit for an existing thumbnail.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest {
    /// Encoded bytes of the image being edited, unmarked.
    pub image: Vec<u8>,
    /// What should change inside the selection.
    pub instruction: String,
    /// Region to edit, in image pixels.
    pub selection: Selection,
}

impl EditRequest {
    /// Creates a new edit request.
    pub fn new(image: Vec<u8>, instruction: impl Into<String>, selection: Selection) -> Self {
        Self {
            image,
            instruction: instruction.into(),
            selection,
        }
    }
}

/// Metadata about the generation process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Round-trip duration in milliseconds.
    pub duration_ms: Option<u64>,
}

/// A generated image with its data and metadata.
#[derive(Debug, Clone)]
#[must_use = "generated image should be saved or processed"]
pub struct GeneratedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Image format.
    pub format: ImageFormat,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

impl GeneratedImage {
    /// Creates a new generated image.
    pub fn new(data: Vec<u8>, format: ImageFormat, metadata: GenerationMetadata) -> Self {
        Self {
            data,
            format,
            metadata,
        }
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    /// Encodes the image data as base64.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the image as a data URL.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            self.to_base64()
        )
    }

    /// Suggested file name for saving, stamped with the current time.
    pub fn download_file_name(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        format!("thumbsnap-generated-{millis}.{}", self.format.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
    const WEBP_MAGIC: [u8; 12] = *b"RIFF\x00\x00\x00\x00WEBP";

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&PNG_MAGIC),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&JPEG_MAGIC),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&WEBP_MAGIC),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a......"), None);
    }

    #[test]
    fn test_format_from_mime_type() {
        assert_eq!(
            ImageFormat::from_mime_type("image/PNG"),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_mime_type("image/jpeg"),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::from_mime_type("text/plain"), None);
    }

    #[test]
    fn test_aspect_ratio_parse() {
        for ratio in AspectRatio::ALL {
            assert_eq!(ratio.as_str().parse::<AspectRatio>().unwrap(), ratio);
        }
        assert!("21:9".parse::<AspectRatio>().is_err());
        assert_eq!(AspectRatio::default(), AspectRatio::Landscape);
    }

    #[test]
    fn test_aspect_ratio_serde_uses_wire_form() {
        let json = serde_json::to_string(&AspectRatio::Portrait).unwrap();
        assert_eq!(json, "\"9:16\"");
    }

    #[test]
    fn test_config_defaults_and_fallbacks() {
        let config = ThumbnailConfig::new("WOW");
        assert_eq!(config.text_style, TextStyle::BoldImpact);
        assert_eq!(config.expression, Expression::Shocked);
        assert_eq!(config.action_or_default(), DEFAULT_ACTION);
        assert_eq!(config.background_or_default(), DEFAULT_BACKGROUND);
        assert_eq!(config.visual_style_or_default(), DEFAULT_VISUAL_STYLE);

        let config = config
            .with_background("   ")
            .with_action("Pointing at a laptop");
        assert_eq!(config.background_or_default(), DEFAULT_BACKGROUND);
        assert_eq!(config.action_or_default(), "Pointing at a laptop");
    }

    #[test]
    fn test_preset_fills_visual_style() {
        let config = ThumbnailConfig::new("GG").with_preset(StylePreset::Gaming);
        assert!(config
            .visual_style_or_default()
            .starts_with("High contrast gaming"));
    }

    #[test]
    fn test_config_requires_overlay_text() {
        assert!(ThumbnailConfig::new("  ").validate().is_err());
        assert!(ThumbnailConfig::new("I QUIT").validate().is_ok());
    }

    #[test]
    fn test_source_photo_rejects_non_images() {
        assert!(SourcePhoto::from_bytes(PNG_MAGIC.to_vec()).is_ok());
        let err = SourcePhoto::from_bytes(b"%PDF-1.7 not an image".to_vec())
            .unwrap_err();
        assert!(matches!(err, ThumbError::InvalidRequest(_)));
    }

    #[test]
    fn test_generated_image_helpers() {
        let image = GeneratedImage::new(
            vec![1, 2, 3],
            ImageFormat::Png,
            GenerationMetadata::default(),
        );
        assert_eq!(image.to_data_url(), "data:image/png;base64,AQID");
        let name = image.download_file_name();
        assert!(name.starts_with("thumbsnap-generated-"));
        assert!(name.ends_with(".png"));
    }
}
