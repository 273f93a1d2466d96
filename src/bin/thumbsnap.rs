//! CLI for ThumbSnap - AI thumbnails with region edits.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use thumbsnap::editor::{marker, DisplayRect, Point, SelectionEditor, SourceId};
use thumbsnap::{
    AspectRatio, Expression, GeminiModel, GeminiService, GeneratedImage, Selection, SourcePhoto,
    StylePreset, TextStyle, ThumbnailClient, ThumbnailConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "thumbsnap")]
#[command(about = "Turn a photo into a click-worthy thumbnail, then fix regions of it")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a thumbnail from a photo
    Generate(GenerateArgs),

    /// Edit a region of an existing thumbnail
    Edit(EditArgs),

    /// Write the marked image an edit would send, without calling the service
    Mark(MarkArgs),

    /// List text styles, expressions, aspect ratios and presets
    Styles,
}

#[derive(Args)]
struct ServiceArgs {
    /// Gemini model to use
    #[arg(short, long, value_enum, default_value = "nano-banana")]
    model: ModelArg,

    /// Retries on rate limits and network errors
    #[arg(long, default_value_t = 2)]
    retries: u32,
}

#[derive(Args)]
struct GenerateArgs {
    /// Source photo (PNG, JPEG or WebP)
    photo: PathBuf,

    /// Text rendered on the thumbnail
    #[arg(short, long)]
    text: String,

    /// Look of the overlay text
    #[arg(long, value_enum, default_value = "bold-impact")]
    text_style: TextStyleArg,

    /// Facial expression of the subject
    #[arg(short, long, value_enum, default_value = "shocked")]
    expression: ExpressionArg,

    /// What the subject is doing
    #[arg(long)]
    action: Option<String>,

    /// Scene behind the subject
    #[arg(long)]
    background: Option<String>,

    /// Free-form visual style
    #[arg(long, conflicts_with = "preset")]
    style: Option<String>,

    /// Canned visual style
    #[arg(long, value_enum)]
    preset: Option<PresetArg>,

    /// Output aspect ratio
    #[arg(short, long, value_enum, default_value = "16:9")]
    aspect_ratio: AspectRatioArg,

    /// Output file path (defaults to a timestamped name)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    service: ServiceArgs,
}

#[derive(Args)]
struct RegionArgs {
    /// Region in image pixels: X,Y,WIDTH,HEIGHT
    #[arg(long, value_parser = parse_quad, conflicts_with = "drag")]
    region: Option<[f32; 4]>,

    /// Pointer drag in display coordinates: X0,Y0,X1,Y1
    #[arg(long, value_parser = parse_quad)]
    drag: Option<[f32; 4]>,

    /// Size the image was displayed at while dragging: WIDTH,HEIGHT
    /// (defaults to the image's own size)
    #[arg(long, value_parser = parse_pair, requires = "drag")]
    display: Option<(f32, f32)>,
}

#[derive(Args)]
struct EditArgs {
    /// Thumbnail to edit
    image: PathBuf,

    /// What should change inside the region
    #[arg(short, long)]
    instruction: String,

    #[command(flatten)]
    region: RegionArgs,

    /// Output file path (defaults to a timestamped name)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    service: ServiceArgs,
}

#[derive(Args)]
struct MarkArgs {
    /// Thumbnail to mark
    image: PathBuf,

    #[command(flatten)]
    region: RegionArgs,

    /// Output PNG path
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    NanoBanana,
    NanoBananaPro,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::NanoBanana => GeminiModel::NanoBanana,
            ModelArg::NanoBananaPro => GeminiModel::NanoBananaPro,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TextStyleArg {
    BoldImpact,
    Neon,
    Comic,
    Gold,
    Minimalist,
    Glitch,
}

impl From<TextStyleArg> for TextStyle {
    fn from(arg: TextStyleArg) -> Self {
        match arg {
            TextStyleArg::BoldImpact => TextStyle::BoldImpact,
            TextStyleArg::Neon => TextStyle::NeonGlowing,
            TextStyleArg::Comic => TextStyle::ComicBook,
            TextStyleArg::Gold => TextStyle::Gold3d,
            TextStyleArg::Minimalist => TextStyle::Minimalist,
            TextStyleArg::Glitch => TextStyle::Glitch,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExpressionArg {
    Shocked,
    Happy,
    Angry,
    Suspicious,
    Crying,
    Excited,
}

impl From<ExpressionArg> for Expression {
    fn from(arg: ExpressionArg) -> Self {
        match arg {
            ExpressionArg::Shocked => Expression::Shocked,
            ExpressionArg::Happy => Expression::Happy,
            ExpressionArg::Angry => Expression::Angry,
            ExpressionArg::Suspicious => Expression::Suspicious,
            ExpressionArg::Crying => Expression::Crying,
            ExpressionArg::Excited => Expression::Excited,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PresetArg {
    Gaming,
    Vlog,
    Tech,
    Cinematic,
}

impl From<PresetArg> for StylePreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Gaming => StylePreset::Gaming,
            PresetArg::Vlog => StylePreset::Vlog,
            PresetArg::Tech => StylePreset::Tech,
            PresetArg::Cinematic => StylePreset::Cinematic,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AspectRatioArg {
    #[value(name = "16:9")]
    Landscape,
    #[value(name = "9:16")]
    Portrait,
    #[value(name = "1:1")]
    Square,
    #[value(name = "4:3")]
    Classic,
}

impl From<AspectRatioArg> for AspectRatio {
    fn from(arg: AspectRatioArg) -> Self {
        match arg {
            AspectRatioArg::Landscape => AspectRatio::Landscape,
            AspectRatioArg::Portrait => AspectRatio::Portrait,
            AspectRatioArg::Square => AspectRatio::Square,
            AspectRatioArg::Classic => AspectRatio::Classic,
        }
    }
}

fn parse_numbers<const N: usize>(s: &str) -> Result<[f32; N], String> {
    let values = s
        .split(',')
        .map(str::trim)
        .map(|part| part.parse::<f32>().map_err(|e| format!("{part:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    values
        .try_into()
        .map_err(|v: Vec<f32>| format!("expected {N} comma-separated numbers, got {}", v.len()))
}

fn parse_quad(s: &str) -> Result<[f32; 4], String> {
    parse_numbers::<4>(s)
}

fn parse_pair(s: &str) -> Result<(f32, f32), String> {
    let [w, h] = parse_numbers::<2>(s)?;
    Ok((w, h))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => {
            generate(args, cli.json).await?;
        }
        Commands::Edit(args) => {
            edit(args, cli.json).await?;
        }
        Commands::Mark(args) => {
            mark(args, cli.json)?;
        }
        Commands::Styles => {
            list_styles(cli.json)?;
        }
    }

    Ok(())
}

fn client(args: &ServiceArgs) -> anyhow::Result<ThumbnailClient<GeminiService>> {
    let service = GeminiService::builder().model(args.model.into()).build()?;
    Ok(ThumbnailClient::new(service).with_retries(args.retries))
}

async fn generate(args: GenerateArgs, json_output: bool) -> anyhow::Result<()> {
    let photo = SourcePhoto::open(&args.photo)
        .with_context(|| format!("reading {}", args.photo.display()))?;

    let mut config = ThumbnailConfig::new(&args.text)
        .with_text_style(args.text_style.into())
        .with_expression(args.expression.into())
        .with_aspect_ratio(args.aspect_ratio.into());
    if let Some(action) = args.action {
        config = config.with_action(action);
    }
    if let Some(background) = args.background {
        config = config.with_background(background);
    }
    if let Some(preset) = args.preset {
        config = config.with_preset(preset.into());
    }
    if let Some(style) = args.style {
        config = config.with_visual_style(style);
    }

    let image = client(&args.service)?.generate(&photo, &config).await?;
    report("generate", &image, args.output, json_output)
}

/// Loads `data` into an editor and replays the requested region as a drag.
fn select_region(data: &[u8], region: &RegionArgs) -> anyhow::Result<SelectionEditor> {
    let mut editor = SelectionEditor::new();
    let ticket = editor.request_load(SourceId::of_bytes(data));
    editor.complete_load(ticket, data)?;
    let size = editor.image_size().context("image has no pixels")?;
    let native = DisplayRect::new(0.0, 0.0, size.width as f32, size.height as f32);

    let (from, to, display) = match (region.region, region.drag) {
        (Some([x, y, w, h]), _) => (Point::new(x, y), Point::new(x + w, y + h), native),
        (None, Some([x0, y0, x1, y1])) => {
            let display = region
                .display
                .map(|(w, h)| DisplayRect::new(0.0, 0.0, w, h))
                .unwrap_or(native);
            (Point::new(x0, y0), Point::new(x1, y1), display)
        }
        (None, None) => anyhow::bail!("pass --region or --drag to choose what to edit"),
    };

    editor.pointer_down(from, display);
    editor.pointer_move(to, display);
    editor.pointer_up();
    Ok(editor)
}

async fn edit(args: EditArgs, json_output: bool) -> anyhow::Result<()> {
    let data = std::fs::read(&args.image)
        .with_context(|| format!("reading {}", args.image.display()))?;
    let mut editor = select_region(&data, &args.region)?;
    editor.set_instruction(&args.instruction);
    let request = editor.edit_request(&data)?;

    let image = client(&args.service)?.edit(&request).await?;
    report("edit", &image, args.output, json_output)
}

fn mark(args: MarkArgs, json_output: bool) -> anyhow::Result<()> {
    let data = std::fs::read(&args.image)
        .with_context(|| format!("reading {}", args.image.display()))?;
    let editor = select_region(&data, &args.region)?;
    let selection = editor
        .selection()
        .filter(|s| !s.is_empty())
        .context("selected region is empty")?;

    let marked = marker::encode_marked(&data, selection)?;
    std::fs::write(&args.output, &marked)?;

    if json_output {
        let result = serde_json::json!({
            "type": "mark",
            "success": true,
            "output": args.output.display().to_string(),
            "size_bytes": marked.len(),
            "selection": selection,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_selection(&args.output, marked.len(), selection);
    }

    Ok(())
}

fn print_selection(output: &Path, size: usize, selection: Selection) {
    println!(
        "Marked image: {} ({} bytes), region {}x{} at ({}, {})",
        output.display(),
        size,
        selection.width,
        selection.height,
        selection.x,
        selection.y
    );
}

fn report(
    kind: &str,
    image: &GeneratedImage,
    output: Option<PathBuf>,
    json_output: bool,
) -> anyhow::Result<()> {
    let output = output.unwrap_or_else(|| PathBuf::from(image.download_file_name()));
    image.save(&output)?;

    if json_output {
        let result = serde_json::json!({
            "type": kind,
            "success": true,
            "output": output.display().to_string(),
            "size_bytes": image.size(),
            "format": image.format.extension(),
            "model": image.metadata.model,
            "duration_ms": image.metadata.duration_ms,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Saved thumbnail: {} ({} bytes)",
            output.display(),
            image.size()
        );
        if let Some(duration) = image.metadata.duration_ms {
            println!("Duration: {}ms", duration);
        }
    }

    Ok(())
}

fn list_styles(json_output: bool) -> anyhow::Result<()> {
    if json_output {
        let result = serde_json::json!({
            "text_styles": TextStyle::ALL
                .iter()
                .map(|s| serde_json::json!({ "value": s.as_str(), "label": s.label() }))
                .collect::<Vec<_>>(),
            "expressions": Expression::ALL.iter().map(|e| e.as_str()).collect::<Vec<_>>(),
            "aspect_ratios": AspectRatio::ALL
                .iter()
                .map(|r| serde_json::json!({ "value": r.as_str(), "label": r.label() }))
                .collect::<Vec<_>>(),
            "presets": StylePreset::ALL
                .iter()
                .map(|p| serde_json::json!({ "label": p.label(), "prompt": p.prompt() }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("TEXT STYLES:");
        for style in TextStyle::ALL {
            println!("  {} ({})", style.label(), style.as_str());
        }
        println!("\nEXPRESSIONS:");
        for expression in Expression::ALL {
            println!("  {}", expression);
        }
        println!("\nASPECT RATIOS:");
        for ratio in AspectRatio::ALL {
            println!("  {} ({})", ratio, ratio.label());
        }
        println!("\nPRESETS:");
        for preset in StylePreset::ALL {
            println!("  {}: {}", preset.label(), preset.prompt());
        }
    }

    Ok(())
}
