//! Region edit example - outlines the centre of an image and asks for a change there.
//!
//! Run with: `cargo run --example edit_region -- <thumbnail.png>`
//!
//! Requires `GEMINI_API_KEY` or `GOOGLE_API_KEY` environment variable.

use thumbsnap::editor::{DisplayRect, Point, SelectionEditor, SourceId};
use thumbsnap::{GeminiService, ThumbnailClient};

#[tokio::main]
async fn main() -> thumbsnap::Result<()> {
    let input_path = std::env::args()
        .nth(1)
        .expect("Usage: edit_region <thumbnail.png>");

    let input_bytes = std::fs::read(&input_path)?;

    let mut editor = SelectionEditor::new();
    let ticket = editor.request_load(SourceId::of_bytes(&input_bytes));
    editor.complete_load(ticket, &input_bytes)?;
    let size = editor.image_size().expect("image was just loaded");

    // Pretend the image is shown at half size; the editor maps back to pixels.
    let display = DisplayRect::new(0.0, 0.0, size.width as f32 / 2.0, size.height as f32 / 2.0);
    let start = Point::new(display.width * 0.25, display.height * 0.25);
    let end = Point::new(display.width * 0.75, display.height * 0.75);
    editor.pointer_down(start, display);
    editor.pointer_move(end, display);
    editor.pointer_up();
    editor.set_instruction("Add a bright yellow glow around the subject");

    let request = editor.edit_request(&input_bytes)?;
    println!("Editing pixel region {:?}", request.selection);

    let client = ThumbnailClient::new(GeminiService::builder().build()?);
    let image = client.edit(&request).await?;
    image.save("edited.png")?;
    println!("Edited image saved to edited.png ({} bytes)", image.size());

    Ok(())
}
