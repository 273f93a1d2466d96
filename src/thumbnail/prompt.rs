//! Instruction text sent alongside images.

use crate::thumbnail::types::ThumbnailConfig;

/// Composes the generation instruction for a configured thumbnail.
///
/// The overlay text leads the prompt; the model honours early text
/// instructions far more reliably than late ones.
pub fn generation_prompt(config: &ThumbnailConfig) -> String {
    let text = config.overlay_text.trim();
    format!(
        "MANDATORY INSTRUCTION: Render specific text on the image.
TEXT TO RENDER: \"{text}\"
TEXT STYLE: {style}.
The text must be huge, legible, and the focal point of the image.

You are an expert YouTube thumbnail designer.
Task: Create a viral YouTube thumbnail based on the provided image of a person.

COMPOSITION DETAILS:
1. CHARACTER:
   - Expression: {expression} (Extreme and emotive).
   - Action: {action}. (Modify body/arms to match seamlessly).

2. ENVIRONMENT:
   - Background: {background}.
   - Style: {visual_style}.
   - Lighting: High-contrast, cinematic.

3. TEXT PLACEMENT:
   - Ensure \"{text}\" is clearly visible.
   - Use high contrast colors against the background.
   - Do not misspell the text.

4. VIBE:
   - High saturation, sharp details, exciting composition.

Return only the generated image.",
        style = config.text_style.as_str(),
        expression = config.expression.as_str(),
        action = config.action_or_default(),
        background = config.background_or_default(),
        visual_style = config.visual_style_or_default(),
    )
}

/// Composes the instruction for a region edit of a marked image.
pub fn edit_prompt(instruction: &str) -> String {
    format!(
        "You are an expert image editor.
Task: Edit the provided image based on the user's request.

Input Image: The provided image contains a RED BOUNDING BOX indicating the specific area to edit.
User Request: \"{instruction}\" inside the marked area.

Instructions:
1. Only alter the content within the RED BOUNDING BOX area.
2. The rest of the image MUST remain exactly identical to the original.
3. CRITICAL: Remove the red bounding box in the final output. The edges should be seamless.
4. Ensure the style matches the existing thumbnail art style.

Return only the edited image.",
        instruction = instruction.trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thumbnail::types::{
        Expression, TextStyle, DEFAULT_ACTION, DEFAULT_BACKGROUND, DEFAULT_VISUAL_STYLE,
    };

    #[test]
    fn test_generation_prompt_embeds_fields() {
        let config = ThumbnailConfig::new("I BUILT A ROCKET")
            .with_text_style(TextStyle::NeonGlowing)
            .with_expression(Expression::Excited)
            .with_action("Holding a wrench")
            .with_background("A launch pad at dusk")
            .with_visual_style("Retro sci-fi poster");
        let prompt = generation_prompt(&config);

        assert!(prompt.starts_with("MANDATORY INSTRUCTION"));
        assert!(prompt.contains("TEXT TO RENDER: \"I BUILT A ROCKET\""));
        assert!(prompt.contains("TEXT STYLE: Neon Glowing."));
        assert!(prompt.contains("Expression: Excited"));
        assert!(prompt.contains("Action: Holding a wrench."));
        assert!(prompt.contains("Background: A launch pad at dusk."));
        assert!(prompt.contains("Style: Retro sci-fi poster."));
    }

    #[test]
    fn test_generation_prompt_uses_fallbacks() {
        let prompt = generation_prompt(&ThumbnailConfig::new("HELLO"));
        assert!(prompt.contains(DEFAULT_ACTION));
        assert!(prompt.contains(DEFAULT_BACKGROUND));
        assert!(prompt.contains(DEFAULT_VISUAL_STYLE));
        assert!(prompt.contains("TEXT STYLE: Bold Impact."));
        assert!(prompt.contains("Expression: Shocked"));
    }

    #[test]
    fn test_edit_prompt_mentions_marker_and_region() {
        let prompt = edit_prompt("  swap the cap for a crown ");
        assert!(
            prompt.contains("User Request: \"swap the cap for a crown\" inside the marked area.")
        );
        assert!(prompt.contains("RED BOUNDING BOX"));
        assert!(prompt.contains("MUST remain exactly identical"));
        assert!(prompt.contains("Remove the red bounding box"));
    }
}
