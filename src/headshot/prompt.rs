use crate::headshot::options::{GenerationConfig, HeadshotStyle, Retouching};

const SMOOTH_SKIN_LINE: &str = "Apply subtle skin smoothing while keeping texture realistic.";
const WHITEN_TEETH_LINE: &str = "Ensure teeth are naturally white and clean.";
const BRIGHTEN_EYES_LINE: &str = "Add a subtle catchlight to the eyes to make them pop.";

fn style_clauses(style: HeadshotStyle) -> (&'static str, &'static str) {
    match style {
        HeadshotStyle::Corporate => (
            "High-end corporate headshot, confident expression, sharp focus.",
            "Neutral gray or subtle blue gradient professional studio background.",
        ),
        HeadshotStyle::Startup => (
            "Modern tech startup founder headshot, approachable yet professional.",
            "Bright and airy modern office background with beautiful bokeh and soft natural window light.",
        ),
        HeadshotStyle::Creative => (
            "Creative studio portrait, artistic composition, high contrast.",
            "Solid dark or textured abstract background, dramatic moody lighting.",
        ),
        HeadshotStyle::Outdoor => (
            "Natural outdoor portrait, relaxed and friendly.",
            "Blurred city park or urban architecture background, golden hour lighting.",
        ),
        HeadshotStyle::BlackAndWhite => (
            "Classic black and white studio portrait, timeless look, rembrandt lighting.",
            "Dark gray or black studio backdrop.",
        ),
    }
}

fn branding_clause(brand_color: Option<&str>) -> Option<String> {
    let color = brand_color?.trim();
    if color.is_empty() {
        return None;
    }
    Some(format!(
        "The background should incorporate subtle, professional accents of the brand color {color} \
         (hex code), perhaps in the blurred lighting or architectural details, to align with \
         corporate branding."
    ))
}

fn retouching_lines(retouching: &Retouching) -> Vec<&'static str> {
    let mut lines = Vec::new();
    if retouching.smooth_skin {
        lines.push(SMOOTH_SKIN_LINE);
    }
    if retouching.whiten_teeth {
        lines.push(WHITEN_TEETH_LINE);
    }
    if retouching.brighten_eyes {
        lines.push(BRIGHTEN_EYES_LINE);
    }
    lines
}

/// Builds the full instruction text for one generation. Pure function of
/// the config: equal configs yield byte-identical prompts.
pub fn compile_prompt(config: &GenerationConfig) -> String {
    let (style_desc, background_desc) = style_clauses(config.style);
    let background = match branding_clause(config.brand_color.as_deref()) {
        Some(branding) => format!("{branding} {background_desc}"),
        None => background_desc.to_string(),
    };

    let mut lines = vec![
        "Task: Transform the attached selfie into a premium, studio-quality professional headshot."
            .to_string(),
        String::new(),
        "CRITICAL IDENTITY INSTRUCTION:".to_string(),
        "You MUST preserve the facial identity, structure, and ethnic features of the person in \
         the input image."
            .to_string(),
        "Do not generate a random person. The output must look exactly like the subject, but \
         professionally photographed."
            .to_string(),
        String::new(),
        format!(
            "Outfit: The person should be wearing a {}, fitting well and looking high-quality.",
            config.outfit.label()
        ),
        String::new(),
        format!("Style: {style_desc}"),
        format!("Background: {background}"),
        String::new(),
        "Retouching:".to_string(),
        "- Remove any blemishes or stray hairs.".to_string(),
        "- Fix lighting to be flattering and professional (softbox style).".to_string(),
    ];

    for line in retouching_lines(&config.retouching) {
        lines.push(format!("- {line}"));
    }

    lines.push(String::new());
    lines.push(
        "Technical: 8k resolution, photorealistic, cinematic lighting, highly detailed, 85mm lens \
         look."
            .to_string(),
    );
    lines.push("Framing: Standard professional head and shoulders crop.".to_string());

    lines.join("\n")
}
