use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadshotStyle {
    Corporate,
    Startup,
    Creative,
    Outdoor,
    BlackAndWhite,
}

impl HeadshotStyle {
    pub const ALL: [HeadshotStyle; 5] = [
        HeadshotStyle::Corporate,
        HeadshotStyle::Startup,
        HeadshotStyle::Creative,
        HeadshotStyle::Outdoor,
        HeadshotStyle::BlackAndWhite,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HeadshotStyle::Corporate => "Corporate",
            HeadshotStyle::Startup => "Modern Startup",
            HeadshotStyle::Creative => "Creative Studio",
            HeadshotStyle::Outdoor => "Natural Outdoor",
            HeadshotStyle::BlackAndWhite => "Black & White",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "corporate" => Some(HeadshotStyle::Corporate),
            "startup" => Some(HeadshotStyle::Startup),
            "creative" => Some(HeadshotStyle::Creative),
            "outdoor" => Some(HeadshotStyle::Outdoor),
            "bw" | "black-and-white" => Some(HeadshotStyle::BlackAndWhite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutfitType {
    Suit,
    Tuxedo,
    BusinessCasual,
    Casual,
    MedicalCoat,
}

impl OutfitType {
    pub const ALL: [OutfitType; 5] = [
        OutfitType::Suit,
        OutfitType::Tuxedo,
        OutfitType::BusinessCasual,
        OutfitType::Casual,
        OutfitType::MedicalCoat,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OutfitType::Suit => "Business Suit",
            OutfitType::Tuxedo => "Tuxedo",
            OutfitType::BusinessCasual => "Business Casual",
            OutfitType::Casual => "Smart Casual",
            OutfitType::MedicalCoat => "Medical Coat",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "suit" => Some(OutfitType::Suit),
            "tuxedo" => Some(OutfitType::Tuxedo),
            "business-casual" => Some(OutfitType::BusinessCasual),
            "casual" => Some(OutfitType::Casual),
            "medical-coat" => Some(OutfitType::MedicalCoat),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retouching {
    pub smooth_skin: bool,
    pub whiten_teeth: bool,
    pub brighten_eyes: bool,
}

impl Default for Retouching {
    fn default() -> Self {
        Retouching {
            smooth_skin: true,
            whiten_teeth: false,
            brighten_eyes: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    pub style: HeadshotStyle,
    pub outfit: OutfitType,
    pub high_quality: bool,
    pub brand_color: Option<String>,
    pub retouching: Retouching,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            style: HeadshotStyle::Corporate,
            outfit: OutfitType::Suit,
            high_quality: false,
            brand_color: None,
            retouching: Retouching::default(),
        }
    }
}

static BRAND_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("brand color regex"));

pub fn parse_brand_color(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if BRAND_COLOR_RE.is_match(trimmed) {
        Some(trimmed.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_style_parses_from_its_cli_name() {
        for (name, expected) in [
            ("corporate", HeadshotStyle::Corporate),
            ("startup", HeadshotStyle::Startup),
            ("creative", HeadshotStyle::Creative),
            ("outdoor", HeadshotStyle::Outdoor),
            ("bw", HeadshotStyle::BlackAndWhite),
        ] {
            assert_eq!(HeadshotStyle::parse(name), Some(expected));
        }
        assert_eq!(HeadshotStyle::parse("vaporwave"), None);
    }

    #[test]
    fn every_outfit_parses_from_its_cli_name() {
        for (name, expected) in [
            ("suit", OutfitType::Suit),
            ("tuxedo", OutfitType::Tuxedo),
            ("business-casual", OutfitType::BusinessCasual),
            ("casual", OutfitType::Casual),
            ("medical-coat", OutfitType::MedicalCoat),
        ] {
            assert_eq!(OutfitType::parse(name), Some(expected));
        }
        assert_eq!(OutfitType::parse("spacesuit"), None);
    }

    #[test]
    fn labels_are_distinct_and_nonempty() {
        let style_labels: Vec<&str> = HeadshotStyle::ALL.iter().map(|s| s.label()).collect();
        let outfit_labels: Vec<&str> = OutfitType::ALL.iter().map(|o| o.label()).collect();
        for label in style_labels.iter().chain(outfit_labels.iter()) {
            assert!(!label.is_empty());
        }
        for (index, label) in style_labels.iter().enumerate() {
            assert!(!style_labels[index + 1..].contains(label));
        }
        for (index, label) in outfit_labels.iter().enumerate() {
            assert!(!outfit_labels[index + 1..].contains(label));
        }
    }

    #[test]
    fn brand_color_accepts_six_digit_hex_only() {
        assert_eq!(
            parse_brand_color(" #336699 "),
            Some("#336699".to_string())
        );
        assert_eq!(parse_brand_color("#AbCdEf"), Some("#AbCdEf".to_string()));
        assert_eq!(parse_brand_color("336699"), None);
        assert_eq!(parse_brand_color("#36f"), None);
        assert_eq!(parse_brand_color("#33669g"), None);
        assert_eq!(parse_brand_color(""), None);
    }

    #[test]
    fn default_config_matches_the_studio_defaults() {
        let config = GenerationConfig::default();
        assert_eq!(config.style, HeadshotStyle::Corporate);
        assert_eq!(config.outfit, OutfitType::Suit);
        assert!(!config.high_quality);
        assert!(config.brand_color.is_none());
        assert!(config.retouching.smooth_skin);
        assert!(!config.retouching.whiten_teeth);
        assert!(config.retouching.brighten_eyes);
    }
}
