pub mod gemini;
pub mod media;

pub use gemini::{generate_headshot, GeneratedImage, GenerationError};
pub use media::SourceImage;
