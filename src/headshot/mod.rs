pub mod options;
pub mod prompt;

pub use options::{GenerationConfig, HeadshotStyle, OutfitType, Retouching};
pub use prompt::compile_prompt;
