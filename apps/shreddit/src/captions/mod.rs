// Caption text: user-typed or generated by a vision model, optionally themed
// on a band or a music genre.

pub mod genre;
pub mod parser;
pub mod prompts;
pub mod source;

pub use genre::Genre;
pub use parser::Captions;
pub use source::{AiCaptions, CaptionContext, CaptionTextSource, FixedCaptions};
