// Base pictures: parsing sources, loading/decoding, caption-band extraction.

pub mod encode;
pub mod extract;
pub mod source;

pub use encode::encode_jpeg;
pub use extract::strip_caption_bands;
pub use source::{HttpImageLoader, ImageLoader, ImageSource, SourceImage};
