use async_trait::async_trait;
use tracing::{info, warn};

use crate::captions::genre::Genre;
use crate::captions::parser::{parse_captions, Captions};
use crate::captions::prompts::{
    BAND_SYSTEM_TEMPLATE, BAND_USER_TEMPLATE, GENERIC_SYSTEM_TEMPLATE, GENERIC_USER_PROMPT,
    GENRE_SYSTEM_TEMPLATE, GENRE_USER_TEMPLATE,
};
use crate::errors::AppError;
use crate::images::{encode_jpeg, SourceImage};
use crate::llm_client::prompts::{BREVITY_INSTRUCTION, CAPTION_FORMAT_INSTRUCTION};
use crate::llm_client::{ImageAttachment, LlmClient};

/// Reply budget for one caption pair.
const CAPTION_MAX_TOKENS: u32 = 100;
/// Quality of the JPEG sent to the vision model. Lower than the saved output;
/// the model only needs to recognise the picture.
const ATTACHMENT_JPEG_QUALITY: u8 = 85;

/// What the captions should be about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionContext {
    Generic,
    Band { name: String },
    Genre(Genre),
}

impl CaptionContext {
    /// Short human-readable label used in logs and CLI output.
    pub fn label(&self) -> String {
        match self {
            CaptionContext::Generic => "generic".to_string(),
            CaptionContext::Band { name } => format!("band: {name}"),
            CaptionContext::Genre(genre) => format!("genre: {genre}"),
        }
    }

    pub fn system_prompt(&self) -> String {
        let template = match self {
            CaptionContext::Generic => GENERIC_SYSTEM_TEMPLATE.to_string(),
            CaptionContext::Band { name } => BAND_SYSTEM_TEMPLATE.replace("{band}", name),
            CaptionContext::Genre(genre) => {
                let p = genre.personality();
                GENRE_SYSTEM_TEMPLATE
                    .replace("{persona}", p.persona)
                    .replace("{humour}", p.humour)
                    .replace("{topics}", &p.topics.join(", "))
                    .replace("{genre}", genre.display_name())
            }
        };
        template
            .replace("{brevity}", BREVITY_INSTRUCTION)
            .replace("{format}", CAPTION_FORMAT_INSTRUCTION)
    }

    pub fn user_prompt(&self) -> String {
        match self {
            CaptionContext::Generic => GENERIC_USER_PROMPT.to_string(),
            CaptionContext::Band { name } => BAND_USER_TEMPLATE.replace("{band}", name),
            CaptionContext::Genre(genre) => {
                GENRE_USER_TEMPLATE.replace("{genre}", genre.display_name())
            }
        }
    }
}

/// Produces the caption text for an image.
#[async_trait]
pub trait CaptionTextSource: Send + Sync {
    async fn captions(
        &self,
        image: &SourceImage,
        context: &CaptionContext,
    ) -> Result<Captions, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Fixed captions (user-typed)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FixedCaptions {
    captions: Captions,
}

impl FixedCaptions {
    pub fn new(captions: Captions) -> Self {
        Self { captions }
    }
}

#[async_trait]
impl CaptionTextSource for FixedCaptions {
    async fn captions(
        &self,
        _image: &SourceImage,
        _context: &CaptionContext,
    ) -> Result<Captions, AppError> {
        Ok(self.captions.clone())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// AI captions (vision model)
// ────────────────────────────────────────────────────────────────────────────

pub struct AiCaptions {
    client: LlmClient,
}

impl AiCaptions {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CaptionTextSource for AiCaptions {
    async fn captions(
        &self,
        image: &SourceImage,
        context: &CaptionContext,
    ) -> Result<Captions, AppError> {
        let picture = image.image.clone();
        let jpeg = tokio::task::spawn_blocking(move || {
            encode_jpeg(&picture, ATTACHMENT_JPEG_QUALITY)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Encode task panicked: {e}")))??;

        let attachment = ImageAttachment::from_bytes("image/jpeg", &jpeg);

        info!(
            model = %self.client.model(),
            context = %context.label(),
            "Requesting AI captions for {}",
            image.origin
        );

        let reply = self
            .client
            .call_text(
                &context.system_prompt(),
                &context.user_prompt(),
                Some(&attachment),
                CAPTION_MAX_TOKENS,
            )
            .await?;

        let captions = parse_captions(&reply);
        if captions.is_empty() {
            warn!("AI reply contained no captions: {}", reply);
            return Err(AppError::Validation(
                "AI reply contained no TOP TEXT or BOTTOM TEXT".to_string(),
            ));
        }

        info!("Generated captions: top={:?} bottom={:?}", captions.top, captions.bottom);
        Ok(captions)
    }
}
