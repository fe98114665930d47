use thiserror::Error;

use crate::layout::LayoutError;
use crate::llm_client::LlmError;
use crate::reddit::RedditError;

/// Application-level error type.
///
/// Stage modules keep their own error enums; everything converges here so the
/// pipeline and CLI can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Reddit error: {0}")]
    Reddit(#[from] RedditError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Font error: {0}")]
    Font(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("AI captions are not available: {0}")]
    AiUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Short machine-readable code, used in log fields and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Layout(_) => "LAYOUT_ERROR",
            AppError::Llm(_) => "LLM_ERROR",
            AppError::Reddit(_) => "REDDIT_ERROR",
            AppError::Image(_) => "IMAGE_ERROR",
            AppError::Font(_) => "FONT_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::AiUnavailable(_) => "AI_UNAVAILABLE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Validation(_) | AppError::NotFound(_) => 2,
            AppError::AiUnavailable(_) | AppError::Reddit(RedditError::NotConfigured) => 3,
            _ => 1,
        }
    }
}
