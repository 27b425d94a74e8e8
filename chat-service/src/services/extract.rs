//! Turns an upload into a model prompt, one strategy per `FileKind`.

use crate::models::{FileKind, ImageKind, InlineImage, Prompt};
use axum::body::Bytes;
use service_core::error::AppError;
use thiserror::Error;

pub const NO_PDF_TEXT: &str = "Could not extract text from PDF";
pub const UNSUPPORTED_FILE_TYPE: &str = "Unsupported file type";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{}", NO_PDF_TEXT)]
    NoPdfText,

    #[error("{}", UNSUPPORTED_FILE_TYPE)]
    Unsupported,

    #[error("Failed to read PDF: {0}")]
    Pdf(String),

    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Text file is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::NoPdfText | ExtractError::Unsupported => {
                AppError::BadRequest(err.to_string())
            }
            other => AppError::InternalError(anyhow::Error::new(other)),
        }
    }
}

pub async fn extract_prompt(kind: FileKind, data: Bytes) -> Result<Prompt, ExtractError> {
    match kind {
        FileKind::Image(image_kind) => image_prompt(image_kind, data).await,
        FileKind::Pdf => pdf_prompt(data).await,
        FileKind::PlainText => text_prompt(data),
        FileKind::Unsupported => Err(ExtractError::Unsupported),
    }
}

async fn image_prompt(kind: ImageKind, data: Bytes) -> Result<Prompt, ExtractError> {
    // Decoding proves the bytes are an image; the original bytes are sent
    let decode_input = data.clone();
    tokio::task::spawn_blocking(move || {
        image::load_from_memory_with_format(&decode_input, kind.format()).map(|_| ())
    })
    .await??;

    Ok(Prompt::image(InlineImage {
        mime_type: kind.mime_type(),
        data: data.to_vec(),
    }))
}

async fn pdf_prompt(data: Bytes) -> Result<Prompt, ExtractError> {
    let pages = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem_by_pages(&data)
    })
    .await?
    .map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let text = join_pages(&pages).ok_or(ExtractError::NoPdfText)?;

    tracing::debug!(pages = pages.len(), text_len = text.len(), "Extracted PDF text");

    Ok(Prompt::Text(format!(
        "Extracted text from PDF:\n{}\n\nAnalyze this content",
        text
    )))
}

fn text_prompt(data: Bytes) -> Result<Prompt, ExtractError> {
    Ok(Prompt::Text(String::from_utf8(data.to_vec())?))
}

/// Newline-terminated concatenation of the pages that produced text, or
/// `None` when nothing but whitespace came out.
pub fn join_pages(pages: &[String]) -> Option<String> {
    let mut text = String::new();
    for page in pages.iter().filter(|p| !p.trim().is_empty()) {
        text.push_str(page);
        text.push('\n');
    }

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
