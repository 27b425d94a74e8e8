//! Request orchestration: validate, extract, call the model once, reply.

use super::extract::extract_prompt;
use super::model::select_model;
use super::providers::{GenerativeProvider, ProviderError};
use super::scratch::ScratchDir;
use crate::config::ChatConfig;
use crate::models::{ChatReply, FileKind, IncomingFile, ModelReply, Prompt};
use crate::utils::{allowed_file, secure_filename};
use service_core::error::AppError;
use std::sync::Arc;

pub const FILE_TYPE_NOT_ALLOWED: &str = "File type not allowed";

pub struct ChatService {
    config: Arc<ChatConfig>,
    provider: Arc<dyn GenerativeProvider>,
    scratch: ScratchDir,
}

impl ChatService {
    pub fn new(
        config: Arc<ChatConfig>,
        provider: Arc<dyn GenerativeProvider>,
        scratch: ScratchDir,
    ) -> Self {
        Self {
            config,
            provider,
            scratch,
        }
    }

    pub fn scratch(&self) -> &ScratchDir {
        &self.scratch
    }

    /// Text path: the trimmed message is the whole prompt.
    pub async fn reply_to_message(&self, message: String) -> Result<ChatReply, AppError> {
        let reply = self.generate(Prompt::Text(message)).await?;
        Ok(ChatReply {
            reply: reply.text,
            file_url: None,
        })
    }

    /// File path. The scratch copy is removed on every exit from here.
    pub async fn reply_to_upload(&self, file: IncomingFile) -> Result<ChatReply, AppError> {
        if !allowed_file(&file.filename) {
            return Err(AppError::BadRequest(FILE_TYPE_NOT_ALLOWED.to_string()));
        }

        let stored_name = secure_filename(&file.filename);
        let kind = FileKind::from_filename(&stored_name);

        tracing::info!(
            filename = %file.filename,
            stored_name = %stored_name,
            kind = %kind,
            size = file.data.len(),
            "Processing upload"
        );

        if kind == FileKind::Unsupported {
            return Err(AppError::BadRequest(
                super::extract::UNSUPPORTED_FILE_TYPE.to_string(),
            ));
        }

        let _scratch_file = self.scratch.store(&stored_name, &file.data).await?;

        let prompt = extract_prompt(kind, file.data).await?;
        let reply = self.generate(prompt).await?;

        Ok(ChatReply {
            reply: reply.text,
            file_url: Some(format!("/uploads/{}", stored_name)),
        })
    }

    async fn generate(&self, prompt: Prompt) -> Result<ModelReply, AppError> {
        let model = select_model(&self.config.gemini.models, prompt.is_multimodal());
        let timeout = self.config.gemini.timeout;

        tracing::info!(
            model = %model,
            prompt_len = prompt.text_len(),
            multimodal = prompt.is_multimodal(),
            "Calling generative model"
        );

        let outcome = tokio::time::timeout(timeout, self.provider.generate(model, &prompt))
            .await
            .unwrap_or(Err(ProviderError::Timeout(timeout)));

        outcome.map_err(|e| AppError::InternalError(anyhow::Error::new(e)))
    }
}
