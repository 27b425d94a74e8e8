use super::upload::IncomingFile;
use serde::{Deserialize, Serialize};

/// Instruction sent alongside every image.
pub const IMAGE_INSTRUCTION: &str = "Analyze this image";

/// JSON body accepted by `POST /chat`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub message: Option<String>,
}

/// Successful `POST /chat` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

/// Text returned by the model, relayed unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReply {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Text(String),
    Multimodal {
        instruction: String,
        image: InlineImage,
    },
}

impl Prompt {
    pub fn image(image: InlineImage) -> Self {
        Prompt::Multimodal {
            instruction: IMAGE_INSTRUCTION.to_string(),
            image,
        }
    }

    pub fn is_multimodal(&self) -> bool {
        matches!(self, Prompt::Multimodal { .. })
    }

    /// Length of the textual part, for logging.
    pub fn text_len(&self) -> usize {
        match self {
            Prompt::Text(text) => text.len(),
            Prompt::Multimodal { instruction, .. } => instruction.len(),
        }
    }
}

/// What a `POST /chat` request asked for, decided once before any work.
#[derive(Debug)]
pub enum ChatInput {
    File(IncomingFile),
    Message(String),
    EmptyMessage,
    Invalid,
}

impl ChatInput {
    /// Precedence: a named file part, then a form `message`, then a JSON
    /// `message`.
    pub fn classify(
        file: Option<IncomingFile>,
        form_message: Option<String>,
        json: Option<ChatMessage>,
    ) -> Self {
        if let Some(file) = file.filter(|f| !f.filename.is_empty()) {
            return ChatInput::File(file);
        }

        if let Some(message) = form_message {
            return Self::from_message(&message);
        }

        match json {
            Some(body) => Self::from_message(body.message.as_deref().unwrap_or_default()),
            None => ChatInput::Invalid,
        }
    }

    fn from_message(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            ChatInput::EmptyMessage
        } else {
            ChatInput::Message(trimmed.to_string())
        }
    }
}
