pub mod chat;
pub mod upload;

pub use chat::{ChatInput, ChatMessage, ChatReply, InlineImage, ModelReply, Prompt};
pub use upload::{FileKind, ImageKind, IncomingFile};
