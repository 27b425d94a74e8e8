pub mod chat;
pub mod extract;
pub mod model;
pub mod providers;
pub mod scratch;

pub use chat::ChatService;
pub use scratch::{ScratchDir, ScratchFile};
