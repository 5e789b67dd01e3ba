// Chat completion backends

pub mod chat;

pub use chat::ChatClient;

/// A single prompt sent to a chat model
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A chat model that answers one prompt with one text reply
pub trait ChatCompleter {
    fn complete(&self, request: &CompletionRequest) -> anyhow::Result<String>;
}
