use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::errors::SurfResult;
use crate::llm::types::{CallConfig, ChatChunk, ChatMessage, ToolDef};

/// Incremental chunks of one streamed model turn.
pub type ChunkStream = BoxStream<'static, SurfResult<ChatChunk>>;

/// Unified LLM provider trait. All providers implement this trait.
/// New providers only need to implement this trait and register in config.toml.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider's identifier (matches config.toml key).
    fn name(&self) -> &str;

    /// Issues one streaming chat-completion request.
    /// Dropping the returned stream abandons the request.
    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDef],
        cfg: &CallConfig,
    ) -> SurfResult<ChunkStream>;
}
