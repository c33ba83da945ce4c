use crate::errors::{SurfError, SurfResult};
use crate::llm::types::{ChatChunk, FinishReason, ToolCallDelta};

/// A meaningful `data` payload of an OpenAI-compatible SSE body.
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    Chunk(ChatChunk),
    /// The `[DONE]` sentinel.
    Done,
}

/// Parses the data of one SSE event (OpenAI-compatible format) into a decoded chunk.
/// Returns None for empty payloads and choice-less chunks.
pub fn parse_sse_data(data: &str) -> SurfResult<Option<SseLine>> {
    let data = data.trim();
    if data.is_empty() {
        return Ok(None);
    }

    if data == "[DONE]" {
        return Ok(Some(SseLine::Done));
    }

    let json: serde_json::Value =
        serde_json::from_str(data).map_err(|e| SurfError::SseParsing(e.to_string()))?;

    if let Some(err) = json.get("error").filter(|e| !e.is_null()) {
        return Err(SurfError::LlmProvider(format!("stream error payload: {err}")));
    }

    let Some(first) = json["choices"].as_array().and_then(|c| c.first()) else {
        return Ok(None);
    };
    let delta = &first["delta"];

    let content = delta["content"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let tool_calls = match delta.get("tool_calls") {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .map(|item| serde_json::from_value::<ToolCallDelta>(item.clone()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SurfError::SseParsing(format!("bad tool_call delta: {e}")))?,
        _ => Vec::new(),
    };

    let finish_reason = first["finish_reason"].as_str().map(FinishReason::parse);

    Ok(Some(SseLine::Chunk(ChatChunk {
        content,
        tool_calls,
        finish_reason,
    })))
}
