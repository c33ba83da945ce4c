use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;

use crate::errors::{SurfError, SurfResult};
use crate::llm::provider::{ChunkStream, LlmProvider};
use crate::llm::sse_parser::{self, SseLine};
use crate::llm::types::{CallConfig, ChatMessage, ToolDef};

pub struct OpenAiCompatibleProvider {
    id: String,
    api_base: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(id: String, api_base: String, api_key: String) -> Self {
        Self {
            id,
            api_base,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn build_body(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDef],
        cfg: &CallConfig,
    ) -> SurfResult<serde_json::Value> {
        let mut body = serde_json::json!({
            "model": cfg.model,
            "messages": messages,
            "stream": true,
            "temperature": cfg.temperature,
            "max_tokens": cfg.max_tokens,
        });

        if let Some(top_p) = cfg.top_p {
            body["top_p"] = serde_json::json!(top_p);
        }

        if !tools.is_empty() {
            body["tools"] = serde_json::to_value(tools)?;
            body["tool_choice"] = serde_json::json!("auto");
        }

        Ok(body)
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.id
    }

    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDef],
        cfg: &CallConfig,
    ) -> SurfResult<ChunkStream> {
        let body = self.build_body(messages, tools, cfg)?;

        tracing::debug!(
            provider = %self.id,
            model = %cfg.model,
            messages = messages.len(),
            "sending LLM request"
        );
        tracing::debug!(
            body = %serde_json::to_string(&redact_images(&body)).unwrap_or_default(),
            "request body (sanitized, base64 omitted)"
        );

        let response = self
            .client
            .post(&self.api_base)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let err_body = response.text().await.unwrap_or_default();
            return Err(SurfError::LlmProvider(format!("{}: {}", status, err_body)));
        }

        let provider = self.id.clone();
        let mut events = response.bytes_stream().eventsource();

        let stream = async_stream::stream! {
            let mut chunks = 0usize;

            while let Some(event) = events.next().await {
                let event = match event {
                    Ok(ev) => ev,
                    Err(e) => {
                        yield Err(SurfError::LlmProvider(format!("SSE stream error: {e}")));
                        break;
                    }
                };

                match sse_parser::parse_sse_data(&event.data) {
                    Ok(Some(SseLine::Chunk(chunk))) => {
                        chunks += 1;
                        yield Ok(chunk);
                    }
                    Ok(Some(SseLine::Done)) => break,
                    Ok(None) => {}
                    Err(SurfError::SseParsing(e)) => {
                        tracing::warn!(provider = %provider, "SSE event skipped: {e}");
                    }
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }

            tracing::debug!(provider = %provider, chunks, "LLM stream complete");
        };

        Ok(Box::pin(stream))
    }
}

/// Clone of a request body with inline image payloads replaced, for logging only.
fn redact_images(body: &serde_json::Value) -> serde_json::Value {
    let mut log_body = body.clone();
    if let Some(msgs) = log_body.get_mut("messages").and_then(|m| m.as_array_mut()) {
        for msg in msgs {
            let Some(parts) = msg.get_mut("content").and_then(|c| c.as_array_mut()) else {
                continue;
            };
            for part in parts {
                if part.get("type").and_then(|t| t.as_str()) == Some("image_url") {
                    if let Some(url) = part.get_mut("image_url").and_then(|i| i.get_mut("url")) {
                        *url = serde_json::Value::String("<omitted_base64_image>".to_string());
                    }
                }
            }
        }
    }
    log_body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redaction_replaces_only_image_urls() {
        let body = serde_json::json!({
            "messages": [
                {"role": "system", "content": "hi"},
                {"role": "user", "content": [
                    {"type": "text", "text": "look"},
                    {"type": "image_url", "image_url": {"url": "data:image/png;base64,AAAA"}}
                ]}
            ]
        });
        let redacted = redact_images(&body);
        assert_eq!(redacted["messages"][0]["content"], "hi");
        assert_eq!(redacted["messages"][1]["content"][0]["text"], "look");
        assert_eq!(
            redacted["messages"][1]["content"][1]["image_url"]["url"],
            "<omitted_base64_image>"
        );
        // Original untouched.
        assert_eq!(
            body["messages"][1]["content"][1]["image_url"]["url"],
            "data:image/png;base64,AAAA"
        );
    }

    #[test]
    fn body_carries_sampling_and_tool_choice() {
        let provider = OpenAiCompatibleProvider::new("p".into(), "http://x".into(), "k".into());
        let cfg = CallConfig {
            model: "m".into(),
            temperature: 0.7,
            top_p: Some(0.8),
            max_tokens: 4096,
        };
        let tools = crate::llm::tools::load_builtin_tools().unwrap();
        let body = provider
            .build_body(&[ChatMessage::user("go")], &tools, &cfg)
            .unwrap();
        assert_eq!(body["stream"], true);
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["top_p"], 0.8);
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["tools"][0]["function"]["name"], "computer_use");
        assert_eq!(body["messages"][0]["role"], "user");
    }
}
