use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::agent_engine::accumulator::ToolCallAccumulator;
use crate::agent_engine::prompt::{
    follow_up_prompt, system_instructions, CURRENT_SCREEN_NOTE, INITIAL_SCREEN_PROMPT,
    SYSTEM_PROMPT,
};
use crate::agent_engine::state::{SseEvent, StreamPhase};
use crate::config::AppConfig;
use crate::errors::{SurfError, SurfResult};
use crate::executor::action::{parse_action, ActionResponse, ParsedAction};
use crate::executor::coordinator::CoordinateScaler;
use crate::executor::dispatcher::ActionExecutor;
use crate::executor::input::Desktop;
use crate::llm::provider::LlmProvider;
use crate::llm::registry::ProviderRegistry;
use crate::llm::tools::{load_builtin_tools, COMPUTER_USE_TOOL};
use crate::llm::types::{CallConfig, ChatMessage, FinishReason, Role, ToolCall, ToolDef};
use crate::perception::screenshot;

/// Drives the screenshot → model → action feedback loop for one sandbox desktop.
///
/// One streamer can serve many requests; each [`ComputerStreamer::stream`] call
/// owns its own conversation and accumulators.
pub struct ComputerStreamer {
    provider: Arc<dyn LlmProvider>,
    call_config: CallConfig,
    tools: Vec<ToolDef>,
    executor: ActionExecutor,
    desktop: Arc<dyn Desktop>,
    instructions: String,
}

impl ComputerStreamer {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        call_config: CallConfig,
        desktop: Arc<dyn Desktop>,
        scaler: Arc<dyn CoordinateScaler>,
    ) -> SurfResult<Self> {
        let executor = ActionExecutor::new(desktop.clone(), scaler.clone());
        Self::assemble(provider, call_config, desktop, scaler, executor, SYSTEM_PROMPT)
    }

    /// Streamer for the registry's active provider, honouring the `[agent]` table.
    pub fn from_config(
        config: &AppConfig,
        registry: &ProviderRegistry,
        desktop: Arc<dyn Desktop>,
        scaler: Arc<dyn CoordinateScaler>,
    ) -> SurfResult<Self> {
        let (provider, call_config) = registry.active_call_config()?;
        let base = config.agent.load_system_prompt()?;
        let executor = ActionExecutor::new(desktop.clone(), scaler.clone())
            .with_default_scroll_clicks(config.agent.default_scroll_clicks);
        Self::assemble(
            provider,
            call_config,
            desktop,
            scaler,
            executor,
            base.as_deref().unwrap_or(SYSTEM_PROMPT),
        )
    }

    fn assemble(
        provider: Arc<dyn LlmProvider>,
        call_config: CallConfig,
        desktop: Arc<dyn Desktop>,
        scaler: Arc<dyn CoordinateScaler>,
        executor: ActionExecutor,
        base_prompt: &str,
    ) -> SurfResult<Self> {
        Ok(Self {
            provider,
            call_config,
            tools: load_builtin_tools()?,
            executor,
            desktop,
            instructions: system_instructions(base_prompt, scaler.scaled_resolution()),
        })
    }

    /// Replaces the system instructions verbatim.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Runs one task request.
    ///
    /// `conversation` is replaced with `[system, ...history, screenshot]` and then
    /// grown in place as turns complete; it can be inspected once the stream is
    /// dropped. `cancel` is polled before each model request and on every chunk.
    pub fn stream<'a>(
        &'a self,
        history: Vec<ChatMessage>,
        conversation: &'a mut Vec<ChatMessage>,
        cancel: CancellationToken,
    ) -> impl Stream<Item = SseEvent> + Send + 'a {
        async_stream::stream! {
            let mut phase = StreamPhase::Init;
            tracing::debug!(phase = phase.as_str(), history = history.len(), "stream started");

            match self.initial_messages(history).await {
                Ok(messages) => *conversation = messages,
                Err(e) => {
                    tracing::error!(error = %e, "initial screenshot failed");
                    yield streaming_error(&e);
                    return;
                }
            }

            let mut turn = 0usize;
            loop {
                if cancel.is_cancelled() {
                    tracing::info!(turn, phase = StreamPhase::Cancelled.as_str(), "stopped before model request");
                    yield SseEvent::cancelled();
                    return;
                }

                turn += 1;
                phase = enter(phase, StreamPhase::AwaitModelTurn, turn);
                let mut chunks = match self
                    .provider
                    .stream_chat(conversation.as_slice(), &self.tools, &self.call_config)
                    .await
                {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::error!(error = %e, turn, phase = StreamPhase::Errored.as_str(), "LLM request failed");
                        yield streaming_error(&e);
                        return;
                    }
                };

                let mut full_content = String::new();
                let mut tool_calls = ToolCallAccumulator::default();

                while let Some(item) = chunks.next().await {
                    if cancel.is_cancelled() {
                        tracing::info!(turn, phase = StreamPhase::Cancelled.as_str(), "stopped mid-stream");
                        yield SseEvent::cancelled();
                        return;
                    }

                    let chunk = match item {
                        Ok(c) => c,
                        Err(e) => {
                            tracing::error!(error = %e, turn, phase = StreamPhase::Errored.as_str(), "LLM stream failed");
                            yield streaming_error(&e);
                            return;
                        }
                    };

                    if let Some(delta) = chunk.content {
                        phase = enter(phase, StreamPhase::StreamingText, turn);
                        full_content.push_str(&delta);
                        yield SseEvent::Update { content: delta };
                    }

                    if !chunk.tool_calls.is_empty() {
                        phase = enter(phase, StreamPhase::AccumulatingToolCalls, turn);
                        tool_calls.merge(&chunk.tool_calls);
                    }

                    match chunk.finish_reason {
                        Some(FinishReason::ToolCalls) if tool_calls.has_complete_calls() => break,
                        Some(FinishReason::Stop) => break,
                        Some(FinishReason::Other(reason)) => {
                            tracing::debug!(turn, reason = %reason, "non-terminal finish reason");
                        }
                        _ => {}
                    }
                }
                drop(chunks);

                let calls = tool_calls.take_calls();
                if calls.is_empty() {
                    enter(phase, StreamPhase::Done, turn);
                    tracing::info!(turn, content_len = full_content.len(), "model finished");
                    conversation.push(ChatMessage::assistant(full_content.clone()));
                    yield SseEvent::Done { content: full_content };
                    return;
                }

                phase = enter(phase, StreamPhase::ExecutingTools, turn);
                tracing::info!(
                    turn,
                    tool_calls = calls.len(),
                    ids = ?calls.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
                    "executing tool calls"
                );

                let mut tool_results = Vec::with_capacity(calls.len());
                let mut completed = 0usize;

                for call in &calls {
                    let result_text = match parse_call(call) {
                        Err(e) => {
                            tracing::warn!(id = %call.id, error = %e, "tool call arguments rejected");
                            yield SseEvent::Error { content: format!("Error executing action: {e}") };
                            format!("Error: {e}")
                        }
                        Ok(ParsedAction { tag, action }) => {
                            yield SseEvent::Action { action: action.clone() };
                            let outcome = self.executor.execute(&action).await;
                            yield SseEvent::ActionCompleted;

                            match outcome {
                                Ok(Some(ActionResponse::ComputerScreenshot { .. })) => {
                                    completed += 1;
                                    "Screenshot taken".to_string()
                                }
                                Ok(None) => {
                                    completed += 1;
                                    format!("Action {tag} completed")
                                }
                                Err(e) => {
                                    tracing::error!(id = %call.id, action = %tag, error = %e, "action failed");
                                    yield SseEvent::Error { content: format!("Error executing action: {e}") };
                                    format!("Error: {e}")
                                }
                            }
                        }
                    };
                    tool_results.push(ChatMessage::tool_result(call.id.clone(), result_text));
                }

                conversation.push(ChatMessage::assistant_tool_calls(full_content, calls));
                conversation.extend(tool_results);

                match screenshot::capture(self.desktop.as_ref()).await {
                    Ok(shot) => {
                        conversation.push(ChatMessage::user_with_image(
                            follow_up_prompt(completed),
                            shot.data_url(),
                        ));
                    }
                    Err(e) => {
                        tracing::error!(error = %e, turn, phase = StreamPhase::Errored.as_str(), "follow-up screenshot failed");
                        yield streaming_error(&e);
                        return;
                    }
                }

                tracing::debug!(turn, completed, messages = conversation.len(), "turn complete, continuing");
            }
        }
    }

    async fn initial_messages(&self, mut history: Vec<ChatMessage>) -> SurfResult<Vec<ChatMessage>> {
        let shot = screenshot::capture(self.desktop.as_ref()).await?;

        if let Some(last) = history.last_mut() {
            if last.role == Role::User {
                last.content.append_text(CURRENT_SCREEN_NOTE);
            }
        }

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(self.instructions.clone()));
        messages.extend(history);
        messages.push(ChatMessage::user_with_image(
            INITIAL_SCREEN_PROMPT,
            shot.data_url(),
        ));
        Ok(messages)
    }
}

fn parse_call(call: &ToolCall) -> SurfResult<ParsedAction> {
    if call.function.name != COMPUTER_USE_TOOL {
        return Err(SurfError::ActionParse(format!(
            "unknown tool '{}'",
            call.function.name
        )));
    }
    parse_action(&call.function.arguments)
}

fn streaming_error(e: &SurfError) -> SseEvent {
    SseEvent::Error {
        content: format!("Streaming error: {e}"),
    }
}

fn enter(from: StreamPhase, to: StreamPhase, turn: usize) -> StreamPhase {
    if from != to {
        tracing::trace!(turn, from = from.as_str(), to = to.as_str(), "phase transition");
    }
    to
}
