//! Shared test doubles: a scripted streaming provider and a recording desktop.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::StreamExt;

use surf_agent::errors::{SurfError, SurfResult};
use surf_agent::executor::{Desktop, DevicePoint, ResolutionScaler, ScrollDirection};
use surf_agent::llm::provider::{ChunkStream, LlmProvider};
use surf_agent::llm::types::{
    CallConfig, ChatChunk, ChatMessage, FinishReason, FunctionCallDelta, ToolCallDelta, ToolDef,
};
use surf_agent::ComputerStreamer;

pub const FAKE_PNG: &[u8] = b"\x89PNG fake";

#[derive(Debug, Clone, PartialEq)]
pub enum DesktopCall {
    Screenshot,
    LeftClick(i32, i32),
    RightClick(i32, i32),
    DoubleClick(i32, i32),
    MoveMouse(i32, i32),
    Write(String),
    Press(String),
    Scroll(ScrollDirection, u32),
    Drag(DevicePoint, DevicePoint),
}

/// Records every call; `press` fails for keys listed in `rejected_keys`.
#[derive(Default)]
pub struct RecordingDesktop {
    calls: Mutex<Vec<DesktopCall>>,
    rejected_keys: Vec<String>,
    fail_screenshots: AtomicBool,
}

impl RecordingDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_keys(keys: &[&str]) -> Self {
        Self {
            rejected_keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn fail_screenshots(&self) {
        self.fail_screenshots.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<DesktopCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than screenshots, i.e. the ones that mutate the desktop.
    pub fn input_calls(&self) -> Vec<DesktopCall> {
        self.calls()
            .into_iter()
            .filter(|c| *c != DesktopCall::Screenshot)
            .collect()
    }

    fn record(&self, call: DesktopCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Desktop for RecordingDesktop {
    async fn screenshot(&self) -> SurfResult<Vec<u8>> {
        if self.fail_screenshots.load(Ordering::SeqCst) {
            return Err(SurfError::Desktop("framebuffer unavailable".into()));
        }
        self.record(DesktopCall::Screenshot);
        Ok(FAKE_PNG.to_vec())
    }

    async fn left_click(&self, x: i32, y: i32) -> SurfResult<()> {
        self.record(DesktopCall::LeftClick(x, y));
        Ok(())
    }

    async fn right_click(&self, x: i32, y: i32) -> SurfResult<()> {
        self.record(DesktopCall::RightClick(x, y));
        Ok(())
    }

    async fn double_click(&self, x: i32, y: i32) -> SurfResult<()> {
        self.record(DesktopCall::DoubleClick(x, y));
        Ok(())
    }

    async fn move_mouse(&self, x: i32, y: i32) -> SurfResult<()> {
        self.record(DesktopCall::MoveMouse(x, y));
        Ok(())
    }

    async fn write(&self, text: &str) -> SurfResult<()> {
        self.record(DesktopCall::Write(text.to_string()));
        Ok(())
    }

    async fn press(&self, key: &str) -> SurfResult<()> {
        if self.rejected_keys.iter().any(|k| k == key) {
            return Err(SurfError::Desktop(format!("invalid key name: {key}")));
        }
        self.record(DesktopCall::Press(key.to_string()));
        Ok(())
    }

    async fn scroll(&self, direction: ScrollDirection, clicks: u32) -> SurfResult<()> {
        self.record(DesktopCall::Scroll(direction, clicks));
        Ok(())
    }

    async fn drag(&self, start: DevicePoint, end: DevicePoint) -> SurfResult<()> {
        self.record(DesktopCall::Drag(start, end));
        Ok(())
    }
}

/// One scripted model turn: the items its chunk stream yields.
pub type Turn = Vec<SurfResult<ChatChunk>>;

/// Provider that replays queued turns and records each request's messages.
pub struct ScriptedProvider {
    turns: Mutex<VecDeque<Turn>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
    pulled: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            requests: Mutex::new(Vec::new()),
            pulled: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, n: usize) -> Vec<ChatMessage> {
        self.requests.lock().unwrap()[n].clone()
    }

    /// Chunks handed out across all turns.
    pub fn chunks_pulled(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn stream_chat(
        &self,
        messages: &[ChatMessage],
        _tools: &[ToolDef],
        _cfg: &CallConfig,
    ) -> SurfResult<ChunkStream> {
        self.requests.lock().unwrap().push(messages.to_vec());
        let turn = self
            .turns
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| SurfError::LlmProvider("no scripted turn left".into()))?;
        let pulled = self.pulled.clone();
        let stream = futures_util::stream::iter(turn).inspect(move |_| {
            pulled.fetch_add(1, Ordering::SeqCst);
        });
        Ok(Box::pin(stream))
    }
}

pub fn text(delta: &str) -> SurfResult<ChatChunk> {
    Ok(ChatChunk {
        content: Some(delta.to_string()),
        ..Default::default()
    })
}

pub fn finish(reason: FinishReason) -> SurfResult<ChatChunk> {
    Ok(ChatChunk {
        finish_reason: Some(reason),
        ..Default::default()
    })
}

/// Opening fragment of a `computer_use` call.
pub fn tool_head(index: usize, id: &str) -> SurfResult<ChatChunk> {
    Ok(ChatChunk {
        tool_calls: vec![ToolCallDelta {
            index,
            id: Some(id.to_string()),
            call_type: Some("function".into()),
            function: Some(FunctionCallDelta {
                name: Some("computer_use".into()),
                arguments: Some(String::new()),
            }),
        }],
        ..Default::default()
    })
}

pub fn tool_args(index: usize, args: &str) -> SurfResult<ChatChunk> {
    Ok(ChatChunk {
        tool_calls: vec![ToolCallDelta {
            index,
            function: Some(FunctionCallDelta {
                name: None,
                arguments: Some(args.to_string()),
            }),
            ..Default::default()
        }],
        ..Default::default()
    })
}

/// A full tool-call turn: head, arguments split into `piece`-byte chunks, finish.
pub fn tool_turn(calls: &[(&str, &str)], piece: usize) -> Turn {
    let mut turn = Vec::new();
    for (index, (id, args)) in calls.iter().enumerate() {
        turn.push(tool_head(index, id));
        for part in args.as_bytes().chunks(piece.max(1)) {
            turn.push(tool_args(index, std::str::from_utf8(part).unwrap()));
        }
    }
    turn.push(finish(FinishReason::ToolCalls));
    turn
}

pub fn stop_turn(reply: &str) -> Turn {
    vec![text(reply), finish(FinishReason::Stop)]
}

pub fn call_config() -> CallConfig {
    CallConfig {
        model: "test-model".into(),
        temperature: 0.7,
        top_p: Some(0.8),
        max_tokens: 4096,
    }
}

/// Model space 1280×800 over a 1920×1200 device (factor 1.5).
pub fn scaler() -> Arc<ResolutionScaler> {
    Arc::new(ResolutionScaler::new((1920, 1200), (1280, 800)))
}

pub fn streamer(provider: Arc<ScriptedProvider>, desktop: Arc<RecordingDesktop>) -> ComputerStreamer {
    ComputerStreamer::new(provider, call_config(), desktop, scaler()).expect("builtin tools parse")
}
