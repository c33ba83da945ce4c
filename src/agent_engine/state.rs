use serde::{Deserialize, Serialize};

use crate::errors::SurfResult;
use crate::executor::action::Action;

pub const CANCELLED_MESSAGE: &str = "Generation stopped by user";

/// Events produced by one `stream` invocation, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SseEvent {
    /// Incremental assistant text, forwarded as soon as it arrives.
    Update { content: String },
    /// An action about to be executed.
    Action { action: Action },
    ActionCompleted,
    Error { content: String },
    /// Final turn text, or the cancellation notice.
    Done { content: String },
}

impl SseEvent {
    pub fn cancelled() -> Self {
        SseEvent::Done {
            content: CANCELLED_MESSAGE.to_string(),
        }
    }

    /// Renders one `data:` frame for a server-sent-events response.
    pub fn to_sse_frame(&self) -> SurfResult<String> {
        Ok(format!("data: {}\n\n", serde_json::to_string(self)?))
    }
}

/// Orchestrator states, used for structured logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    Init,
    AwaitModelTurn,
    StreamingText,
    AccumulatingToolCalls,
    ExecutingTools,
    Done,
    Cancelled,
    Errored,
}

impl StreamPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamPhase::Init => "init",
            StreamPhase::AwaitModelTurn => "await_model_turn",
            StreamPhase::StreamingText => "streaming_text",
            StreamPhase::AccumulatingToolCalls => "accumulating_tool_calls",
            StreamPhase::ExecutingTools => "executing_tools",
            StreamPhase::Done => "done",
            StreamPhase::Cancelled => "cancelled",
            StreamPhase::Errored => "errored",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialise_with_snake_case_type_tag() {
        let update = serde_json::to_value(SseEvent::Update { content: "hi".into() }).unwrap();
        assert_eq!(update, serde_json::json!({"type": "update", "content": "hi"}));

        let completed = serde_json::to_value(SseEvent::ActionCompleted).unwrap();
        assert_eq!(completed, serde_json::json!({"type": "action_completed"}));

        let action = serde_json::to_value(SseEvent::Action {
            action: Action::Click { coordinate: [1.0, 2.0] },
        })
        .unwrap();
        assert_eq!(action["type"], "action");
        assert_eq!(action["action"]["action"], "click");
    }

    #[test]
    fn sse_frame_is_data_line_plus_blank_line() {
        let frame = SseEvent::cancelled().to_sse_frame().unwrap();
        assert_eq!(
            frame,
            "data: {\"type\":\"done\",\"content\":\"Generation stopped by user\"}\n\n"
        );
    }
}
