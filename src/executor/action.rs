use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{SurfError, SurfResult};

/// `[x, y]` in model space (the scaled resolution advertised to the model).
pub type Coordinate = [f64; 2];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
}

/// Anything other than `up` scrolls down, including `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum ScrollDirection {
    Up,
    #[default]
    Down,
}

impl From<Option<String>> for ScrollDirection {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref() {
            Some("up") => ScrollDirection::Up,
            _ => ScrollDirection::Down,
        }
    }
}

/// Accepts any JSON number. Values that round below 1 count as absent.
fn clicks_from_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw
        .map(f64::round)
        .filter(|n| *n >= 1.0)
        .map(|n| n.min(u32::MAX as f64) as u32))
}

const SUPPORTED_TAGS: [&str; 9] = [
    "take_screenshot",
    "click",
    "double_click",
    "right_click",
    "type",
    "key",
    "scroll",
    "move",
    "drag",
];

/// One desktop operation requested through the `computer_use` tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    TakeScreenshot,
    Click {
        coordinate: Coordinate,
    },
    DoubleClick {
        coordinate: Coordinate,
    },
    RightClick {
        coordinate: Coordinate,
    },
    Type {
        text: String,
    },
    Key {
        key: String,
    },
    Scroll {
        coordinate: Coordinate,
        #[serde(default)]
        direction: ScrollDirection,
        #[serde(
            default,
            deserialize_with = "clicks_from_number",
            skip_serializing_if = "Option::is_none"
        )]
        clicks: Option<u32>,
    },
    Move {
        coordinate: Coordinate,
    },
    Drag {
        path: [PathPoint; 2],
    },
    /// Tag outside the known set, kept as sent; executing it is a no-op.
    Unknown {
        tag: String,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::TakeScreenshot => "take_screenshot",
            Action::Click { .. } => "click",
            Action::DoubleClick { .. } => "double_click",
            Action::RightClick { .. } => "right_click",
            Action::Type { .. } => "type",
            Action::Key { .. } => "key",
            Action::Scroll { .. } => "scroll",
            Action::Move { .. } => "move",
            Action::Drag { .. } => "drag",
            Action::Unknown { .. } => "unknown",
        }
    }
}

/// A tool call's arguments decoded into an action, keeping the tag the model sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAction {
    pub tag: String,
    pub action: Action,
}

/// Decodes `computer_use` argument text.
///
/// Invalid JSON, a missing `action` tag, or bad fields for a known tag are
/// parse errors. An unrecognised tag decodes to [`Action::Unknown`] carrying
/// that tag.
pub fn parse_action(arguments: &str) -> SurfResult<ParsedAction> {
    let value: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| SurfError::ActionParse(format!("invalid arguments JSON: {e}")))?;
    let tag = value
        .get("action")
        .and_then(|a| a.as_str())
        .ok_or_else(|| SurfError::ActionParse("missing \"action\" field".into()))?
        .to_string();
    if !SUPPORTED_TAGS.contains(&tag.as_str()) {
        tracing::warn!(tag = %tag, "unknown action tag from model");
        let action = Action::Unknown { tag: tag.clone() };
        return Ok(ParsedAction { tag, action });
    }
    let action: Action = serde_json::from_value(value)
        .map_err(|e| SurfError::ActionParse(format!("invalid {tag} arguments: {e}")))?;
    Ok(ParsedAction { tag, action })
}

/// Result payload of an action; only screenshots produce one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionResponse {
    ComputerScreenshot { image_url: String },
}
