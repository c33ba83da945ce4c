use crate::errors::{SurfError, SurfResult};
use crate::llm::types::ToolDef;

pub const COMPUTER_USE_TOOL: &str = "computer_use";

/// Loads the built-in tool definitions from prompts/tools/computer_use.json.
/// The JSON is embedded at compile time via include_str!.
pub fn load_builtin_tools() -> SurfResult<Vec<ToolDef>> {
    let json = include_str!("../../prompts/tools/computer_use.json");
    serde_json::from_str(json)
        .map_err(|e| SurfError::Config(format!("Failed to parse builtin tools: {e}")))
}
