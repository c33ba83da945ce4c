use std::collections::BTreeMap;

use crate::llm::types::{FunctionCall, ToolCall, ToolCallDelta};

/// One tool call being assembled from stream fragments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCallBuilder {
    pub id: String,
    pub call_type: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCallBuilder {
    /// `id`, `type` and `name` take the latest non-empty value; argument text is appended.
    fn merge(&mut self, delta: &ToolCallDelta) {
        if let Some(id) = delta.id.as_deref().filter(|s| !s.is_empty()) {
            self.id = id.to_string();
        }
        if let Some(t) = delta.call_type.as_deref().filter(|s| !s.is_empty()) {
            self.call_type = t.to_string();
        }
        if let Some(function) = &delta.function {
            if let Some(name) = function.name.as_deref().filter(|s| !s.is_empty()) {
                self.name = name.to_string();
            }
            if let Some(args) = &function.arguments {
                self.arguments.push_str(args);
            }
        }
    }

    fn into_tool_call(self) -> ToolCall {
        ToolCall {
            id: self.id,
            call_type: if self.call_type.is_empty() {
                "function".to_string()
            } else {
                self.call_type
            },
            function: FunctionCall {
                name: self.name,
                arguments: self.arguments,
            },
        }
    }
}

/// Tool-call fragments of one model turn, keyed by the stream-reported index.
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    builders: BTreeMap<usize, ToolCallBuilder>,
}

impl ToolCallAccumulator {
    pub fn merge(&mut self, deltas: &[ToolCallDelta]) {
        for delta in deltas {
            self.builders.entry(delta.index).or_default().merge(delta);
        }
    }

    /// True once at least one buffered call has a function name.
    pub fn has_complete_calls(&self) -> bool {
        self.builders.values().any(|b| !b.name.is_empty())
    }

    pub fn get(&self, index: usize) -> Option<&ToolCallBuilder> {
        self.builders.get(&index)
    }

    /// Named calls in index order; nameless fragments are dropped.
    pub fn take_calls(&mut self) -> Vec<ToolCall> {
        std::mem::take(&mut self.builders)
            .into_values()
            .filter(|b| {
                if b.name.is_empty() {
                    tracing::warn!(id = %b.id, "dropping tool call fragment without a function name");
                    false
                } else {
                    true
                }
            })
            .map(ToolCallBuilder::into_tool_call)
            .collect()
    }
}
