pub mod accumulator;
pub mod engine;
pub mod prompt;
pub mod state;

pub use engine::ComputerStreamer;
pub use state::{SseEvent, StreamPhase};
