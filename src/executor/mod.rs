pub mod action;
pub mod coordinator;
pub mod dispatcher;
pub mod input;

pub use action::{parse_action, Action, ActionResponse, ParsedAction, ScrollDirection};
pub use coordinator::{CoordinateScaler, ResolutionScaler};
pub use dispatcher::ActionExecutor;
pub use input::{Desktop, DevicePoint};
