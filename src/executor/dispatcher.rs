// Action dispatch onto the remote desktop.
use std::sync::Arc;

use crate::errors::{SurfError, SurfResult};
use crate::executor::action::{Action, ActionResponse, Coordinate};
use crate::executor::coordinator::CoordinateScaler;
use crate::executor::input::{Desktop, DevicePoint};
use crate::perception::screenshot;

pub const DEFAULT_SCROLL_CLICKS: u32 = 3;

/// Runs one [`Action`] at a time against a shared desktop.
pub struct ActionExecutor {
    desktop: Arc<dyn Desktop>,
    scaler: Arc<dyn CoordinateScaler>,
    default_scroll_clicks: u32,
}

impl ActionExecutor {
    pub fn new(desktop: Arc<dyn Desktop>, scaler: Arc<dyn CoordinateScaler>) -> Self {
        Self {
            desktop,
            scaler,
            default_scroll_clicks: DEFAULT_SCROLL_CLICKS,
        }
    }

    pub fn with_default_scroll_clicks(mut self, clicks: u32) -> Self {
        self.default_scroll_clicks = clicks;
        self
    }

    /// Executes the action. Desktop failures become [`SurfError::Executor`];
    /// nothing is retried.
    pub async fn execute(&self, action: &Action) -> SurfResult<Option<ActionResponse>> {
        tracing::debug!(action = action.name(), "executing action");
        self.dispatch(action)
            .await
            .map_err(|e| SurfError::Executor(format!("{} failed: {e}", action.name())))
    }

    async fn dispatch(&self, action: &Action) -> SurfResult<Option<ActionResponse>> {
        let desktop = self.desktop.as_ref();

        match action {
            Action::TakeScreenshot => {
                let shot = screenshot::capture(desktop).await?;
                return Ok(Some(ActionResponse::ComputerScreenshot {
                    image_url: shot.data_url(),
                }));
            }

            Action::Click { coordinate } => {
                let (x, y) = self.to_device(coordinate);
                desktop.left_click(x, y).await?;
            }

            Action::DoubleClick { coordinate } => {
                let (x, y) = self.to_device(coordinate);
                desktop.double_click(x, y).await?;
            }

            Action::RightClick { coordinate } => {
                let (x, y) = self.to_device(coordinate);
                desktop.right_click(x, y).await?;
            }

            Action::Move { coordinate } => {
                let (x, y) = self.to_device(coordinate);
                desktop.move_mouse(x, y).await?;
            }

            Action::Scroll {
                coordinate,
                direction,
                clicks,
            } => {
                let (x, y) = self.to_device(coordinate);
                desktop.move_mouse(x, y).await?;
                desktop
                    .scroll(*direction, clicks.unwrap_or(self.default_scroll_clicks))
                    .await?;
            }

            Action::Type { text } => {
                desktop.write(text).await?;
            }

            Action::Key { key } => {
                desktop.press(key).await?;
            }

            Action::Drag { path } => {
                let start = self.to_device(&[path[0].x, path[0].y]);
                let end = self.to_device(&[path[1].x, path[1].y]);
                desktop.drag(start, end).await?;
            }

            Action::Unknown { tag } => {
                tracing::warn!(tag = %tag, "unknown action type, ignoring");
            }
        }

        Ok(None)
    }

    fn to_device(&self, coordinate: &Coordinate) -> DevicePoint {
        let point = self
            .scaler
            .scale_to_original_space((coordinate[0], coordinate[1]));
        tracing::trace!(
            model_x = coordinate[0],
            model_y = coordinate[1],
            x = point.0,
            y = point.1,
            "model point → device pixel"
        );
        point
    }
}
