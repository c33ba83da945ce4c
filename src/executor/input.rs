// Remote desktop input and capture primitives.
use async_trait::async_trait;

use crate::errors::SurfResult;
use crate::executor::action::ScrollDirection;

/// A point on the sandbox's true pixel grid.
pub type DevicePoint = (i32, i32);

/// An already-connected sandbox desktop. All coordinates are device pixels.
#[async_trait]
pub trait Desktop: Send + Sync {
    /// Raw PNG bytes of the current framebuffer.
    async fn screenshot(&self) -> SurfResult<Vec<u8>>;

    async fn left_click(&self, x: i32, y: i32) -> SurfResult<()>;

    async fn right_click(&self, x: i32, y: i32) -> SurfResult<()>;

    async fn double_click(&self, x: i32, y: i32) -> SurfResult<()>;

    async fn move_mouse(&self, x: i32, y: i32) -> SurfResult<()>;

    /// Types literal text.
    async fn write(&self, text: &str) -> SurfResult<()>;

    /// Presses one key using the desktop's own key-name vocabulary.
    async fn press(&self, key: &str) -> SurfResult<()>;

    /// Scrolls at the current pointer position.
    async fn scroll(&self, direction: ScrollDirection, clicks: u32) -> SurfResult<()>;

    async fn drag(&self, start: DevicePoint, end: DevicePoint) -> SurfResult<()>;
}
