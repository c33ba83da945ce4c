use base64::Engine as _;

use crate::errors::SurfResult;
use crate::executor::input::Desktop;

pub struct ScreenshotResult {
    pub image_base64: String,
    pub byte_len: usize,
}

impl ScreenshotResult {
    pub fn from_png(bytes: &[u8]) -> Self {
        Self {
            image_base64: base64::engine::general_purpose::STANDARD.encode(bytes),
            byte_len: bytes.len(),
        }
    }

    /// `data:` URL suitable for an `image_url` content part.
    pub fn data_url(&self) -> String {
        format!("data:image/png;base64,{}", self.image_base64)
    }
}

/// Captures the sandbox framebuffer.
pub async fn capture(desktop: &dyn Desktop) -> SurfResult<ScreenshotResult> {
    let bytes = desktop.screenshot().await?;
    let shot = ScreenshotResult::from_png(&bytes);
    tracing::debug!(bytes = shot.byte_len, "screenshot captured");
    Ok(shot)
}
