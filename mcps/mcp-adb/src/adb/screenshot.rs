use tracing::{debug, info, instrument, warn};

use super::{device_args, Adb};
use crate::error::{AdbError, AdbResult};
use crate::validation::clean_capture;

/// Scratch file used when streaming the capture directly fails
const DEVICE_TMP_PATH: &str = "/sdcard/mcp_adb_screenshot.png";

/// A validated PNG screen capture
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Screenshot {
    fn from_capture(raw: Vec<u8>) -> AdbResult<Self> {
        let (data, info) = clean_capture(raw)?;
        Ok(Self {
            data,
            width: info.width,
            height: info.height,
        })
    }
}

impl Adb {
    /// Capture the screen, falling back to a file on the device if the
    /// streamed capture is unusable
    #[instrument(skip(self))]
    pub async fn screenshot(&self, device: &str) -> AdbResult<Screenshot> {
        match self.capture_direct(device).await {
            Ok(shot) => return Ok(shot),
            Err(AdbError::Timeout { secs }) => return Err(AdbError::Timeout { secs }),
            Err(e) => warn!("direct capture failed: {}, trying device storage", e),
        }

        let shot = self.capture_via_storage(device).await?;
        info!(width = shot.width, height = shot.height, "captured via device storage");
        Ok(shot)
    }

    async fn capture_direct(&self, device: &str) -> AdbResult<Screenshot> {
        let output = self
            .run(device_args(device, ["exec-out", "screencap", "-p"]))
            .await?
            .check()?;
        let shot = Screenshot::from_capture(output.stdout)?;
        debug!(width = shot.width, height = shot.height, "direct capture");
        Ok(shot)
    }

    async fn capture_via_storage(&self, device: &str) -> AdbResult<Screenshot> {
        self.run_checked(device_args(
            device,
            ["shell", "screencap", "-p", DEVICE_TMP_PATH],
        ))
        .await?;

        let pulled = self
            .run(device_args(device, ["exec-out", "cat", DEVICE_TMP_PATH]))
            .await;

        // Remove the scratch file whatever happened to the read
        if let Err(e) = self
            .run(device_args(device, ["shell", "rm", "-f", DEVICE_TMP_PATH]))
            .await
        {
            warn!("failed to remove {}: {}", DEVICE_TMP_PATH, e);
        }

        let output = pulled?.check()?;
        Screenshot::from_capture(output.stdout)
    }
}
