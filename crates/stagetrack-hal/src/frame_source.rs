// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use stagetrack_structures::{PixelFrame, StageTrackError};

/// Contract with the frame grabber.
///
/// `capture` may block on hardware I/O; a failed capture is fatal to that
/// acquisition cycle only, never to the loop. Implementations return frames
/// in the camera's native orientation — the acquisition stage applies the
/// vertical flip itself.
pub trait FrameSource: Send {
    /// Grabs one grayscale frame at the configured ROI resolution.
    fn capture(&mut self) -> Result<PixelFrame, StageTrackError>;

    /// Whether the vendor live stream is currently running.
    ///
    /// Capturing with live mode off is a per-cycle failure; the acquisition
    /// service also refuses to start until live mode is on.
    fn is_live_mode_on(&self) -> bool;

    /// Starts or stops the vendor live stream.
    fn set_live_mode_on(&mut self, enabled: bool);

    /// Restricts the camera readout to the given region. The x extent of the
    /// region runs from `x` to `x + width`, likewise for y.
    fn set_roi(&mut self, x: u32, y: u32, width: u32, height: u32)
        -> Result<(), StageTrackError>;
}
