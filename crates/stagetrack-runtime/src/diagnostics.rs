// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use stagetrack_structures::{LatestValueCell, PixelFrame, SegmentationMask, StageCoordinate};

/// Latest-value cells feeding the operator display.
///
/// Each stage pushes its newest artifact here with no delivery guarantee; a
/// display surface polls whatever is freshest. Cloned handles share the
/// underlying cells, so one block is created at wiring time and handed to
/// every stage.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCells {
    /// Newest acquired frame, orientation-corrected
    pub raw_frame: LatestValueCell<PixelFrame>,
    /// Newest segmentation mask (or the error diagnostic on vision faults)
    pub segmentation_mask: LatestValueCell<SegmentationMask>,
    /// Newest centroid-annotated view
    pub annotated_view: LatestValueCell<PixelFrame>,
    /// Newest stage pose, rounded for display
    pub stage_pose: LatestValueCell<StageCoordinate>,
}

impl DiagnosticCells {
    pub fn new() -> DiagnosticCells {
        DiagnosticCells::default()
    }
}
