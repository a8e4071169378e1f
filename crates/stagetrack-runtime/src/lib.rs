// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Runtime services for stagetrack.
//!
//! Three indefinitely-running thread services form the tracking pipeline:
//!
//! - [`AcquisitionLoop`]: grabs frames, corrects orientation, publishes
//! - [`VisionLoop`]: segments the active panel, publishes stage targets
//! - [`StageControlLoop`]: proportional controller driving the stage
//!
//! Stages communicate only through [`LatestValueCell`]s (freshness over
//! completeness; consumers skip what they miss) and the shared
//! [`OperatorFlags`] block. Nothing here assumes a UI thread or an event
//! loop.
//!
//! [`LatestValueCell`]: stagetrack_structures::LatestValueCell
//! [`OperatorFlags`]: stagetrack_structures::OperatorFlags

mod acquisition;
mod control;
mod diagnostics;
mod vision_loop;

pub use acquisition::AcquisitionLoop;
pub use control::{ControlSettings, ControlState, StageControlLoop};
pub use diagnostics::DiagnosticCells;
pub use vision_loop::{VisionLoop, VisionSettings};
