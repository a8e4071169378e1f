// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Hardware Abstraction Layer for stagetrack.
//!
//! Defines the narrow contracts the pipeline has with its hardware
//! collaborators — the frame grabber and the motorized stage — and provides
//! simulated implementations (feature `simulated`, on by default) for
//! detached operation, tests, and demos. Vendor-SDK backends implement the
//! same traits out of tree.

mod frame_source;
mod stage;

#[cfg(feature = "simulated")]
mod simulated;

pub use frame_source::FrameSource;
pub use stage::{StageActuator, StagePositionProvider};

#[cfg(feature = "simulated")]
pub use simulated::{SimulatedFrameSource, SimulatedStage};
