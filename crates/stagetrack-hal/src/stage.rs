// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use stagetrack_structures::{AxisDirection, StageTrackError};

/// Contract for reading the live stage position.
///
/// Non-blocking; always returns a value. The control stage reads through
/// this every cycle and never caches a pose beyond the cycle that read it.
pub trait StagePositionProvider: Send {
    fn get_x(&self) -> f64;
    fn get_y(&self) -> f64;
}

/// Contract with the stage motion controller.
///
/// The vendor drive primitive stops the previous movement before starting a
/// new one and must be told which direction that previous movement went, per
/// axis. Passing a wrong previous direction is a vendor-level fault, which
/// is why the control stage books directions after every command it issues.
pub trait StageActuator: Send {
    /// Establishes the vendor connection. Must be called once before the
    /// first `drive`.
    fn connect(&mut self) -> Result<(), StageTrackError>;

    /// Starts stage motion at the given axis velocities, first stopping the
    /// previous movement using the remembered directions.
    fn drive(
        &mut self,
        x_velocity: f64,
        y_velocity: f64,
        prev_x_direction: AxisDirection,
        prev_y_direction: AxisDirection,
    ) -> Result<(), StageTrackError>;
}
