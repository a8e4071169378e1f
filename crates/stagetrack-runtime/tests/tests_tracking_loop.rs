//! Tests of the stage control service: direction bookkeeping, proportional
//! drive, the invalid-target stop, and actuator fault surfacing.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use stagetrack_hal::{StageActuator, StagePositionProvider};
use stagetrack_runtime::{ControlSettings, ControlState, DiagnosticCells, StageControlLoop};
use stagetrack_structures::{
    AxisDirection, LatestValueCell, OperatorFlags, StageCoordinate, StageTarget, StageTrackError,
};

//region Helper Functions

#[derive(Debug, Clone, Copy, PartialEq)]
struct DriveCommand {
    x_velocity: f64,
    y_velocity: f64,
    prev_x: AxisDirection,
    prev_y: AxisDirection,
}

/// Actuator that records every command it is given.
#[derive(Clone)]
struct RecordingActuator {
    commands: Arc<Mutex<Vec<DriveCommand>>>,
}

impl RecordingActuator {
    fn new() -> (RecordingActuator, Arc<Mutex<Vec<DriveCommand>>>) {
        let commands = Arc::new(Mutex::new(Vec::new()));
        (
            RecordingActuator {
                commands: Arc::clone(&commands),
            },
            commands,
        )
    }
}

impl StageActuator for RecordingActuator {
    fn connect(&mut self) -> Result<(), StageTrackError> {
        Ok(())
    }

    fn drive(
        &mut self,
        x_velocity: f64,
        y_velocity: f64,
        prev_x_direction: AxisDirection,
        prev_y_direction: AxisDirection,
    ) -> Result<(), StageTrackError> {
        self.commands.lock().unwrap().push(DriveCommand {
            x_velocity,
            y_velocity,
            prev_x: prev_x_direction,
            prev_y: prev_y_direction,
        });
        Ok(())
    }
}

/// Actuator that accepts stops but refuses any nonzero drive.
struct FaultyActuator;

impl StageActuator for FaultyActuator {
    fn connect(&mut self) -> Result<(), StageTrackError> {
        Ok(())
    }

    fn drive(
        &mut self,
        x_velocity: f64,
        y_velocity: f64,
        _prev_x_direction: AxisDirection,
        _prev_y_direction: AxisDirection,
    ) -> Result<(), StageTrackError> {
        if x_velocity != 0.0 || y_velocity != 0.0 {
            return Err(StageTrackError::HardwareFault(
                "Motion controller refused the command".into(),
            ));
        }
        Ok(())
    }
}

/// Position provider pinned at a fixed pose.
struct StaticPosition {
    x: f64,
    y: f64,
}

impl StagePositionProvider for StaticPosition {
    fn get_x(&self) -> f64 {
        self.x
    }

    fn get_y(&self) -> f64 {
        self.y
    }
}

fn fast_settings() -> ControlSettings {
    ControlSettings {
        gain: 6.0,
        poll_interval: Duration::from_millis(5),
        settle_delay: Duration::from_millis(10),
    }
}

fn build_loop(
    actuator: Box<dyn StageActuator>,
    position: Box<dyn StagePositionProvider>,
) -> (StageControlLoop, LatestValueCell<StageTarget>, Arc<OperatorFlags>) {
    let flags = Arc::new(OperatorFlags::new());
    let targets = LatestValueCell::new();
    let control = StageControlLoop::new(
        actuator,
        position,
        Arc::clone(&flags),
        targets.clone(),
        DiagnosticCells::new(),
        fast_settings(),
    )
    .unwrap();
    (control, targets, flags)
}

/// Polls `condition` until it holds or the deadline passes.
fn wait_until(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let started = Instant::now();
    while started.elapsed() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    false
}

//endregion

#[test]
fn directions_follow_issued_velocities() {
    let (actuator, _commands) = RecordingActuator::new();
    let (control, _targets, _flags) = build_loop(
        Box::new(actuator),
        Box::new(StaticPosition { x: 0.0, y: 0.0 }),
    );

    // Scripted sign sequence: +, +, -, 0, -, +. Zero counts as positive.
    let script = [5.0, 2.0, -3.0, 0.0, -1.5, 4.0];
    let expected = [
        AxisDirection::Positive,
        AxisDirection::Positive,
        AxisDirection::Negative,
        AxisDirection::Positive,
        AxisDirection::Negative,
        AxisDirection::Positive,
    ];

    for (velocity, direction) in script.iter().zip(expected.iter()) {
        control.drive_stage(*velocity, *velocity).unwrap();
        let (x_dir, y_dir) = control.get_previous_directions();
        assert_eq!(x_dir, *direction, "x direction after {}", velocity);
        assert_eq!(y_dir, *direction, "y direction after {}", velocity);
    }
}

#[test]
fn actuator_is_told_the_directions_of_the_preceding_command() {
    let (actuator, commands) = RecordingActuator::new();
    let (control, _targets, _flags) = build_loop(
        Box::new(actuator),
        Box::new(StaticPosition { x: 0.0, y: 0.0 }),
    );

    control.drive_stage(3.0, -2.0).unwrap();
    control.drive_stage(-1.0, 0.5).unwrap();
    control.drive_stage(0.0, 0.0).unwrap();

    let recorded = commands.lock().unwrap();
    // First command: bootstrap directions are positive.
    assert_eq!(recorded[0].prev_x, AxisDirection::Positive);
    assert_eq!(recorded[0].prev_y, AxisDirection::Positive);
    // Second command sees the first command's signs.
    assert_eq!(recorded[1].prev_x, AxisDirection::Positive);
    assert_eq!(recorded[1].prev_y, AxisDirection::Negative);
    // The stop sees the second command's signs.
    assert_eq!(recorded[2].prev_x, AxisDirection::Negative);
    assert_eq!(recorded[2].prev_y, AxisDirection::Positive);
}

#[test]
fn tracking_drives_proportionally_toward_target() {
    let (actuator, commands) = RecordingActuator::new();
    let (mut control, targets, _flags) = build_loop(
        Box::new(actuator),
        Box::new(StaticPosition { x: 1.0, y: 2.0 }),
    );
    control.start().unwrap();
    control.set_tracking_enabled(true).unwrap();

    targets.publish(StageTarget::Position(StageCoordinate::new(3.0, -1.0)));

    assert!(wait_until(Duration::from_secs(2), || {
        !commands.lock().unwrap().is_empty()
    }));
    assert_eq!(control.get_state(), ControlState::Tracking);

    let first = commands.lock().unwrap()[0];
    // velocity = gain * (target - pose): 6 * (3 - 1), 6 * (-1 - 2)
    assert!((first.x_velocity - 12.0).abs() < 1e-9);
    assert!((first.y_velocity + 18.0).abs() < 1e-9);

    control.stop();
}

#[test]
fn enabled_without_target_arms_and_waits() {
    let (actuator, commands) = RecordingActuator::new();
    let (mut control, _targets, _flags) = build_loop(
        Box::new(actuator),
        Box::new(StaticPosition { x: 0.0, y: 0.0 }),
    );
    control.start().unwrap();
    control.set_tracking_enabled(true).unwrap();

    assert!(wait_until(Duration::from_secs(2), || {
        control.get_state() == ControlState::Armed
    }));
    thread::sleep(Duration::from_millis(50));
    assert!(commands.lock().unwrap().is_empty());

    control.stop();
}

#[test]
fn invalid_target_issues_exactly_one_stop_until_rearmed() {
    let (actuator, commands) = RecordingActuator::new();
    let (mut control, targets, _flags) = build_loop(
        Box::new(actuator),
        Box::new(StaticPosition { x: 0.0, y: 0.0 }),
    );
    control.start().unwrap();
    control.set_tracking_enabled(true).unwrap();

    targets.publish(StageTarget::Position(StageCoordinate::new(1.0, 1.0)));
    assert!(wait_until(Duration::from_secs(2), || {
        control.get_state() == ControlState::Tracking
    }));

    // Vision signals a failure.
    targets.publish(StageTarget::Invalid);
    assert!(wait_until(Duration::from_secs(2), || {
        control.get_state() == ControlState::Stopped
    }));

    let commands_at_stop: Vec<DriveCommand> = commands.lock().unwrap().clone();
    let last = *commands_at_stop.last().unwrap();
    assert_eq!(last.x_velocity, 0.0);
    assert_eq!(last.y_velocity, 0.0);
    let stops = commands_at_stop
        .iter()
        .filter(|c| c.x_velocity == 0.0 && c.y_velocity == 0.0)
        .count();
    assert_eq!(stops, 1, "exactly one zero-velocity stop expected");

    // Valid targets published while stopped must be discarded.
    targets.publish(StageTarget::Position(StageCoordinate::new(5.0, 5.0)));
    thread::sleep(Duration::from_millis(100));
    assert_eq!(commands.lock().unwrap().len(), commands_at_stop.len());
    assert_eq!(control.get_state(), ControlState::Stopped);

    // Re-arm: toggle off, then on; tracking resumes on the next target.
    control.set_tracking_enabled(false).unwrap();
    control.set_tracking_enabled(true).unwrap();
    targets.publish(StageTarget::Position(StageCoordinate::new(2.0, 0.0)));
    assert!(wait_until(Duration::from_secs(2), || {
        control.get_state() == ControlState::Tracking
    }));

    control.stop();
}

#[test]
fn disabling_tracking_issues_stop_and_goes_idle() {
    let (actuator, commands) = RecordingActuator::new();
    let (mut control, targets, _flags) = build_loop(
        Box::new(actuator),
        Box::new(StaticPosition { x: 0.0, y: 0.0 }),
    );
    control.start().unwrap();
    control.set_tracking_enabled(true).unwrap();
    targets.publish(StageTarget::Position(StageCoordinate::new(1.0, 0.0)));
    assert!(wait_until(Duration::from_secs(2), || {
        control.get_state() == ControlState::Tracking
    }));

    control.set_tracking_enabled(false).unwrap();
    assert!(wait_until(Duration::from_secs(2), || {
        control.get_state() == ControlState::Idle
    }));

    let recorded = commands.lock().unwrap();
    let last = recorded.last().unwrap();
    assert_eq!(last.x_velocity, 0.0);
    assert_eq!(last.y_velocity, 0.0);

    drop(recorded);
    control.stop();
}

#[test]
fn in_loop_actuator_fault_surfaces_on_next_toggle() {
    let (mut control, targets, flags) = build_loop(
        Box::new(FaultyActuator),
        Box::new(StaticPosition { x: 0.0, y: 0.0 }),
    );
    control.start().unwrap();
    control.set_tracking_enabled(true).unwrap();

    targets.publish(StageTarget::Position(StageCoordinate::new(4.0, 0.0)));

    // The drive fails inside the loop; tracking disables itself.
    assert!(wait_until(Duration::from_secs(2), || {
        !flags.is_tracking_enabled()
    }));

    // The stored fault propagates out of the next public call.
    let result = control.set_tracking_enabled(true);
    assert!(matches!(result, Err(StageTrackError::HardwareFault(_))));

    control.stop();
}

#[test]
fn pose_is_published_regardless_of_tracking_state() {
    let (actuator, _commands) = RecordingActuator::new();
    let flags = Arc::new(OperatorFlags::new());
    let targets = LatestValueCell::new();
    let diagnostics = DiagnosticCells::new();
    let mut control = StageControlLoop::new(
        Box::new(actuator),
        Box::new(StaticPosition { x: 12.34, y: -5.67 }),
        Arc::clone(&flags),
        targets.clone(),
        diagnostics.clone(),
        fast_settings(),
    )
    .unwrap();
    control.start().unwrap();

    assert!(wait_until(Duration::from_secs(2), || {
        diagnostics.stage_pose.read_latest().is_some()
    }));
    let pose = diagnostics.stage_pose.read_latest().unwrap();
    assert_eq!(pose, StageCoordinate::new(12.3, -5.7));

    control.stop();
}
