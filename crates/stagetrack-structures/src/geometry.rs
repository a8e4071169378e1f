use std::fmt::{Display, Formatter};

/// A pixel location within a segmentation region.
///
/// (0,0) is the top left corner, x grows rightward, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelCoordinate {
    pub x: u32,
    pub y: u32,
}

impl PixelCoordinate {
    pub fn new(x: u32, y: u32) -> PixelCoordinate {
        PixelCoordinate { x, y }
    }
}

impl Display for PixelCoordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A position in stage space, in the stage controller's native units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageCoordinate {
    pub x: f64,
    pub y: f64,
}

impl StageCoordinate {
    pub fn new(x: f64, y: f64) -> StageCoordinate {
        StageCoordinate { x, y }
    }

    /// Returns this coordinate with both axes rounded to one decimal place.
    ///
    /// Display observers receive rounded poses; control math always uses the
    /// unrounded value.
    pub fn rounded_to_tenth(&self) -> StageCoordinate {
        StageCoordinate {
            x: (self.x * 10.0).round() / 10.0,
            y: (self.y * 10.0).round() / 10.0,
        }
    }
}

impl Display for StageCoordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A recentering target handed from the vision stage to the control stage.
///
/// `Invalid` is a defined signal, not an error: it tells the control stage
/// that segmentation currently has no usable object and that no stage command
/// may be issued until tracking is re-armed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageTarget {
    /// A valid recentering position in stage space
    Position(StageCoordinate),
    /// Segmentation failed or tracking is terminating; suppress stage commands
    Invalid,
}

impl StageTarget {
    pub fn is_valid(&self) -> bool {
        matches!(self, StageTarget::Position(_))
    }
}

/// Direction of the previously issued drive command on one stage axis.
///
/// The stage vendor primitive must be told the direction of the previous
/// command so it can stop that motion before starting a new one. The control
/// stage keeps one of these per axis and updates it after every issued
/// command, including zero-velocity stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisDirection {
    Negative,
    Positive,
}

impl AxisDirection {
    /// Direction corresponding to a just-issued velocity. Non-negative
    /// velocities (including exact zero) map to `Positive`.
    pub fn from_velocity(velocity: f64) -> AxisDirection {
        if velocity >= 0.0 {
            AxisDirection::Positive
        } else {
            AxisDirection::Negative
        }
    }

    /// The signed unit value the vendor drive primitive expects (+1 / -1).
    pub fn as_sign(&self) -> i32 {
        match self {
            AxisDirection::Positive => 1,
            AxisDirection::Negative => -1,
        }
    }
}

impl Default for AxisDirection {
    fn default() -> Self {
        AxisDirection::Positive
    }
}

impl Display for AxisDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AxisDirection::Positive => write!(f, "+"),
            AxisDirection::Negative => write!(f, "-"),
        }
    }
}

/// Which lateral half of an acquired frame holds the active tracking region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelSide {
    Left,
    Right,
}

impl Display for PanelSide {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PanelSide::Left => write!(f, "Left"),
            PanelSide::Right => write!(f, "Right"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_from_velocity_signs() {
        assert_eq!(AxisDirection::from_velocity(3.5), AxisDirection::Positive);
        assert_eq!(AxisDirection::from_velocity(-0.1), AxisDirection::Negative);
        assert_eq!(AxisDirection::from_velocity(0.0), AxisDirection::Positive);
    }

    #[test]
    fn direction_as_sign() {
        assert_eq!(AxisDirection::Positive.as_sign(), 1);
        assert_eq!(AxisDirection::Negative.as_sign(), -1);
    }

    #[test]
    fn target_validity() {
        assert!(StageTarget::Position(StageCoordinate::new(1.0, 2.0)).is_valid());
        assert!(!StageTarget::Invalid.is_valid());
    }

    #[test]
    fn pose_rounding() {
        let pose = StageCoordinate::new(12.34, -0.96);
        let rounded = pose.rounded_to_tenth();
        assert_eq!(rounded, StageCoordinate::new(12.3, -1.0));
    }
}
