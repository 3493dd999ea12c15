//! Domain types shared with the kinematics collaborator.

/// High-level condition reported by the kinematics collaborator.
///
/// `Install`, `Calibrate` and `Boot` are entered through the matching
/// collaborator calls and are the only modes that survive a restart.
/// `Action` is entered through `active_mode()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RobotMode {
    Install = 0,
    Calibrate = 1,
    Boot = 2,
    Action = 3,
}

impl RobotMode {
    /// Raw discriminant, used for the lock-free status cell.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`as_u8`](Self::as_u8).
    pub const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Install),
            1 => Some(Self::Calibrate),
            2 => Some(Self::Boot),
            3 => Some(Self::Action),
            _ => None,
        }
    }

    /// Whether this mode is written to the boot-state byte.
    pub const fn is_persisted(self) -> bool {
        !matches!(self, Self::Action)
    }
}

/// Cartesian point (or displacement) in the body frame, millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}
