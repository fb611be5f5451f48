//! Enrollment domain types.

use serde::{Deserialize, Serialize};

/// Enrollment status.
///
/// At most one enrollment exists per `(student, period)`. Once `Active`, an
/// enrollment may move to `Completed` or `Dropped`; terminal states do not
/// transition further except via explicit reactivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// The student is currently enrolled.
    Active,
    /// The enrollment period was completed (e.g. via promotion).
    Completed,
    /// The student dropped out of the class.
    Dropped,
}

impl EnrollmentStatus {
    /// Returns true for states that accept no further transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Dropped)
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::Dropped => write!(f, "dropped"),
        }
    }
}

/// Attendance status for a single day's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Present in class.
    Present,
    /// Absent without excuse.
    Absent,
    /// Arrived late.
    Late,
    /// Absent with excuse.
    Excused,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!EnrollmentStatus::Active.is_terminal());
        assert!(EnrollmentStatus::Completed.is_terminal());
        assert!(EnrollmentStatus::Dropped.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(EnrollmentStatus::Active.to_string(), "active");
        assert_eq!(EnrollmentStatus::Completed.to_string(), "completed");
        assert_eq!(EnrollmentStatus::Dropped.to_string(), "dropped");
    }
}
