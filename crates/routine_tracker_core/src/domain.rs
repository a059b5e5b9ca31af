//! crates/routine_tracker_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::ports::PortError;

pub type UserId = i64;
pub type ExerciseId = i64;

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: UserId,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

/// Marks where a catalog entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Loaded from the bundled seed catalog.
    System,
    /// Submitted through the add-exercise form.
    User,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::System => "system",
            Provenance::User => "user",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provenance {
    type Err = PortError;

    /// Accepts the stored tags as well as the seed file's "us" marker.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" | "us" => Ok(Provenance::System),
            "user" => Ok(Provenance::User),
            other => Err(PortError::Validation(format!(
                "unknown provenance tag '{other}'"
            ))),
        }
    }
}

/// One exercise definition in the shared catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: ExerciseId,
    pub name: String,
    pub body_part: String,
    pub exercise_type: String,
    pub sets: i64,
    pub reps: Option<i64>,
    /// Hold duration in seconds.
    pub hold: Option<i64>,
    /// Total duration in seconds.
    pub total_time: i64,
    pub equipment: Option<String>,
    pub state: String,
    pub level: String,
    pub space: Option<String>,
    pub directions: String,
    pub provenance: Provenance,
}

/// A catalog entry that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExercise {
    pub name: String,
    pub body_part: String,
    pub exercise_type: String,
    pub sets: i64,
    pub reps: Option<i64>,
    pub hold: Option<i64>,
    pub total_time: i64,
    pub equipment: Option<String>,
    pub state: String,
    pub level: String,
    pub space: Option<String>,
    pub directions: String,
    pub provenance: Provenance,
}

impl NewExercise {
    /// Checks the mandatory text fields and the numeric ranges.
    pub fn validate(&self) -> Result<(), PortError> {
        let required = [
            ("name", &self.name),
            ("body part", &self.body_part),
            ("type", &self.exercise_type),
            ("state", &self.state),
            ("level", &self.level),
            ("directions", &self.directions),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(PortError::Validation(format!("{field} is required")));
        }
        if self.sets < 1 {
            return Err(PortError::Validation("sets must be at least 1".to_string()));
        }
        if self.total_time < 0 {
            return Err(PortError::Validation(
                "total time cannot be negative".to_string(),
            ));
        }
        if self.reps.is_some_and(|r| r < 0) || self.hold.is_some_and(|h| h < 0) {
            return Err(PortError::Validation(
                "reps and hold cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// A timestamped fact that a user performed an exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    pub id: i64,
    pub user_id: UserId,
    pub exercise_id: ExerciseId,
    pub completed_at: DateTime<Utc>,
}

/// A completion record joined with the catalog fields shown in the history view.
#[derive(Debug, Clone)]
pub struct CompletionHistoryEntry {
    pub record: CompletionRecord,
    pub exercise_name: String,
    pub body_part: String,
    pub exercise_type: String,
}

/// The criteria submitted on the exercise request form.
///
/// Only `body_part` and `exercise_type` narrow the catalog; the remaining
/// criteria are carried so the proposal page can echo them back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutineRequest {
    pub body_part: String,
    pub exercise_type: String,
    /// Available time in minutes.
    pub time_available: u32,
    pub equipment: Vec<String>,
    pub difficulty: Vec<String>,
    pub space: Option<String>,
}
