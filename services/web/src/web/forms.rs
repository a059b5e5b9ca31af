//! services/web/src/web/forms.rs
//!
//! Raw form payloads and the validation boundary that turns them into typed
//! inputs for the core operations. Nothing past this module sees an unparsed
//! string from the browser.

use routine_tracker_core::{ExerciseId, NewExercise, PortError, PortResult, Provenance, RoutineRequest};
use serde::Deserialize;

//=========================================================================================
// Request Payloads
//=========================================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RoutineForm {
    pub body_part: String,
    #[serde(rename = "type")]
    pub exercise_type: String,
    pub time_available: String,
    pub equipment: Vec<String>,
    pub difficulty: Vec<String>,
    pub space: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CompletionForm {
    pub exercise_id: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddExerciseForm {
    pub name: String,
    pub body_part: String,
    #[serde(rename = "type")]
    pub exercise_type: String,
    pub sets: String,
    pub reps: String,
    pub hold: String,
    pub total_time: String,
    pub equipment: String,
    pub state: String,
    pub level: String,
    pub space: String,
    pub directions: String,
}

//=========================================================================================
// Validated Inputs
//=========================================================================================

/// Credentials accepted for a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
}

/// Emails are compared trimmed and lowercased everywhere.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl RegisterForm {
    pub fn validate(&self) -> PortResult<Registration> {
        let email = normalize_email(&self.email);
        if email.is_empty() || !email.contains('@') {
            return Err(PortError::Validation(
                "Please enter a valid email address.".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(PortError::Validation("Please choose a password.".to_string()));
        }
        if self.password != self.confirm_password {
            return Err(PortError::Validation("Passwords do not match!".to_string()));
        }
        Ok(Registration {
            email,
            password: self.password.clone(),
        })
    }
}

impl RoutineForm {
    pub fn validate(&self) -> PortResult<RoutineRequest> {
        let body_part = required_text("Body part", &self.body_part)?;
        let exercise_type = required_text("Type", &self.exercise_type)?;
        let time_available = self.time_available.trim().parse::<u32>().map_err(|_| {
            PortError::Validation("Time available must be a whole number of minutes.".to_string())
        })?;

        Ok(RoutineRequest {
            body_part,
            exercise_type,
            time_available,
            equipment: non_blank(&self.equipment),
            difficulty: non_blank(&self.difficulty),
            space: self.space.as_deref().and_then(optional_text),
        })
    }
}

impl CompletionForm {
    pub fn exercise_ids(&self) -> PortResult<Vec<ExerciseId>> {
        self.exercise_id
            .iter()
            .map(|raw| {
                raw.trim().parse::<ExerciseId>().map_err(|_| {
                    PortError::Validation(format!("'{}' is not an exercise id", raw))
                })
            })
            .collect()
    }
}

impl AddExerciseForm {
    pub fn validate(&self) -> PortResult<NewExercise> {
        let exercise = NewExercise {
            name: required_text("Name", &self.name)?,
            body_part: required_text("Body part", &self.body_part)?,
            exercise_type: required_text("Type", &self.exercise_type)?,
            sets: required_count("Sets", &self.sets)?,
            reps: optional_count("Reps", &self.reps)?,
            hold: optional_count("Hold", &self.hold)?,
            total_time: required_count("Total time", &self.total_time)?,
            equipment: optional_text(&self.equipment),
            state: required_text("State", &self.state)?,
            level: required_text("Level", &self.level)?,
            space: optional_text(&self.space),
            directions: required_text("Directions", &self.directions)?,
            provenance: Provenance::User,
        };
        exercise.validate()?;
        Ok(exercise)
    }
}

//=========================================================================================
// Field Helpers
//=========================================================================================

fn required_text(field: &str, value: &str) -> PortResult<String> {
    optional_text(value).ok_or_else(|| PortError::Validation(format!("{} is required.", field)))
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn required_count(field: &str, value: &str) -> PortResult<i64> {
    optional_count(field, value)?
        .ok_or_else(|| PortError::Validation(format!("{} is required.", field)))
}

fn optional_count(field: &str, value: &str) -> PortResult<Option<i64>> {
    let Some(trimmed) = optional_text(value) else {
        return Ok(None);
    };
    trimmed
        .parse::<u32>()
        .map(|n| Some(i64::from(n)))
        .map_err(|_| PortError::Validation(format!("{} must be a whole number.", field)))
}

fn non_blank(values: &[String]) -> Vec<String> {
    values.iter().filter_map(|v| optional_text(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_form() -> AddExerciseForm {
        AddExerciseForm {
            name: " Clamshell ".to_string(),
            body_part: "Hip".to_string(),
            exercise_type: "Strength".to_string(),
            sets: "3".to_string(),
            reps: "15".to_string(),
            hold: "".to_string(),
            total_time: "240".to_string(),
            equipment: "Band".to_string(),
            state: "Chronic".to_string(),
            level: "Beginner".to_string(),
            space: " ".to_string(),
            directions: "Open the top knee against the band.".to_string(),
        }
    }

    #[test]
    fn register_rejects_mismatched_confirmation() {
        let form = RegisterForm {
            email: "a@example.com".to_string(),
            password: "secret".to_string(),
            confirm_password: "secreT".to_string(),
        };
        assert!(matches!(form.validate(), Err(PortError::Validation(_))));
    }

    #[test]
    fn register_normalizes_email() {
        let form = RegisterForm {
            email: "  Someone@Example.COM ".to_string(),
            password: "secret".to_string(),
            confirm_password: "secret".to_string(),
        };
        assert_eq!(form.validate().unwrap().email, "someone@example.com");
    }

    #[test]
    fn routine_form_requires_numeric_time() {
        let form = RoutineForm {
            body_part: "Knee".to_string(),
            exercise_type: "Strength".to_string(),
            time_available: "ten".to_string(),
            ..Default::default()
        };
        assert!(matches!(form.validate(), Err(PortError::Validation(_))));
    }

    #[test]
    fn routine_form_keeps_unapplied_criteria() {
        let form = RoutineForm {
            body_part: "Knee".to_string(),
            exercise_type: "Strength".to_string(),
            time_available: " 20 ".to_string(),
            equipment: vec!["Band".to_string(), "".to_string()],
            difficulty: vec!["Beginner".to_string()],
            space: Some("Small".to_string()),
        };
        let request = form.validate().unwrap();
        assert_eq!(request.time_available, 20);
        assert_eq!(request.equipment, vec!["Band".to_string()]);
        assert_eq!(request.space.as_deref(), Some("Small"));
    }

    #[test]
    fn completion_ids_must_be_numeric() {
        let form = CompletionForm {
            exercise_id: vec!["3".to_string(), "x".to_string()],
        };
        assert!(form.exercise_ids().is_err());

        let form = CompletionForm {
            exercise_id: vec!["3".to_string(), " 4".to_string()],
        };
        assert_eq!(form.exercise_ids().unwrap(), vec![3, 4]);
    }

    #[test]
    fn add_exercise_parses_optional_fields() {
        let exercise = add_form().validate().unwrap();
        assert_eq!(exercise.name, "Clamshell");
        assert_eq!(exercise.reps, Some(15));
        assert_eq!(exercise.hold, None);
        assert_eq!(exercise.space, None);
        assert_eq!(exercise.provenance, Provenance::User);
    }

    #[test]
    fn add_exercise_rejects_missing_or_malformed_fields() {
        let mut form = add_form();
        form.directions.clear();
        assert!(matches!(form.validate(), Err(PortError::Validation(_))));

        let mut form = add_form();
        form.sets = "-1".to_string();
        assert!(matches!(form.validate(), Err(PortError::Validation(_))));

        let mut form = add_form();
        form.total_time = "".to_string();
        assert!(matches!(form.validate(), Err(PortError::Validation(_))));
    }
}
