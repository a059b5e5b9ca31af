//! crates/routine_tracker_core/src/routine.rs
//!
//! The routine operations: proposing exercises, recording completions and
//! adding user-submitted catalog entries. Every operation takes the acting
//! user explicitly.

use chrono::Utc;
use std::collections::HashSet;

use crate::domain::{
    CompletionRecord, Exercise, ExerciseId, NewExercise, Provenance, RoutineRequest, UserId,
};
use crate::ports::{CompletionRepository, ExerciseRepository, PortError, PortResult};

/// Maximum number of exercises in one proposed routine.
pub const ROUTINE_SIZE: usize = 5;

/// Proposes up to `ROUTINE_SIZE` exercises matching the request's body part and type.
///
/// For a logged-in user, exercises they have already completed are skipped.
/// The order is the catalog's storage order; there is no ranking.
pub async fn propose_routine(
    exercises: &dyn ExerciseRepository,
    completions: &dyn CompletionRepository,
    request: &RoutineRequest,
    user_id: Option<UserId>,
) -> PortResult<Vec<Exercise>> {
    let candidates = exercises
        .list_exercises_by_filter(&request.body_part, &request.exercise_type)
        .await?;

    let completed: HashSet<ExerciseId> = match user_id {
        Some(user_id) => completions
            .get_completions_by_user(user_id)
            .await?
            .into_iter()
            .map(|record| record.exercise_id)
            .collect(),
        None => HashSet::new(),
    };

    Ok(select_routine(candidates, &completed, ROUTINE_SIZE))
}

/// Drops completed and repeated entries, then truncates to `limit`, keeping order.
pub fn select_routine(
    candidates: Vec<Exercise>,
    completed: &HashSet<ExerciseId>,
    limit: usize,
) -> Vec<Exercise> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|exercise| !completed.contains(&exercise.id))
        .filter(|exercise| seen.insert(exercise.id))
        .take(limit)
        .collect()
}

/// Records one completion per distinct exercise id, all with the same timestamp.
///
/// Repeated ids in one submission are recorded once. The batch is
/// all-or-nothing: an unknown id leaves no records behind.
pub async fn record_completions(
    completions: &dyn CompletionRepository,
    user_id: UserId,
    exercise_ids: &[ExerciseId],
) -> PortResult<Vec<CompletionRecord>> {
    let mut seen = HashSet::new();
    let distinct: Vec<ExerciseId> = exercise_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    if distinct.is_empty() {
        return Err(PortError::Validation(
            "select at least one exercise".to_string(),
        ));
    }

    completions
        .create_completions(user_id, &distinct, Utc::now())
        .await
}

/// Validates and stores a user-submitted catalog entry.
pub async fn add_exercise(
    exercises: &dyn ExerciseRepository,
    mut exercise: NewExercise,
) -> PortResult<Exercise> {
    exercise.provenance = Provenance::User;
    exercise.validate()?;
    exercises.create_exercise(exercise).await
}
