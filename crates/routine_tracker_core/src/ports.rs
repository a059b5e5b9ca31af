//! crates/routine_tracker_core/src/ports.rs
//!
//! Defines the repository contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the storage technology behind them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    CompletionHistoryEntry, CompletionRecord, Exercise, ExerciseId, NewExercise, User,
    UserCredentials, UserId,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Repository Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `PortError::Conflict` when the email is already registered.
    async fn create_user(&self, email: &str, hashed_password: &str) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user_by_id(&self, user_id: UserId) -> PortResult<User>;

    async fn count_users(&self) -> PortResult<i64>;
}

#[async_trait]
pub trait ExerciseRepository: Send + Sync {
    async fn create_exercise(&self, exercise: NewExercise) -> PortResult<Exercise>;

    /// Inserts every entry in a single transaction and returns how many were written.
    async fn create_exercises(&self, exercises: Vec<NewExercise>) -> PortResult<usize>;

    async fn get_exercise_by_id(&self, exercise_id: ExerciseId) -> PortResult<Exercise>;

    async fn count_exercises(&self) -> PortResult<i64>;

    /// Exact-match filter, returned in storage order.
    async fn list_exercises_by_filter(
        &self,
        body_part: &str,
        exercise_type: &str,
    ) -> PortResult<Vec<Exercise>>;
}

#[async_trait]
pub trait CompletionRepository: Send + Sync {
    /// Writes one record per id in a single transaction. An unknown exercise id
    /// fails the whole batch with `PortError::NotFound`.
    async fn create_completions(
        &self,
        user_id: UserId,
        exercise_ids: &[ExerciseId],
        completed_at: DateTime<Utc>,
    ) -> PortResult<Vec<CompletionRecord>>;

    async fn create_completion(
        &self,
        user_id: UserId,
        exercise_id: ExerciseId,
        completed_at: DateTime<Utc>,
    ) -> PortResult<CompletionRecord> {
        self.create_completions(user_id, &[exercise_id], completed_at)
            .await?
            .pop()
            .ok_or_else(|| PortError::Unexpected("completion was not recorded".to_string()))
    }

    async fn get_completions_by_user(&self, user_id: UserId) -> PortResult<Vec<CompletionRecord>>;

    /// Newest first, joined with the exercise names.
    async fn get_history_by_user(&self, user_id: UserId)
        -> PortResult<Vec<CompletionHistoryEntry>>;
}

#[async_trait]
pub trait AuthSessionRepository: Send + Sync {
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the owning user for an unexpired session.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<UserId>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}
