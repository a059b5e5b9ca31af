pub mod domain;
pub mod ports;
pub mod routine;

pub use domain::{
    AuthSession, CompletionHistoryEntry, CompletionRecord, Exercise, ExerciseId, NewExercise,
    Provenance, RoutineRequest, User, UserCredentials, UserId,
};
pub use ports::{
    AuthSessionRepository, CompletionRepository, ExerciseRepository, PortError, PortResult,
    UserRepository,
};
pub use routine::{add_exercise, propose_routine, record_completions, ROUTINE_SIZE};
