//! services/web/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::DbAdapter;
use crate::config::Config;
use crate::web::session::SessionSigner;
use routine_tracker_core::ports::{
    AuthSessionRepository, CompletionRepository, ExerciseRepository, UserRepository,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub exercises: Arc<dyn ExerciseRepository>,
    pub completions: Arc<dyn CompletionRepository>,
    pub auth_sessions: Arc<dyn AuthSessionRepository>,
    pub config: Arc<Config>,
    pub signer: SessionSigner,
}

impl AppState {
    /// Wires every repository port to the same database adapter.
    pub fn new(db: DbAdapter, config: Arc<Config>) -> Self {
        let db = Arc::new(db);
        Self {
            users: db.clone(),
            exercises: db.clone(),
            completions: db.clone(),
            auth_sessions: db,
            signer: SessionSigner::new(config.session_secret.as_bytes()),
            config,
        }
    }
}
