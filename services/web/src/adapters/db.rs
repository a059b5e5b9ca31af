//! services/web/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the repository ports from the `core` crate. It handles all interactions
//! with the SQLite database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use routine_tracker_core::domain::{
    CompletionHistoryEntry, CompletionRecord, Exercise, ExerciseId, NewExercise, User,
    UserCredentials, UserId,
};
use routine_tracker_core::ports::{
    AuthSessionRepository, CompletionRepository, ExerciseRepository, PortError, PortResult,
    UserRepository,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::str::FromStr;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements every repository port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: SqlitePool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool for the given SQLite URL, creating the database file if needed.
    ///
    /// An in-memory database lives only as long as its connection, so it gets a
    /// single connection that is never recycled.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(5);
        if database_url.contains(":memory:") {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None::<std::time::Duration>)
                .max_lifetime(None::<std::time::Duration>);
        }

        let pool = pool_options.connect_with(options).await?;
        Ok(Self::new(pool))
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    email: String,
    password_hash: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
        }
    }

    fn to_credentials(self) -> UserCredentials {
        UserCredentials {
            user_id: self.id,
            email: self.email,
            hashed_password: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct ExerciseRecord {
    id: i64,
    name: String,
    body_part: String,
    exercise_type: String,
    sets: i64,
    reps: Option<i64>,
    hold: Option<i64>,
    total_time: i64,
    equipment: Option<String>,
    state: String,
    level: String,
    space: Option<String>,
    directions: String,
    added_by: String,
}
impl ExerciseRecord {
    fn to_domain(self) -> PortResult<Exercise> {
        let provenance = self.added_by.parse().map_err(|_| {
            PortError::Unexpected(format!(
                "Exercise {} has an unknown provenance '{}'",
                self.id, self.added_by
            ))
        })?;
        Ok(Exercise {
            id: self.id,
            name: self.name,
            body_part: self.body_part,
            exercise_type: self.exercise_type,
            sets: self.sets,
            reps: self.reps,
            hold: self.hold,
            total_time: self.total_time,
            equipment: self.equipment,
            state: self.state,
            level: self.level,
            space: self.space,
            directions: self.directions,
            provenance,
        })
    }
}

#[derive(FromRow)]
struct CompletionRow {
    id: i64,
    user_id: i64,
    exercise_id: i64,
    completed_at: DateTime<Utc>,
}
impl CompletionRow {
    fn to_domain(self) -> CompletionRecord {
        CompletionRecord {
            id: self.id,
            user_id: self.user_id,
            exercise_id: self.exercise_id,
            completed_at: self.completed_at,
        }
    }
}

#[derive(FromRow)]
struct HistoryRow {
    id: i64,
    user_id: i64,
    exercise_id: i64,
    completed_at: DateTime<Utc>,
    name: String,
    body_part: String,
    exercise_type: String,
}
impl HistoryRow {
    fn to_domain(self) -> CompletionHistoryEntry {
        CompletionHistoryEntry {
            record: CompletionRecord {
                id: self.id,
                user_id: self.user_id,
                exercise_id: self.exercise_id,
                completed_at: self.completed_at,
            },
            exercise_name: self.name,
            body_part: self.body_part,
            exercise_type: self.exercise_type,
        }
    }
}

#[derive(FromRow)]
struct AuthSessionRow {
    user_id: i64,
    expires_at: DateTime<Utc>,
}

const EXERCISE_COLUMNS: &str = "id, name, body_part, exercise_type, sets, reps, hold, total_time, \
     equipment, state, level, space, directions, added_by";

//=========================================================================================
// Error Mapping and Shared Statements
//=========================================================================================

/// Maps constraint violations onto the port taxonomy; everything else is unexpected.
fn map_db_error(e: sqlx::Error, context: &str) -> PortError {
    match &e {
        sqlx::Error::RowNotFound => PortError::NotFound(context.to_string()),
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            PortError::Conflict(context.to_string())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            PortError::NotFound(context.to_string())
        }
        sqlx::Error::Database(db) if db.is_check_violation() => {
            PortError::Validation(context.to_string())
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

async fn insert_exercise(
    conn: &mut SqliteConnection,
    exercise: &NewExercise,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO exercises (name, body_part, exercise_type, sets, reps, hold, total_time, \
         equipment, state, level, space, directions, added_by) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&exercise.name)
    .bind(&exercise.body_part)
    .bind(&exercise.exercise_type)
    .bind(exercise.sets)
    .bind(exercise.reps)
    .bind(exercise.hold)
    .bind(exercise.total_time)
    .bind(&exercise.equipment)
    .bind(&exercise.state)
    .bind(&exercise.level)
    .bind(&exercise.space)
    .bind(&exercise.directions)
    .bind(exercise.provenance.as_str())
    .execute(&mut *conn)
    .await?;
    Ok(result.last_insert_rowid())
}

//=========================================================================================
// Repository Trait Implementations
//=========================================================================================

#[async_trait]
impl UserRepository for DbAdapter {
    async fn create_user(&self, email: &str, hashed_password: &str) -> PortResult<User> {
        let result = sqlx::query(
            "INSERT INTO users (email, password_hash, created_at) VALUES (?, ?, ?)",
        )
        .bind(email)
        .bind(hashed_password)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Email is already registered"))?;

        Ok(User {
            id: result.last_insert_rowid(),
            email: email.to_string(),
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "No user with that email"))?;
        Ok(record.to_credentials())
    }

    async fn get_user_by_id(&self, user_id: UserId) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn count_users(&self) -> PortResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

#[async_trait]
impl ExerciseRepository for DbAdapter {
    async fn create_exercise(&self, exercise: NewExercise) -> PortResult<Exercise> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let id = insert_exercise(&mut conn, &exercise)
            .await
            .map_err(|e| map_db_error(e, "Exercise fields are out of range"))?;
        drop(conn);
        self.get_exercise_by_id(id).await
    }

    async fn create_exercises(&self, exercises: Vec<NewExercise>) -> PortResult<usize> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        for (index, exercise) in exercises.iter().enumerate() {
            insert_exercise(&mut tx, exercise)
                .await
                .map_err(|e| map_db_error(e, &format!("Exercise #{} was rejected", index + 1)))?;
        }

        tx.commit()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(exercises.len())
    }

    async fn get_exercise_by_id(&self, exercise_id: ExerciseId) -> PortResult<Exercise> {
        let sql = format!("SELECT {} FROM exercises WHERE id = ?", EXERCISE_COLUMNS);
        let record = sqlx::query_as::<_, ExerciseRecord>(&sql)
            .bind(exercise_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, &format!("Exercise {} not found", exercise_id)))?;
        record.to_domain()
    }

    async fn count_exercises(&self) -> PortResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM exercises")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    async fn list_exercises_by_filter(
        &self,
        body_part: &str,
        exercise_type: &str,
    ) -> PortResult<Vec<Exercise>> {
        let sql = format!(
            "SELECT {} FROM exercises WHERE body_part = ? AND exercise_type = ? ORDER BY id ASC",
            EXERCISE_COLUMNS
        );
        let records = sqlx::query_as::<_, ExerciseRecord>(&sql)
            .bind(body_part)
            .bind(exercise_type)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }
}

#[async_trait]
impl CompletionRepository for DbAdapter {
    async fn create_completions(
        &self,
        user_id: UserId,
        exercise_ids: &[ExerciseId],
        completed_at: DateTime<Utc>,
    ) -> PortResult<Vec<CompletionRecord>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let mut created = Vec::with_capacity(exercise_ids.len());
        for &exercise_id in exercise_ids {
            let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exercises WHERE id = ?")
                .bind(exercise_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
            if exists == 0 {
                // Dropping the transaction rolls back anything written so far.
                return Err(PortError::NotFound(format!(
                    "Exercise {} not found",
                    exercise_id
                )));
            }

            let result = sqlx::query(
                "INSERT INTO completions (user_id, exercise_id, completed_at) VALUES (?, ?, ?)",
            )
            .bind(user_id)
            .bind(exercise_id)
            .bind(completed_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error(e, &format!("User {} not found", user_id)))?;

            created.push(CompletionRecord {
                id: result.last_insert_rowid(),
                user_id,
                exercise_id,
                completed_at,
            });
        }

        tx.commit()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(created)
    }

    async fn get_completions_by_user(&self, user_id: UserId) -> PortResult<Vec<CompletionRecord>> {
        let records = sqlx::query_as::<_, CompletionRow>(
            "SELECT id, user_id, exercise_id, completed_at FROM completions WHERE user_id = ? ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_history_by_user(
        &self,
        user_id: UserId,
    ) -> PortResult<Vec<CompletionHistoryEntry>> {
        let records = sqlx::query_as::<_, HistoryRow>(
            "SELECT c.id, c.user_id, c.exercise_id, c.completed_at, e.name, e.body_part, e.exercise_type \
             FROM completions c JOIN exercises e ON e.id = c.exercise_id \
             WHERE c.user_id = ? ORDER BY c.id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}

#[async_trait]
impl AuthSessionRepository for DbAdapter {
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, &format!("User {} not found", user_id)))?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<UserId> {
        let row = sqlx::query_as::<_, AuthSessionRow>(
            "SELECT user_id, expires_at FROM auth_sessions WHERE id = ?",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Auth session not found"))?;

        if row.expires_at <= Utc::now() {
            return Err(PortError::NotFound("Auth session expired".to_string()));
        }
        Ok(row.user_id)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
