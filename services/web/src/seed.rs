//! services/web/src/seed.rs
//!
//! Loads the bundled exercise catalog into an empty database at startup.
//!
//! The whole file is parsed and validated before anything is written, and the
//! rows are inserted in one transaction, so a bad row leaves the catalog empty.

use routine_tracker_core::{ExerciseRepository, NewExercise, PortError, Provenance};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Errors raised while loading the seed catalog. All of them abort startup.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to open seed file {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed seed file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid seed row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("Failed to store seed catalog: {0}")]
    Port(#[from] PortError),
}

/// What a seeding run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The catalog already had entries; nothing was read.
    AlreadySeeded,
    Inserted(usize),
}

/// One line of the seed file. The column names are the file format.
#[derive(Debug, Deserialize)]
struct SeedRow {
    #[serde(rename = "Exercise")]
    name: String,
    #[serde(rename = "Body Part")]
    body_part: String,
    #[serde(rename = "Type")]
    exercise_type: String,
    #[serde(rename = "Sets")]
    sets: i64,
    #[serde(rename = "Reps (x)")]
    reps: Option<i64>,
    #[serde(rename = "Hold (s)")]
    hold: Option<i64>,
    #[serde(rename = "Total Time (s)")]
    total_time: i64,
    #[serde(rename = "Equipment")]
    equipment: Option<String>,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Level")]
    level: String,
    #[serde(rename = "Space")]
    space: Option<String>,
    #[serde(rename = "Directions")]
    directions: String,
    #[serde(rename = "Added by (us or user)")]
    added_by: String,
}

impl SeedRow {
    fn to_domain(self) -> Result<NewExercise, PortError> {
        let provenance: Provenance = self.added_by.parse()?;
        let exercise = NewExercise {
            name: self.name,
            body_part: self.body_part,
            exercise_type: self.exercise_type,
            sets: self.sets,
            reps: self.reps,
            hold: self.hold,
            total_time: self.total_time,
            equipment: self.equipment.filter(|e| !e.is_empty()),
            state: self.state,
            level: self.level,
            space: self.space.filter(|s| !s.is_empty()),
            directions: self.directions,
            provenance,
        };
        exercise.validate()?;
        Ok(exercise)
    }
}

/// Parses every row of a seed file. Row numbers in errors count the header as row 1.
pub fn parse_catalog<R: Read>(reader: R) -> Result<Vec<NewExercise>, SeedError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut exercises = Vec::new();
    for (index, row) in csv_reader.deserialize::<SeedRow>().enumerate() {
        let row_number = index + 2;
        let exercise = row?.to_domain().map_err(|e| SeedError::InvalidRow {
            row: row_number,
            reason: e.to_string(),
        })?;
        exercises.push(exercise);
    }
    Ok(exercises)
}

/// Seeds the catalog from `path` if, and only if, the catalog is empty.
pub async fn populate_catalog(
    exercises: &dyn ExerciseRepository,
    path: &Path,
) -> Result<SeedOutcome, SeedError> {
    let existing = exercises.count_exercises().await?;
    if existing > 0 {
        debug!("Catalog already holds {} exercises, skipping seed", existing);
        return Ok(SeedOutcome::AlreadySeeded);
    }

    info!("Seeding exercise catalog from {}", path.display());
    let file = std::fs::File::open(path).map_err(|source| SeedError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let rows = parse_catalog(file)?;
    let inserted = exercises.create_exercises(rows).await?;
    info!("Seeded {} exercises", inserted);
    Ok(SeedOutcome::Inserted(inserted))
}
