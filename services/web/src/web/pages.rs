//! services/web/src/web/pages.rs
//!
//! Handlers for the exercise flow: the landing page, routine proposals,
//! recording completions, the track record and the add-exercise form.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use axum_extra::extract::Form;
use routine_tracker_core::{add_exercise, propose_routine, record_completions, PortError};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::web::flash::{redirect_with_flash, Flash, IncomingFlash, Notice};
use crate::web::forms::{AddExerciseForm, CompletionForm, RoutineForm};
use crate::web::middleware::{AuthenticatedUser, RequestContext};
use crate::web::state::AppState;
use crate::web::views::{self, Page};

/// GET / - Landing page
pub async fn home_page(ctx: RequestContext, IncomingFlash(flash): IncomingFlash) -> Page {
    Page::new("Welcome", views::home(ctx.user.is_some()))
        .viewer(ctx.email())
        .flash(flash)
}

/// GET /exercise - Render the routine filter form
pub async fn exercise_page(ctx: RequestContext, IncomingFlash(flash): IncomingFlash) -> Page {
    Page::new("Exercise now", views::exercise_form())
        .viewer(ctx.email())
        .flash(flash)
}

/// POST /exercise - Propose a routine for the submitted filters
pub async fn exercise_handler(
    State(state): State<Arc<AppState>>,
    ctx: RequestContext,
    Form(form): Form<RoutineForm>,
) -> Result<Response, ApiError> {
    let request = match form.validate() {
        Ok(request) => request,
        Err(PortError::Validation(message)) => {
            warn!("Rejected routine request: {}", message);
            return Ok(Page::new("Exercise now", views::exercise_form())
                .viewer(ctx.email())
                .status(StatusCode::BAD_REQUEST)
                .notice(Notice::danger(message))
                .into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let exercises = propose_routine(
        state.exercises.as_ref(),
        state.completions.as_ref(),
        &request,
        ctx.user_id(),
    )
    .await?;

    Ok(Page::new(
        "Routine proposal",
        views::routine_proposal(&exercises, &request, ctx.user.is_some()),
    )
    .viewer(ctx.email())
    .into_response())
}

/// POST /routine_proposal - Record the selected exercises as completed
pub async fn routine_proposal_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Form(form): Form<CompletionForm>,
) -> Result<Response, ApiError> {
    let secure = state.config.secure_cookies;

    let exercise_ids = match form.exercise_ids() {
        Ok(ids) => ids,
        Err(e) => {
            warn!("User {} submitted malformed exercise ids: {}", user.id, e);
            return Ok(redirect_with_flash("/exercise", Flash::UnknownExercise, secure));
        }
    };

    match record_completions(state.completions.as_ref(), user.id, &exercise_ids).await {
        Ok(records) => {
            info!("User {} completed {} exercises", user.id, records.len());
            Ok(redirect_with_flash(
                "/track_record",
                Flash::CompletionsRecorded,
                secure,
            ))
        }
        Err(PortError::Validation(_)) => {
            Ok(redirect_with_flash("/exercise", Flash::NothingSelected, secure))
        }
        Err(PortError::NotFound(what)) => {
            warn!("User {} tried to complete a missing exercise: {}", user.id, what);
            Ok(redirect_with_flash("/exercise", Flash::UnknownExercise, secure))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /track_record - List this user's completed exercises
pub async fn track_record_page(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Page, ApiError> {
    let history = state.completions.get_history_by_user(user.id).await?;
    Ok(Page::new("Track record", views::track_record(&history))
        .viewer(Some(&user.email))
        .flash(flash))
}

/// GET /add_exercise - Render the add-exercise form
pub async fn add_exercise_page(
    Extension(user): Extension<AuthenticatedUser>,
    IncomingFlash(flash): IncomingFlash,
) -> Page {
    Page::new(
        "Add exercise",
        views::add_exercise_form(&AddExerciseForm::default()),
    )
    .viewer(Some(&user.email))
    .flash(flash)
}

/// POST /add_exercise - Add a user-submitted exercise to the catalog
pub async fn add_exercise_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Form(form): Form<AddExerciseForm>,
) -> Result<Response, ApiError> {
    let result = match form.validate() {
        Ok(exercise) => add_exercise(state.exercises.as_ref(), exercise).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(exercise) => {
            info!("User {} added exercise {}", user.id, exercise.id);
            Ok(redirect_with_flash(
                "/exercise",
                Flash::ExerciseAdded,
                state.config.secure_cookies,
            ))
        }
        Err(PortError::Validation(message)) => {
            warn!("Rejected exercise from user {}: {}", user.id, message);
            Ok(Page::new("Add exercise", views::add_exercise_form(&form))
                .viewer(Some(&user.email))
                .status(StatusCode::BAD_REQUEST)
                .notice(Notice::danger(message))
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}
