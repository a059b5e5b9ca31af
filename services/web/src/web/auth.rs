//! services/web/src/web/auth.rs
//!
//! Authentication pages and handlers for registration, login, and logout.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use chrono::{Duration, Utc};
use routine_tracker_core::{PortError, PortResult, User, UserCredentials};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::flash::{redirect_with_flash, Flash, IncomingFlash, Notice};
use crate::web::forms::{normalize_email, LoginForm, LoginQuery, RegisterForm, Registration};
use crate::web::middleware::RequestContext;
use crate::web::session::{build_cookie, clear_cookie, read_cookie, SESSION_COOKIE};
use crate::web::state::AppState;
use crate::web::views::{self, Page};

/// Shown for every failed login, whichever factor was wrong.
pub const LOGIN_FAILED: &str = "Login failed. Check your email and password.";

/// Where a successful login lands when no page was requested.
pub const DEFAULT_LANDING: &str = "/exercise";

//=========================================================================================
// Password Hashing
//=========================================================================================

pub fn hash_password(password: &str) -> PortResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortError::Unexpected(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed_password: &str) -> PortResult<bool> {
    let parsed_hash = PasswordHash::new(hashed_password)
        .map_err(|e| PortError::Unexpected(format!("Failed to parse password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

//=========================================================================================
// Operations
//=========================================================================================

/// Hashes the password and stores the new user.
pub async fn register_user(state: &AppState, registration: &Registration) -> PortResult<User> {
    let password_hash = hash_password(&registration.password)?;
    state
        .users
        .create_user(&registration.email, &password_hash)
        .await
}

/// Checks credentials. Unknown emails and wrong passwords both give `PortError::Unauthorized`.
pub async fn authenticate(state: &AppState, email: &str, password: &str) -> PortResult<UserCredentials> {
    let credentials = match state.users.get_user_by_email(&normalize_email(email)).await {
        Ok(credentials) => credentials,
        Err(PortError::NotFound(_)) => return Err(PortError::Unauthorized),
        Err(e) => return Err(e),
    };

    if verify_password(password, &credentials.hashed_password)? {
        Ok(credentials)
    } else {
        Err(PortError::Unauthorized)
    }
}

/// Only local absolute paths are followed after login.
pub fn safe_redirect_target(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => DEFAULT_LANDING,
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /register - Render the registration form
pub async fn register_page(ctx: RequestContext, IncomingFlash(flash): IncomingFlash) -> Page {
    Page::new("Register", views::register_form(""))
        .viewer(ctx.email())
        .flash(flash)
}

/// POST /register - Create a new user account
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, ApiError> {
    let rerender = |status: StatusCode, message: String| {
        Page::new("Register", views::register_form(&form.email))
            .status(status)
            .notice(Notice::danger(message))
            .into_response()
    };

    // 1. Validate the submitted fields
    let registration = match form.validate() {
        Ok(registration) => registration,
        Err(PortError::Validation(message)) => {
            warn!("Rejected registration: {}", message);
            return Ok(rerender(StatusCode::BAD_REQUEST, message));
        }
        Err(e) => return Err(e.into()),
    };

    // 2. Hash the password and create the user
    match register_user(&state, &registration).await {
        Ok(user) => {
            info!("Registered user {}", user.id);
            Ok(redirect_with_flash(
                "/login",
                Flash::Registered,
                state.config.secure_cookies,
            ))
        }
        Err(PortError::Conflict(_)) => {
            warn!("Registration attempted with an existing email");
            Ok(rerender(
                StatusCode::CONFLICT,
                "An account with that email already exists.".to_string(),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /login - Render the login form
pub async fn login_page(
    ctx: RequestContext,
    IncomingFlash(flash): IncomingFlash,
    Query(query): Query<LoginQuery>,
) -> Page {
    Page::new("Log in", views::login_form("", query.next.as_deref()))
        .viewer(ctx.email())
        .flash(flash)
}

/// POST /login - Login with existing account
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    // 1. Verify the credentials
    let credentials = match authenticate(&state, &form.email, &form.password).await {
        Ok(credentials) => credentials,
        Err(PortError::Unauthorized) => {
            warn!("Failed login attempt");
            return Ok(Page::new(
                "Log in",
                views::login_form(&form.email, form.next.as_deref()),
            )
            .status(StatusCode::UNAUTHORIZED)
            .notice(Notice::danger(LOGIN_FAILED))
            .into_response());
        }
        Err(e) => return Err(e.into()),
    };

    // 2. Generate auth session ID and expiration
    let auth_session_id = Uuid::new_v4().to_string();
    let ttl = Duration::hours(state.config.session_ttl_hours);
    let expires_at = Utc::now() + ttl;

    // 3. Create auth session in database
    state
        .auth_sessions
        .create_auth_session(&auth_session_id, credentials.user_id, expires_at)
        .await?;

    // 4. Create the signed session cookie
    let cookie = build_cookie(
        SESSION_COOKIE,
        &state.signer.sign(&auth_session_id),
        ttl.num_seconds(),
        state.config.secure_cookies,
    );

    // 5. Redirect to the requested page with the cookie
    info!("User {} logged in", credentials.user_id);
    let target = safe_redirect_target(form.next.as_deref());
    let mut response = redirect_with_flash(target, Flash::LoggedIn, state.config.secure_cookies);
    response
        .headers_mut()
        .append(header::SET_COOKIE, HeaderValue::from_str(&cookie)?);
    Ok(response)
}

/// GET|POST /logout - Invalidate the session and clear the cookie
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    // 1. Delete the auth session if the cookie carries a valid one
    if let Some(auth_session_id) =
        read_cookie(&headers, SESSION_COOKIE).and_then(|token| state.signer.verify(token))
    {
        if let Err(e) = state.auth_sessions.delete_auth_session(auth_session_id).await {
            error!("Failed to delete auth session: {:?}", e);
            return Err(e.into());
        }
        info!("Auth session ended");
    }

    // 2. Clear cookie
    let cookie = clear_cookie(SESSION_COOKIE, state.config.secure_cookies);
    let mut response = redirect_with_flash("/", Flash::LoggedOut, state.config.secure_cookies);
    response
        .headers_mut()
        .append(header::SET_COOKIE, HeaderValue::from_str(&cookie)?);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies_only_the_original() {
        let hash = hash_password("correct horse").unwrap();
        assert_ne!(hash, "correct horse");
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn redirect_target_stays_local() {
        assert_eq!(safe_redirect_target(Some("/track_record")), "/track_record");
        assert_eq!(safe_redirect_target(Some("//evil.example")), DEFAULT_LANDING);
        assert_eq!(safe_redirect_target(Some("https://evil.example")), DEFAULT_LANDING);
        assert_eq!(safe_redirect_target(None), DEFAULT_LANDING);
    }
}
