//! services/web/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes, and the request context
//! that resolves the optional current user on public routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use routine_tracker_core::{PortError, UserId};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, warn};

use crate::web::flash::{redirect_with_flash, Flash};
use crate::web::session::{read_cookie, SESSION_COOKIE};
use crate::web::state::AppState;

/// The user a valid session cookie resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub email: String,
}

/// Resolves the session cookie to a user.
///
/// Returns `None` for a missing cookie, a bad signature, an expired or
/// deleted session, or a session whose user no longer exists.
pub async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Option<AuthenticatedUser> {
    // 1. Extract and verify the signed session cookie
    let token = read_cookie(headers, SESSION_COOKIE)?;
    let Some(auth_session_id) = state.signer.verify(token) else {
        warn!("Rejected a session cookie with an invalid signature");
        return None;
    };

    // 2. Validate auth session in database, get user_id
    let user_id = match state.auth_sessions.validate_auth_session(auth_session_id).await {
        Ok(user_id) => user_id,
        Err(PortError::NotFound(_)) => return None,
        Err(e) => {
            error!("Failed to validate auth session: {:?}", e);
            return None;
        }
    };

    // 3. Load the user the session belongs to
    match state.users.get_user_by_id(user_id).await {
        Ok(user) => Some(AuthenticatedUser {
            id: user.id,
            email: user.email,
        }),
        Err(e) => {
            error!("Session {} points at a missing user: {:?}", auth_session_id, e);
            None
        }
    }
}

/// Middleware that validates the auth session cookie.
///
/// If valid, inserts the `AuthenticatedUser` into request extensions for handlers to use.
/// If invalid or missing, redirects to the login page, remembering the page for GET requests.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    match resolve_user(&state, req.headers()).await {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        None => {
            let location = if req.method() == Method::GET {
                format!("/login?next={}", req.uri().path())
            } else {
                "/login".to_string()
            };
            redirect_with_flash(&location, Flash::LoginRequired, state.config.secure_cookies)
        }
    }
}

/// The per-request view of who is asking. Public routes use this instead of
/// the route guard.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user: Option<AuthenticatedUser>,
}

impl RequestContext {
    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn email(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.email.as_str())
    }
}

impl FromRequestParts<Arc<AppState>> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(Self {
                user: Some(user.clone()),
            });
        }
        Ok(Self {
            user: resolve_user(state, &parts.headers).await,
        })
    }
}
