//! services/web/src/web/flash.rs
//!
//! One-shot notices carried across a redirect in the `flash` cookie.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use std::convert::Infallible;
use tracing::error;

use crate::web::session::{build_cookie, read_cookie};

pub const FLASH_COOKIE: &str = "flash";

/// How a notice is styled on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Danger,
}

impl NoticeLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "notice notice-success",
            NoticeLevel::Info => "notice notice-info",
            NoticeLevel::Danger => "notice notice-danger",
        }
    }
}

/// A message shown at the top of a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Danger,
            message: message.into(),
        }
    }
}

/// The notices that survive a redirect. Only the code travels in the cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Registered,
    LoggedIn,
    LoggedOut,
    LoginRequired,
    CompletionsRecorded,
    ExerciseAdded,
    NothingSelected,
    UnknownExercise,
}

impl Flash {
    const ALL: [Flash; 8] = [
        Flash::Registered,
        Flash::LoggedIn,
        Flash::LoggedOut,
        Flash::LoginRequired,
        Flash::CompletionsRecorded,
        Flash::ExerciseAdded,
        Flash::NothingSelected,
        Flash::UnknownExercise,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Flash::Registered => "registered",
            Flash::LoggedIn => "logged-in",
            Flash::LoggedOut => "logged-out",
            Flash::LoginRequired => "login-required",
            Flash::CompletionsRecorded => "completions-recorded",
            Flash::ExerciseAdded => "exercise-added",
            Flash::NothingSelected => "nothing-selected",
            Flash::UnknownExercise => "unknown-exercise",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flash| flash.code() == code)
    }

    pub fn notice(&self) -> Notice {
        match self {
            Flash::Registered => Notice::success("Registered successfully! Please log in."),
            Flash::LoggedIn => Notice::success("Logged in successfully!"),
            Flash::LoggedOut => Notice::info("You have been logged out."),
            Flash::LoginRequired => Notice::info("Please log in to access this page."),
            Flash::CompletionsRecorded => Notice::success("Exercises marked as completed!"),
            Flash::ExerciseAdded => Notice::success("Exercise added successfully!"),
            Flash::NothingSelected => Notice::danger("Select at least one exercise to record."),
            Flash::UnknownExercise => {
                Notice::danger("One of the selected exercises no longer exists.")
            }
        }
    }
}

/// The flash notice sent with the current request, if any.
pub struct IncomingFlash(pub Option<Flash>);

impl<S: Send + Sync> FromRequestParts<S> for IncomingFlash {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            read_cookie(&parts.headers, FLASH_COOKIE).and_then(Flash::from_code),
        ))
    }
}

/// A `303 See Other` redirect that leaves a flash notice for the next page.
pub fn redirect_with_flash(location: &str, flash: Flash, secure: bool) -> Response {
    let mut response = Redirect::to(location).into_response();
    let cookie = build_cookie(FLASH_COOKIE, flash.code(), 60, secure);
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => error!("Failed to build flash cookie: {:?}", e),
    }
    response
}
