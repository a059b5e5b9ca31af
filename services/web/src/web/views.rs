//! services/web/src/web/views.rs
//!
//! Server-rendered HTML for every page. All user-provided text goes through
//! `html_escape` before it reaches the markup.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use routine_tracker_core::{CompletionHistoryEntry, Exercise, RoutineRequest};
use std::fmt::Write;

use crate::web::flash::{Flash, Notice, FLASH_COOKIE};
use crate::web::forms::AddExerciseForm;
use crate::web::session::clear_cookie;

const EQUIPMENT_CHOICES: [&str; 6] = ["None", "Band", "Dumbbell", "Mat", "Chair", "Wall"];
const DIFFICULTY_CHOICES: [&str; 3] = ["Beginner", "Intermediate", "Advanced"];
const SPACE_CHOICES: [&str; 3] = ["Small", "Medium", "Large"];

//=========================================================================================
// Page Response
//=========================================================================================

/// A full HTML page wrapped in the shared layout.
pub struct Page {
    status: StatusCode,
    title: &'static str,
    viewer: Option<String>,
    notice: Option<Notice>,
    consumed_flash: bool,
    body: String,
}

impl Page {
    pub fn new(title: &'static str, body: String) -> Self {
        Self {
            status: StatusCode::OK,
            title,
            viewer: None,
            notice: None,
            consumed_flash: false,
            body,
        }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// The logged-in user's email, which switches the navigation links.
    pub fn viewer(mut self, email: Option<&str>) -> Self {
        self.viewer = email.map(str::to_string);
        self
    }

    pub fn notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }

    /// Shows an incoming flash notice and clears its cookie.
    pub fn flash(mut self, flash: Option<Flash>) -> Self {
        if let Some(flash) = flash {
            self.consumed_flash = true;
            if self.notice.is_none() {
                self.notice = Some(flash.notice());
            }
        }
        self
    }

    fn render(&self) -> String {
        let nav = match &self.viewer {
            Some(email) => format!(
                r#"<a href="/exercise">Exercise now</a> <a href="/track_record">Track record</a> <a href="/add_exercise">Add exercise</a> <span class="viewer">{}</span> <a href="/logout">Log out</a>"#,
                text(email)
            ),
            None => r#"<a href="/exercise">Exercise now</a> <a href="/login">Log in</a> <a href="/register">Register</a>"#
                .to_string(),
        };
        let notice = self
            .notice
            .as_ref()
            .map(|n| {
                format!(
                    r#"<div class="{}" role="alert">{}</div>"#,
                    n.level.css_class(),
                    text(&n.message)
                )
            })
            .unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Routine Tracker</title>
</head>
<body>
<nav><a href="/">Routine Tracker</a> {nav}</nav>
<main>
{notice}
<h1>{title}</h1>
{body}
</main>
</body>
</html>
"#,
            title = text(self.title),
            nav = nav,
            notice = notice,
            body = self.body,
        )
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        let mut response = (self.status, Html(self.render())).into_response();
        if self.consumed_flash {
            if let Ok(value) = HeaderValue::from_str(&clear_cookie(FLASH_COOKIE, false)) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        response
    }
}

//=========================================================================================
// Page Bodies
//=========================================================================================

pub fn home(logged_in: bool) -> String {
    let call_to_action = if logged_in {
        r#"<p><a href="/exercise">Start a routine</a> or review your <a href="/track_record">track record</a>.</p>"#
    } else {
        r#"<p><a href="/register">Create an account</a> to keep a history of your routines, or <a href="/exercise">try one now</a>.</p>"#
    };
    format!(
        "<p>Pick a body part and an exercise type, and we will put together a short routine from the exercise catalog.</p>\n{}",
        call_to_action
    )
}

pub fn login_form(email: &str, next: Option<&str>) -> String {
    let next_field = next
        .map(|n| format!(r#"<input type="hidden" name="next" value="{}">"#, attr(n)))
        .unwrap_or_default();
    format!(
        r#"<form method="post" action="/login">
{next_field}
<label>Email <input type="email" name="email" value="{email}" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>
<p>No account yet? <a href="/register">Register</a>.</p>"#,
        next_field = next_field,
        email = attr(email),
    )
}

pub fn register_form(email: &str) -> String {
    format!(
        r#"<form method="post" action="/register">
<label>Email <input type="email" name="email" value="{email}" required></label>
<label>Password <input type="password" name="password" required></label>
<label>Confirm password <input type="password" name="confirm_password" required></label>
<button type="submit">Register</button>
</form>"#,
        email = attr(email),
    )
}

pub fn exercise_form() -> String {
    let checkboxes = |name: &str, choices: &[&str]| {
        choices
            .iter()
            .map(|c| {
                format!(
                    r#"<label><input type="checkbox" name="{name}" value="{value}"> {label}</label>"#,
                    name = name,
                    value = attr(c),
                    label = text(c)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let spaces = SPACE_CHOICES
        .iter()
        .map(|s| format!(r#"<option value="{}">{}</option>"#, attr(s), text(s)))
        .collect::<Vec<_>>()
        .join("");

    format!(
        r#"<form method="post" action="/exercise">
<label>Body part <input type="text" name="body_part" placeholder="Shoulder" required></label>
<label>Type <input type="text" name="type" placeholder="Stretch" required></label>
<label>Time available (minutes) <input type="number" name="time_available" min="0" value="15" required></label>
<fieldset><legend>Equipment</legend>
{equipment}
</fieldset>
<fieldset><legend>Difficulty</legend>
{difficulty}
</fieldset>
<label>Space <select name="space"><option value="">Any</option>{spaces}</select></label>
<button type="submit">Propose a routine</button>
</form>"#,
        equipment = checkboxes("equipment", &EQUIPMENT_CHOICES[..]),
        difficulty = checkboxes("difficulty", &DIFFICULTY_CHOICES[..]),
        spaces = spaces,
    )
}

pub fn routine_proposal(exercises: &[Exercise], request: &RoutineRequest, logged_in: bool) -> String {
    let mut body = format!(
        "<p>{} for {} ({} minutes available).</p>\n",
        text(&request.exercise_type),
        text(&request.body_part),
        request.time_available
    );

    if exercises.is_empty() {
        body.push_str(
            r#"<p>No new exercises match these filters. <a href="/exercise">Try different filters</a>.</p>"#,
        );
        return body;
    }

    body.push_str(r#"<form method="post" action="/routine_proposal">"#);
    body.push_str("\n<ol class=\"routine\">\n");
    for exercise in exercises {
        let checkbox = if logged_in {
            format!(
                r#"<input type="checkbox" name="exercise_id" value="{}" checked> "#,
                exercise.id
            )
        } else {
            String::new()
        };
        let _ = write!(
            body,
            r#"<li data-exercise-id="{id}">{checkbox}<strong>{name}</strong> {dosage}
<p class="meta">{level} · {state}{equipment}</p>
<p class="directions">{directions}</p>
</li>
"#,
            id = exercise.id,
            checkbox = checkbox,
            name = text(&exercise.name),
            dosage = dosage(exercise),
            level = text(&exercise.level),
            state = text(&exercise.state),
            equipment = exercise
                .equipment
                .as_deref()
                .map(|e| format!(" · {}", text(e)))
                .unwrap_or_default(),
            directions = text(&exercise.directions),
        );
    }
    body.push_str("</ol>\n");

    if logged_in {
        body.push_str(r#"<button type="submit">Mark as completed</button>"#);
    } else {
        body.push_str(r#"<p><a href="/login?next=/exercise">Log in</a> to record your completed exercises.</p>"#);
    }
    body.push_str("\n</form>");
    body
}

pub fn track_record(entries: &[CompletionHistoryEntry]) -> String {
    if entries.is_empty() {
        return r#"<p>No completed exercises yet. <a href="/exercise">Start a routine</a>.</p>"#
            .to_string();
    }

    let mut rows = String::new();
    for entry in entries {
        let _ = writeln!(
            rows,
            r#"<tr data-exercise-id="{id}"><td>{when}</td><td>{name}</td><td>{body_part}</td><td>{kind}</td></tr>"#,
            id = entry.record.exercise_id,
            when = entry.record.completed_at.format("%Y-%m-%d %H:%M"),
            name = text(&entry.exercise_name),
            body_part = text(&entry.body_part),
            kind = text(&entry.exercise_type),
        );
    }
    format!(
        "<table class=\"track-record\">\n<thead><tr><th>Completed</th><th>Exercise</th><th>Body part</th><th>Type</th></tr></thead>\n<tbody>\n{}</tbody>\n</table>",
        rows
    )
}

pub fn add_exercise_form(values: &AddExerciseForm) -> String {
    let field = |label: &str, name: &str, value: &str, kind: &str, required: bool| {
        format!(
            r#"<label>{label} <input type="{kind}" name="{name}" value="{value}"{required}></label>"#,
            label = label,
            kind = kind,
            name = name,
            value = attr(value),
            required = if required { " required" } else { "" },
        )
    };

    [
        r#"<form method="post" action="/add_exercise">"#.to_string(),
        field("Name", "name", &values.name, "text", true),
        field("Body part", "body_part", &values.body_part, "text", true),
        field("Type", "type", &values.exercise_type, "text", true),
        field("Sets", "sets", &values.sets, "number", true),
        field("Reps", "reps", &values.reps, "number", false),
        field("Hold (s)", "hold", &values.hold, "number", false),
        field("Total time (s)", "total_time", &values.total_time, "number", true),
        field("Equipment", "equipment", &values.equipment, "text", false),
        field("State", "state", &values.state, "text", true),
        field("Level", "level", &values.level, "text", true),
        field("Space", "space", &values.space, "text", false),
        format!(
            r#"<label>Directions <textarea name="directions" required>{}</textarea></label>"#,
            text(&values.directions)
        ),
        r#"<button type="submit">Add exercise</button>"#.to_string(),
        "</form>".to_string(),
    ]
    .join("\n")
}

pub fn error_body(message: &str) -> String {
    format!(
        r#"<p>{}</p>
<p><a href="/">Back to the start page</a></p>"#,
        text(message)
    )
}

fn dosage(exercise: &Exercise) -> String {
    let mut parts = vec![format!("{} sets", exercise.sets)];
    if let Some(reps) = exercise.reps {
        parts.push(format!("{} reps", reps));
    }
    if let Some(hold) = exercise.hold {
        parts.push(format!("hold {}s", hold));
    }
    parts.push(format!("{}s total", exercise.total_time));
    parts.join(", ")
}
