//! HTTP handlers, one module per resource.
//!
//! Handlers stay thin: extract, pick the live or demo service from `AppState`,
//! call it, and map the outcome onto a response. Every failure goes out as an
//! `AppError`.

pub mod admin;
pub mod artworks;
pub mod auth;
pub mod blogs;
pub mod contact;
pub mod courses;
pub mod health;
pub mod newsletter;
pub mod shop;

/// Appended to auth messages when the response comes from demo credentials.
pub(crate) fn mode_suffix(message: &str, demo: bool) -> String {
    if demo {
        format!("{message} (Demo Mode)")
    } else {
        message.to_string()
    }
}
