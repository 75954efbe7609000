//! Access-segregated routers, merged under `/api` by `create_router`.
//!
//! The gates are applied where the routers are merged, so a handler's module
//! alone decides whether it is public, needs a token, or needs the admin role.

/// Anonymous access: reads, sign-in, contact and newsletter.
pub mod public;

/// Any valid token.
pub mod authenticated;

/// Valid token with the admin role: content writes and the admin namespace.
pub mod admin;
