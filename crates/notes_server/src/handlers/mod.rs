//! HTTP request handlers.

/// Note endpoints.
pub mod note;
/// Tag endpoints.
pub mod tag;
