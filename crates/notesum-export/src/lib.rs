//! notesum-export
//!
//! Markdown rendering of structured summaries, one built-in Tera template
//! per renderer.

pub mod error;
pub mod markdown;
pub mod render;
