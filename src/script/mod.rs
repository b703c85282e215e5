//! Podcast scripts.
//!
//! Scripts are authored as JSON episode documents and loaded at runtime.

mod episode;

pub use episode::{Episode, Role, RoleMap, ScriptError, Segment, VoiceBinding, validate_name};
