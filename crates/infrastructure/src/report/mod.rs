//! Report rendering.
//!
//! JSON output is deterministic: 2-space indentation and a trailing newline.
//! YAML is the same data for people who prefer it; text is meant for a
//! terminal.

mod json;
mod text;
mod yaml;

pub use json::{SerializationError, to_json_stable};
pub use text::render_text;
pub use yaml::to_yaml;
