//! Request template loading.

mod directory;
mod http_file;

pub use directory::{BuiltinTemplates, FileTemplateSource};
pub use http_file::{TEMPLATE_EXTENSION, parse_http_template};
