//! Placeholder substitution
//!
//! Parses `{{NAME}}` references in template text and replaces them with
//! values from the run settings and the test's override.
//!
//! # Usage
//!
//! ```
//! use std::collections::BTreeMap;
//! use servertester_application::placeholder::substitute;
//!
//! let vars = BTreeMap::from([("HOST".to_string(), "localhost:8080".to_string())]);
//! let result = substitute("Host: {{HOST}}", &vars);
//! assert_eq!(result.text, "Host: localhost:8080");
//! assert!(result.is_complete());
//! ```

mod parser;
mod substitute;

pub use parser::{Placeholder, parse_placeholders};
pub use substitute::{Substitution, substitute};
