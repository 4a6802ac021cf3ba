//! Suites bundled with the binary.

mod cs531a4;

pub use cs531a4::Cs531A4;

use servertester_application::Suite;

/// Every bundled suite.
pub fn all() -> Vec<Box<dyn Suite>> {
    vec![Box::new(Cs531A4)]
}

/// Looks up a bundled suite by name.
pub fn find(name: &str) -> Option<Box<dyn Suite>> {
    all().into_iter().find(|s| s.name() == name)
}
