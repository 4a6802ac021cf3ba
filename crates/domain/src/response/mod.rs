//! Response capture types

mod capture;

pub use capture::{ResponseCapture, TransportError, TransportErrorKind};
