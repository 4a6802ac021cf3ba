//! Request types: templates, overrides and the materialized request.

mod header;
mod method;
mod overrides;
mod spec;
mod template;

pub use header::{Header, Headers};
pub use method::HttpMethod;
pub use overrides::{BODY_KEY, METHOD_KEY, PATH_KEY, RequestOverride, USER_AGENT_KEY};
pub use spec::RequestSpec;
pub use template::RequestTemplate;
