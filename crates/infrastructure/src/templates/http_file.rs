//! Parser for `.http` template files.
//!
//! A template file is a raw HTTP request message:
//!
//! ```text
//! GET {{PATH}} HTTP/1.1
//! Host: {{HOST}}
//! User-Agent: {{USERAGENT}}
//!
//! optional body
//! ```
//!
//! The protocol version on the request line is optional and ignored; the
//! client decides what goes on the wire.

use servertester_application::ports::TemplateSourceError;
use servertester_domain::{Header, HttpMethod, RequestTemplate};

/// File extension template files use.
pub const TEMPLATE_EXTENSION: &str = "http";

/// Parses one template file.
///
/// # Errors
///
/// Returns `TemplateSourceError::Parse` if the request line is missing or
/// malformed, or a header line has no name.
pub fn parse_http_template(id: &str, text: &str) -> Result<RequestTemplate, TemplateSourceError> {
    let fail = |reason: String| TemplateSourceError::Parse {
        name: id.to_string(),
        reason,
    };

    let normalized = text.replace("\r\n", "\n");
    let mut lines = normalized.split('\n');

    let request_line = lines
        .by_ref()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| fail("empty template".to_string()))?;

    let mut parts = request_line.split_whitespace();
    let method: HttpMethod = parts
        .next()
        .unwrap_or_default()
        .parse()
        .map_err(|e| fail(format!("{e}")))?;
    let path = parts
        .next()
        .ok_or_else(|| fail("request line has no target".to_string()))?;
    if let Some(version) = parts.next()
        && !version.starts_with("HTTP/")
    {
        return Err(fail(format!("unexpected protocol version '{version}'")));
    }

    let mut template = RequestTemplate::new(id)
        .map_err(|e| fail(e.to_string()))?
        .with_method(method)
        .with_path(path);

    for line in lines.by_ref() {
        if line.trim().is_empty() {
            break;
        }
        let header = Header::parse_line(line).map_err(|e| fail(e.to_string()))?;
        template = template.with_header(header.name, header.value);
    }

    let body = lines.collect::<Vec<_>>().join("\n");
    if !body.is_empty() {
        template = template.with_body(body);
    }
    Ok(template)
}
