//! Template sources backed by files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use servertester_application::ports::{TemplateSource, TemplateSourceError};
use servertester_domain::RequestTemplate;

use super::http_file::{TEMPLATE_EXTENSION, parse_http_template};

const GET_URL_UA: &str = include_str!("../../templates/get-url-ua.http");

/// Templates compiled into the binary.
///
/// Currently only `get-url-ua`: a GET of `/` with a `{{HOST}}` header and a
/// default `User-Agent`. Tests set `PATH` and `USERAGENT` in their override.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTemplates;

#[async_trait]
impl TemplateSource for BuiltinTemplates {
    async fn load_all(&self) -> Result<Vec<RequestTemplate>, TemplateSourceError> {
        Ok(vec![parse_http_template("get-url-ua", GET_URL_UA)?])
    }
}

/// Loads every `*.http` file in a directory; the file stem is the template id.
///
/// Subdirectories and other files are ignored.
#[derive(Debug, Clone)]
pub struct FileTemplateSource {
    dir: PathBuf,
}

impl FileTemplateSource {
    /// Creates a source reading from `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory templates are read from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl TemplateSource for FileTemplateSource {
    async fn load_all(&self) -> Result<Vec<RequestTemplate>, TemplateSourceError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file()
                && path.extension().is_some_and(|ext| ext == TEMPLATE_EXTENSION)
            {
                paths.push(path);
            }
        }
        paths.sort();

        let mut templates = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                tracing::warn!(path = %path.display(), "skipping template with non UTF-8 name");
                continue;
            };
            let text = tokio::fs::read_to_string(&path).await?;
            templates.push(parse_http_template(id, &text)?);
            tracing::debug!(template = id, path = %path.display(), "loaded template");
        }
        Ok(templates)
    }
}
