//! Template store
//!
//! Holds every loaded [`RequestTemplate`] behind an `Arc` so test cases can
//! share them without copying and without being able to change them.

use std::collections::HashMap;
use std::sync::Arc;

use servertester_domain::RequestTemplate;

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::TemplateSource;

/// Lookup of templates by identifier.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: HashMap<String, Arc<RequestTemplate>>,
}

impl TemplateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template, replacing any earlier one with the same identifier.
    pub fn insert(&mut self, template: RequestTemplate) {
        self.templates
            .insert(template.id().to_string(), Arc::new(template));
    }

    /// Adds a template (builder pattern).
    #[must_use]
    pub fn with_template(mut self, template: RequestTemplate) -> Self {
        self.insert(template);
        self
    }

    /// Loads every template from a source into the store.
    ///
    /// Templates from the source replace same-named ones already present,
    /// which lets a template directory shadow built-in templates.
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails to load.
    pub async fn load_from<S: TemplateSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> ApplicationResult<usize> {
        let templates = source
            .load_all()
            .await
            .map_err(|e| ApplicationError::TemplateSource(e.to_string()))?;
        let count = templates.len();
        for template in templates {
            tracing::debug!(template = template.id(), "loaded template");
            self.insert(template);
        }
        Ok(count)
    }

    /// Resolves an identifier to its template.
    ///
    /// # Errors
    ///
    /// Returns `TemplateNotFound` if the identifier is unknown.
    pub fn resolve(&self, id: &str) -> ApplicationResult<Arc<RequestTemplate>> {
        self.templates
            .get(id)
            .cloned()
            .ok_or_else(|| ApplicationError::TemplateNotFound(id.to_string()))
    }

    /// Returns true if a template with this identifier is loaded.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    /// Identifiers of all loaded templates, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.templates.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of loaded templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if no template is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ports::TemplateSourceError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    struct StaticSource(Vec<RequestTemplate>);

    #[async_trait]
    impl TemplateSource for StaticSource {
        async fn load_all(&self) -> Result<Vec<RequestTemplate>, TemplateSourceError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl TemplateSource for BrokenSource {
        async fn load_all(&self) -> Result<Vec<RequestTemplate>, TemplateSourceError> {
            Err(TemplateSourceError::Parse {
                name: "bad.http".into(),
                reason: "missing request line".into(),
            })
        }
    }

    #[test]
    fn test_resolve_known_template() {
        let store = TemplateStore::new()
            .with_template(RequestTemplate::new("get-url-ua").unwrap());
        let template = store.resolve("get-url-ua").unwrap();
        assert_eq!(template.path(), "/");
    }

    #[test]
    fn test_resolve_unknown_template() {
        let store = TemplateStore::new();
        let err = store.resolve("nope").unwrap_err();
        assert!(matches!(err, ApplicationError::TemplateNotFound(id) if id == "nope"));
    }

    #[test]
    fn test_resolved_templates_are_shared() {
        let store = TemplateStore::new().with_template(RequestTemplate::new("a").unwrap());
        let first = store.resolve("a").unwrap();
        let second = store.resolve("a").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_load_from_source_shadows_existing() {
        let mut store = TemplateStore::new()
            .with_template(RequestTemplate::new("get-url-ua").unwrap());
        let source = StaticSource(vec![
            RequestTemplate::new("get-url-ua").unwrap().with_path("/index.html"),
            RequestTemplate::new("head-url").unwrap(),
        ]);

        let loaded = store.load_from(&source).await.unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(store.ids(), vec!["get-url-ua", "head-url"]);
        assert_eq!(store.resolve("get-url-ua").unwrap().path(), "/index.html");
    }

    #[tokio::test]
    async fn test_load_from_broken_source() {
        let mut store = TemplateStore::new();
        let err = store.load_from(&BrokenSource).await.unwrap_err();
        assert!(matches!(err, ApplicationError::TemplateSource(_)));
        assert!(store.is_empty());
    }
}
