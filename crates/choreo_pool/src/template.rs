//! Entity templates and their asynchronous loading.
//!
//! A [`TemplateLoader`] produces templates behind futures; the
//! [`TemplateCache`] memoizes them and polls outstanding loads without ever
//! blocking, so a slow load only delays the spawns that depend on it.

use core::task::{Context, Poll};
use std::sync::Arc;

use choreo_graph::graph::Graph;
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::task::noop_waker_ref;
use hashbrown::HashMap;

use crate::handle::Transform;

// ─────────────────────────────────────────────────────────────────────────────
// Template
// ─────────────────────────────────────────────────────────────────────────────

/// Everything needed to instantiate an entity: its behavior graph and
/// starting transform.
#[derive(Debug, Clone)]
pub struct Template {
    /// Template name, the key pools are organized by.
    pub name: Arc<str>,
    /// Graph every instance runs.
    pub graph: Arc<Graph>,
    /// Transform applied on instantiation and on every acquire.
    pub transform: Transform,
}

impl Template {
    /// Creates a template at the origin.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, graph: Graph) -> Self {
        Self {
            name: name.into(),
            graph: Arc::new(graph),
            transform: Transform::default(),
        }
    }

    /// Sets the starting transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

/// Errors from loading a template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// The loader knows no template of that name.
    #[error("template not found: {0}")]
    NotFound(String),

    /// The load failed.
    #[error("template '{name}' failed to load: {reason}")]
    Failed {
        /// Template name.
        name: String,
        /// Loader-specific reason.
        reason: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Loaders
// ─────────────────────────────────────────────────────────────────────────────

/// Produces templates by name.
///
/// Implementations return immediately; the returned future does the work
/// and is polled by the pool once per maintenance tick.
pub trait TemplateLoader: Send + Sync {
    /// Starts loading `name`.
    fn load_template(&self, name: &str) -> BoxFuture<'static, Result<Template, TemplateError>>;
}

/// In-memory templates, ready on first poll.
#[derive(Debug, Clone, Default)]
pub struct StaticTemplates {
    templates: HashMap<Arc<str>, Template>,
}

impl StaticTemplates {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template, keyed by its name.
    #[must_use]
    pub fn with(mut self, template: Template) -> Self {
        self.insert(template);
        self
    }

    /// Adds or replaces a template.
    pub fn insert(&mut self, template: Template) {
        self.templates.insert(Arc::clone(&template.name), template);
    }
}

impl TemplateLoader for StaticTemplates {
    fn load_template(&self, name: &str) -> BoxFuture<'static, Result<Template, TemplateError>> {
        let result = self
            .templates
            .get(name)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound(name.to_owned()));
        futures::future::ready(result).boxed()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TemplateCache
// ─────────────────────────────────────────────────────────────────────────────

/// State of one template in the cache.
#[derive(Debug)]
pub enum TemplateStatus<'a> {
    /// Loaded.
    Ready(&'a Template),
    /// Still loading.
    Loading,
    /// The last load failed.
    Failed(TemplateError),
}

enum Entry {
    Loading(BoxFuture<'static, Result<Template, TemplateError>>),
    Ready(Template),
    Failed(TemplateError),
}

/// Memoizing front of a [`TemplateLoader`].
pub struct TemplateCache {
    loader: Arc<dyn TemplateLoader>,
    entries: HashMap<Arc<str>, Entry>,
    retry_failed: bool,
}

impl core::fmt::Debug for TemplateCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut ready: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, e)| matches!(e, Entry::Ready(_)))
            .map(|(name, _)| name.as_ref())
            .collect();
        ready.sort_unstable();
        f.debug_struct("TemplateCache")
            .field("ready", &ready)
            .field("entries", &self.entries.len())
            .field("retry_failed", &self.retry_failed)
            .finish_non_exhaustive()
    }
}

impl TemplateCache {
    /// Wraps `loader`. Failed loads are restarted on the next request when
    /// `retry_failed` is set.
    #[must_use]
    pub fn new(loader: Arc<dyn TemplateLoader>, retry_failed: bool) -> Self {
        Self {
            loader,
            entries: HashMap::new(),
            retry_failed,
        }
    }

    /// Looks up `name`, starting or polling its load as needed. Never
    /// blocks.
    pub fn request(&mut self, name: &str) -> TemplateStatus<'_> {
        let restart = match self.entries.get(name) {
            None => true,
            Some(Entry::Failed(_)) => self.retry_failed,
            Some(_) => false,
        };
        if restart {
            tracing::debug!(template = name, "template load started");
            let future = self.loader.load_template(name);
            self.entries.insert(Arc::from(name), Entry::Loading(future));
        }

        let Some(entry) = self.entries.get_mut(name) else {
            return TemplateStatus::Loading;
        };
        if let Entry::Loading(future) = entry {
            let mut cx = Context::from_waker(noop_waker_ref());
            match future.poll_unpin(&mut cx) {
                Poll::Pending => {}
                Poll::Ready(Ok(template)) => {
                    tracing::debug!(template = name, "template loaded");
                    *entry = Entry::Ready(template);
                }
                Poll::Ready(Err(error)) => {
                    tracing::warn!(template = name, %error, "template load failed");
                    *entry = Entry::Failed(error);
                }
            }
        }

        match entry {
            Entry::Loading(_) => TemplateStatus::Loading,
            Entry::Ready(template) => TemplateStatus::Ready(template),
            Entry::Failed(error) => TemplateStatus::Failed(error.clone()),
        }
    }

    /// Returns the template if it is already loaded. Starts nothing.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Template> {
        match self.entries.get(name) {
            Some(Entry::Ready(template)) => Some(template),
            _ => None,
        }
    }

    /// Returns true while a load of `name` is outstanding.
    #[must_use]
    pub fn is_loading(&self, name: &str) -> bool {
        matches!(self.entries.get(name), Some(Entry::Loading(_)))
    }

    /// Forgets every template and outstanding load.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> TemplateCache {
        let mut graph = Graph::new("orb");
        graph.create_state("Fly", "").expect("fresh");
        let loader = StaticTemplates::new().with(Template::new("orb", graph));
        TemplateCache::new(Arc::new(loader), true)
    }

    #[test]
    fn static_templates_are_ready_immediately() {
        let mut cache = cache();
        assert!(cache.get("orb").is_none());
        assert!(matches!(cache.request("orb"), TemplateStatus::Ready(t) if &*t.name == "orb"));
        assert!(cache.get("orb").is_some());
    }

    #[test]
    fn unknown_templates_fail() {
        let mut cache = cache();
        assert!(matches!(
            cache.request("missing"),
            TemplateStatus::Failed(TemplateError::NotFound(name)) if name == "missing"
        ));
        assert!(!cache.is_loading("missing"));
    }
}
