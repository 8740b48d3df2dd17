use std::{collections::BTreeMap, fmt, sync::Arc};

use parking_lot::RwLock;

use super::{Format, FormatId, FormatOptions, HappyFormatter, JsonFormatter, TextFormatter};
use crate::Error;

/// A type alias for the closure type used to construct a [Format] for the logger whose name is
/// given as the first argument
pub type FormatFactory =
    dyn Fn(&str, &FormatOptions) -> Box<dyn Format> + Send + Sync + 'static;

/// A thread-safe registry of format constructors.
///
/// The registry only holds constructors, never formatter instances, so that every logger owns its
/// own formatter.
pub struct FormatRegistry {
    factories: RwLock<BTreeMap<FormatId, Arc<FormatFactory>>>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    /// Create a registry with the built-in `happy`, `text` and `json` formats
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register(FormatId::HAPPY, |_, options| {
            Box::new(HappyFormatter::new(options.clone()))
        });
        registry.register(FormatId::TEXT, |_, options| {
            Box::new(TextFormatter::new(options.clone()))
        });
        registry.register(FormatId::JSON, |_, options| {
            Box::new(JsonFormatter::new(options.clone()))
        });
        registry
    }

    /// Create a registry with no formats at all
    pub fn empty() -> Self {
        Self {
            factories: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register `factory` as the constructor for `id`, replacing any previous registration
    pub fn register<F>(&self, id: FormatId, factory: F)
    where
        F: Fn(&str, &FormatOptions) -> Box<dyn Format> + Send + Sync + 'static,
    {
        self.factories.write().insert(id, Arc::new(factory));
    }

    /// Returns true if a factory is registered for `id`
    pub fn contains(&self, id: &FormatId) -> bool {
        self.factories.read().contains_key(id)
    }

    /// Get the identifiers of all registered formats
    pub fn formats(&self) -> Vec<FormatId> {
        self.factories.read().keys().cloned().collect()
    }

    /// Construct a new formatter for the logger called `name`.
    ///
    /// Returns [Error::UnknownFormat] if nothing was registered for `id`.
    pub fn create(
        &self,
        id: &FormatId,
        name: &str,
        options: &FormatOptions,
    ) -> Result<Box<dyn Format>, Error> {
        // The lock must not be held while the factory runs
        let factory = self.factories.read().get(id).cloned().ok_or_else(|| Error::UnknownFormat {
            format: id.to_string(),
        })?;
        Ok(factory(name, options))
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry").field("formats", &self.formats()).finish()
    }
}
