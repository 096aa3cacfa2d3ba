//! Document models.
//!
//! A collection names the model its documents follow in the `model` field
//! of `collection.json`. Models are registered up front in the database
//! [`Config`](crate::Config) and resolved once, when the collection is
//! opened. An unregistered name is a configuration error unless the
//! registry is told to stand in for unregistered models.

use crate::document::Document;
use crate::error::{CoreError, CoreResult};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Name of the built-in model.
pub const DEFAULT_MODEL: &str = "default";

/// Behaviour attached to every document of a collection.
///
/// # Example
///
/// ```rust,ignore
/// struct User;
///
/// impl DocumentModel for User {
///     fn name(&self) -> &str {
///         "user"
///     }
///
///     fn on_create(&self, document: &mut Document) {
///         document.set("tags", Vec::<String>::new());
///     }
///
///     fn validate(&self, document: &Document) -> CoreResult<()> {
///         match document.get("name") {
///             Some(v) if v.as_text().is_some() => Ok(()),
///             _ => Err(CoreError::invalid_document(document.id().as_str(), "name is required")),
///         }
///     }
/// }
/// ```
pub trait DocumentModel: Send + Sync {
    /// The name collections use to select this model.
    fn name(&self) -> &str;

    /// Called on every document produced by `Collection::create`.
    fn on_create(&self, _document: &mut Document) {}

    /// Called by `Document::save` before anything is written.
    ///
    /// # Errors
    ///
    /// Returning an error aborts the save.
    fn validate(&self, _document: &Document) -> CoreResult<()> {
        Ok(())
    }
}

/// The built-in model: no defaults, accepts every document.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultModel;

impl DocumentModel for DefaultModel {
    fn name(&self) -> &str {
        DEFAULT_MODEL
    }
}

/// Stands in for a model name the registry does not know.
///
/// Reports the declared name and adds no behaviour, so tools that only
/// read a database can open collections whose models live in another
/// program.
#[derive(Debug, Clone)]
struct UnregisteredModel {
    name: String,
}

impl DocumentModel for UnregisteredModel {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Maps model names to registered models.
#[derive(Clone)]
pub struct ModelRegistry {
    default: Arc<dyn DocumentModel>,
    models: BTreeMap<String, Arc<dyn DocumentModel>>,
    allow_unregistered: bool,
}

impl ModelRegistry {
    /// Creates a registry holding only the built-in model.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default: Arc::new(DefaultModel),
            models: BTreeMap::new(),
            allow_unregistered: false,
        }
    }

    /// Sets whether an unregistered name resolves to a model that carries
    /// the name and no behaviour, instead of failing.
    pub fn allow_unregistered(&mut self, value: bool) {
        self.allow_unregistered = value;
    }

    /// Returns true if unregistered names resolve.
    #[must_use]
    pub fn allows_unregistered(&self) -> bool {
        self.allow_unregistered
    }

    /// Registers a model under its own name, replacing any previous model
    /// with that name. The built-in `default` model cannot be replaced.
    pub fn register(&mut self, model: impl DocumentModel + 'static) {
        let name = model.name().to_string();
        if name == DEFAULT_MODEL {
            warn!("ignoring attempt to replace the built-in \"default\" model");
            return;
        }
        self.models.insert(name, Arc::new(model));
    }

    /// Returns true if `name` resolves to a model.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        name == DEFAULT_MODEL || self.models.contains_key(name)
    }

    /// Returns the names of all resolvable models, `default` first.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        std::iter::once(DEFAULT_MODEL.to_string())
            .chain(self.models.keys().cloned())
            .collect()
    }

    /// Resolves the model a collection asked for.
    ///
    /// `None` and `"default"` select the built-in model.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming `collection` if the model is
    /// not registered and unregistered names are not allowed.
    pub fn resolve(
        &self,
        collection: &str,
        name: Option<&str>,
    ) -> CoreResult<Arc<dyn DocumentModel>> {
        let name = match name {
            None | Some(DEFAULT_MODEL) => return Ok(Arc::clone(&self.default)),
            Some(name) => name,
        };
        if let Some(model) = self.models.get(name) {
            return Ok(Arc::clone(model));
        }
        if self.allow_unregistered {
            warn!(
                collection = %collection,
                model = %name,
                "model not registered, opening without its behaviour"
            );
            return Ok(Arc::new(UnregisteredModel {
                name: name.to_string(),
            }));
        }
        Err(CoreError::configuration(
            collection,
            format!("invalid model \"{name}\""),
        ))
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
