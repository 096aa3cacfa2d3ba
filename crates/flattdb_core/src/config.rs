//! Database configuration.

use crate::model::{DocumentModel, ModelRegistry};

/// Configuration for opening a database.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to create the database directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to hold an exclusive advisory lock on the database
    /// directory while it is open.
    pub exclusive_lock: bool,

    /// Whether every resource write is synced to disk before it replaces
    /// the previous version.
    pub sync_writes: bool,

    /// Whether index and document resources are written indented.
    pub pretty_json: bool,

    /// Document models collections may name in their `model` setting.
    pub models: ModelRegistry,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            exclusive_lock: true,
            sync_writes: false,
            pretty_json: false,
            models: ModelRegistry::new(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the database if missing.
    #[must_use]
    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to lock the database directory.
    #[must_use]
    pub fn exclusive_lock(mut self, value: bool) -> Self {
        self.exclusive_lock = value;
        self
    }

    /// Sets whether writes are synced to disk.
    #[must_use]
    pub fn sync_writes(mut self, value: bool) -> Self {
        self.sync_writes = value;
        self
    }

    /// Sets whether resources are written indented.
    #[must_use]
    pub fn pretty_json(mut self, value: bool) -> Self {
        self.pretty_json = value;
        self
    }

    /// Sets whether collections naming an unregistered model open with a
    /// stand-in model instead of failing.
    #[must_use]
    pub fn allow_unregistered_models(mut self, value: bool) -> Self {
        self.models.allow_unregistered(value);
        self
    }

    /// Registers a document model.
    #[must_use]
    pub fn with_model(mut self, model: impl DocumentModel + 'static) -> Self {
        self.models.register(model);
        self
    }
}
