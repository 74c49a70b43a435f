use crate::error::FieldError;
use crate::field::FieldDescriptor;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A named step applied to a field's candidate value before assignment.
///
/// Closures with the matching signature implement this trait.
pub trait OptionFunc: Send + Sync {
    /// Transform or reject `candidate`.
    ///
    /// `arg` is the text after `=` in the option identifier, if any.
    fn apply(
        &self,
        field: &FieldDescriptor,
        arg: Option<&str>,
        current: &Value,
        candidate: Value,
    ) -> anyhow::Result<Value>;
}

impl<F> OptionFunc for F
where
    F: Fn(&FieldDescriptor, Option<&str>, &Value, Value) -> anyhow::Result<Value> + Send + Sync,
{
    fn apply(
        &self,
        field: &FieldDescriptor,
        arg: Option<&str>,
        current: &Value,
        candidate: Value,
    ) -> anyhow::Result<Value> {
        self(field, arg, current, candidate)
    }
}

/// Lookup table from option name to option function.
///
/// Built up front and shared read-only between unmarshal calls.
#[derive(Clone, Default)]
pub struct OptionRegistry {
    funcs: HashMap<String, Arc<dyn OptionFunc>>,
}

static DEFAULT_REGISTRY: Lazy<Arc<OptionRegistry>> =
    Lazy::new(|| Arc::new(OptionRegistry::with_builtins()));

/// The process-wide registry holding the built-in options.
#[must_use]
pub fn default_registry() -> Arc<OptionRegistry> {
    Arc::clone(&DEFAULT_REGISTRY)
}

impl OptionRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `required`, `immutable` and `default`.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("required", super::required);
        registry.register("immutable", super::immutable);
        registry.register("default", super::default_option);
        registry
    }

    /// Register a function under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(&FieldDescriptor, Option<&str>, &Value, Value) -> anyhow::Result<Value>
            + Send
            + Sync
            + 'static,
    {
        self.insert(name, Arc::new(func));
    }

    /// Register a shared option implementation.
    ///
    /// Returns the function previously registered under `name`.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        func: Arc<dyn OptionFunc>,
    ) -> Option<Arc<dyn OptionFunc>> {
        self.funcs.insert(name.into(), func)
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&dyn OptionFunc> {
        self.funcs.get(name).map(|f| f.as_ref())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    /// Registered option names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.funcs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for OptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionRegistry")
            .field("options", &self.names())
            .finish()
    }
}

/// Split an option identifier into its name and optional argument.
///
/// `default=guest` becomes `("default", Some("guest"))`.
#[must_use]
pub fn split_option(identifier: &str) -> (&str, Option<&str>) {
    match identifier.split_once('=') {
        Some((name, arg)) => (name.trim(), Some(arg)),
        None => (identifier.trim(), None),
    }
}

/// Run a field's options over `candidate`, in declared order.
pub fn apply_options(
    registry: &OptionRegistry,
    field: &FieldDescriptor,
    current: &Value,
    candidate: Value,
) -> Result<Value, FieldError> {
    let mut value = candidate;
    for identifier in &field.options {
        let (name, arg) = split_option(identifier);
        let func = registry
            .lookup(name)
            .ok_or_else(|| FieldError::UnknownOption {
                option: name.to_string(),
            })?;
        trace!(field = %field.name, option = name, "applying option");
        value = func
            .apply(field, arg, current, value)
            .map_err(|source| FieldError::Option {
                option: name.to_string(),
                source,
            })?;
    }
    Ok(value)
}
