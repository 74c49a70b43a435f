//! # Unmarshal Module
//!
//! Entry points that bind request parameters onto a target record.
//!
//! ## Overview
//!
//! An unmarshal call moves through these states:
//!
//! ```text
//! Init -> PreHookRun -> (CustomUnmarshal | FieldWalk) -> PostHookRun -> Done
//! ```
//!
//! - **Init** - the target must be a non-null reference to a record, and the
//!   parameter source must produce its mapping. Either failure is returned
//!   immediately.
//! - **PreHookRun** - the target's [`PreUnmarshal`](crate::PreUnmarshal)
//!   hook; failure ends the call.
//! - **CustomUnmarshal** - a target exposing
//!   [`Unmarshaller`](crate::Unmarshaller) consumes the raw mapping itself.
//! - **FieldWalk** - every field is resolved and set. Field errors win; only
//!   when there are none are unconsumed request keys reported.
//! - **PostHookRun** - the target's [`PostUnmarshal`](crate::PostUnmarshal)
//!   hook always runs; its failure never masks an earlier one.
//!
//! ## Modes
//!
//! In [`Mode::Default`] fields missing from the request keep their current
//! value. In [`Mode::Replace`] they are reset to their zero value (`None`
//! for `Option` fields). Either way they still pass through their options,
//! so `required` can reject them.
//!
//! ## Usage
//!
//! ```rust
//! use brrtbind::{Binder, Record, UnmarshalError};
//! use serde_json::json;
//!
//! #[derive(Debug, Default, Record)]
//! pub struct Login {
//!     #[request(",required")]
//!     pub user: String,
//!     pub remember: bool,
//! }
//!
//! let params = json!({"user": "amos", "remember": true})
//!     .as_object()
//!     .cloned()
//!     .unwrap();
//! let mut login = Login::default();
//! Binder::new().unmarshal(&params, &mut login).unwrap();
//! assert_eq!(login.user, "amos");
//! assert!(login.remember);
//!
//! let mut login = Login::default();
//! let err = Binder::new().unmarshal(&serde_json::Map::new(), &mut login).unwrap_err();
//! assert!(matches!(err, UnmarshalError::Fields(ref e) if e.contains("user")));
//! ```

use crate::config::BindConfig;
use crate::error::{UnmarshalError, UnusedFields};
use crate::lifecycle::{self, merge_outcome};
use crate::options::{default_registry, OptionRegistry};
use crate::record::{AsRecord, Record};
use crate::source::{ParamSource, Params};
use crate::walker::Walker;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::{debug, trace};

/// How fields without a request value are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Keep the field's current value
    #[default]
    Default,
    /// Reset the field to its zero value
    Replace,
}

/// Unmarshals request parameters onto records.
///
/// Holds the option registry and the fallback tag list. Cheap to clone and
/// safe to share between threads.
#[derive(Debug, Clone)]
pub struct Binder {
    registry: Arc<OptionRegistry>,
    fallback_tags: Vec<String>,
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

impl Binder {
    /// A binder using the built-in options and configuration from the
    /// environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BindConfig::from_env())
    }

    #[must_use]
    pub fn with_config(config: BindConfig) -> Self {
        Self {
            registry: default_registry(),
            fallback_tags: config.fallback_tags,
        }
    }

    /// Use `registry` to resolve option names.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<OptionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Consult `tag` for a field name after the `request` tag and any
    /// previously added fallback tags.
    #[must_use]
    pub fn with_fallback_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.fallback_tags.contains(&tag) {
            self.fallback_tags.push(tag);
        }
        self
    }

    #[must_use]
    pub fn registry(&self) -> &OptionRegistry {
        &self.registry
    }

    #[must_use]
    pub fn fallback_tags(&self) -> &[String] {
        &self.fallback_tags
    }

    /// Unmarshal, leaving fields missing from the request untouched.
    pub fn unmarshal<S, T>(&self, source: &S, target: &mut T) -> Result<(), UnmarshalError>
    where
        S: ParamSource + ?Sized,
        T: AsRecord + ?Sized,
    {
        self.unmarshal_from(source, target, Mode::Default)
    }

    /// Unmarshal, resetting fields missing from the request to their zero
    /// value.
    pub fn unmarshal_replace<S, T>(&self, source: &S, target: &mut T) -> Result<(), UnmarshalError>
    where
        S: ParamSource + ?Sized,
        T: AsRecord + ?Sized,
    {
        self.unmarshal_from(source, target, Mode::Replace)
    }

    /// Unmarshal parameters taken from `source` in the given mode.
    pub fn unmarshal_from<S, T>(
        &self,
        source: &S,
        target: &mut T,
        mode: Mode,
    ) -> Result<(), UnmarshalError>
    where
        S: ParamSource + ?Sized,
        T: AsRecord + ?Sized,
    {
        let record = target.as_record_mut().ok_or(UnmarshalError::NotARecord)?;
        let params = source.params().map_err(UnmarshalError::Params)?;
        self.run(&params, record, mode)
    }

    /// Unmarshal an already-parsed parameter mapping.
    pub fn unmarshal_params<T>(
        &self,
        params: &Params,
        target: &mut T,
        mode: Mode,
    ) -> Result<(), UnmarshalError>
    where
        T: AsRecord + ?Sized,
    {
        let record = target.as_record_mut().ok_or(UnmarshalError::NotARecord)?;
        self.run(params, record, mode)
    }

    fn run(&self, params: &Params, record: &mut dyn Record, mode: Mode) -> Result<(), UnmarshalError> {
        lifecycle::pre_unmarshal(record)?;
        let main = self.bind(params, record, mode);
        let post = lifecycle::post_unmarshal(record);
        merge_outcome(main, post)
    }

    fn bind(&self, params: &Params, record: &mut dyn Record, mode: Mode) -> Result<(), UnmarshalError> {
        if let Some(custom) = record.as_unmarshaller() {
            trace!("delegating to custom unmarshaller");
            return custom.unmarshal(params).map_err(UnmarshalError::Custom);
        }

        let walker = Walker {
            params,
            mode,
            registry: &self.registry,
            fallback_tags: &self.fallback_tags,
        };
        let outcome = walker.walk(record, 0);

        let failures = outcome.errors.failure_count();
        if let Some(errors) = outcome.errors.into_errors() {
            debug!(failures, ?mode, "unmarshal rejected fields");
            return Err(UnmarshalError::Fields(errors));
        }

        let unused = outcome.matched.missing_from(params.keys());
        if !unused.is_empty() {
            debug!(unused = ?unused, "unmarshal found unknown request fields");
            return Err(UnmarshalError::Unused(UnusedFields::new(unused)));
        }

        trace!(matched = outcome.matched.len(), ?mode, "unmarshal complete");
        Ok(())
    }
}

/// Binder behind the free functions. The environment is read on first use.
static DEFAULT_BINDER: Lazy<Binder> = Lazy::new(Binder::new);

/// Unmarshal with the process-wide default [`Binder`], leaving missing
/// fields untouched.
pub fn unmarshal<S, T>(source: &S, target: &mut T) -> Result<(), UnmarshalError>
where
    S: ParamSource + ?Sized,
    T: AsRecord + ?Sized,
{
    DEFAULT_BINDER.unmarshal(source, target)
}

/// Unmarshal with the process-wide default [`Binder`], resetting missing
/// fields.
pub fn unmarshal_replace<S, T>(source: &S, target: &mut T) -> Result<(), UnmarshalError>
where
    S: ParamSource + ?Sized,
    T: AsRecord + ?Sized,
{
    DEFAULT_BINDER.unmarshal_replace(source, target)
}
