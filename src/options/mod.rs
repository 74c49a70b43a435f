//! # Options Module
//!
//! Per-field option pipeline and the registry that resolves option names.
//!
//! ## Overview
//!
//! Options are written after the name in a field's `request` tag:
//!
//! ```rust,ignore
//! #[request("role,required,default=guest")]
//! pub role: String,
//! ```
//!
//! Each identifier is looked up in an [`OptionRegistry`] and applied in
//! declared order. An option receives the field descriptor, its argument (the
//! part after `=`), the field's current value and the candidate value, and
//! returns the candidate to pass on. The first failure stops the pipeline and
//! becomes the field's error. An identifier with no registered function is an
//! error too.
//!
//! The pipeline runs for every field, whether or not the request contained a
//! value for it. That is how `required` can reject missing input.
//!
//! ## Built-in options
//!
//! | Option          | Behavior                                                |
//! |-----------------|---------------------------------------------------------|
//! | `required`      | Rejects a null or zero candidate                        |
//! | `immutable`     | Rejects changing a field whose current value is set     |
//! | `default=<lit>` | Replaces a null or zero candidate with the literal      |
//!
//! ## Custom options
//!
//! ```rust
//! use brrtbind::options::OptionRegistry;
//! use serde_json::Value;
//!
//! let mut registry = OptionRegistry::with_builtins();
//! registry.register("lowercase", |_field, _arg, _current, candidate| {
//!     Ok(match candidate {
//!         Value::String(s) => Value::String(s.to_lowercase()),
//!         other => other,
//!     })
//! });
//! assert!(registry.lookup("lowercase").is_some());
//! ```

mod builtin;
mod core;

pub use self::builtin::{default_option, immutable, required};
pub use self::core::*;
