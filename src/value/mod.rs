//! # Value Module
//!
//! How a single field value is read, defaulted, received and coerced.
//!
//! ## Overview
//!
//! Every type that can sit in a record field implements [`FieldValue`]. The
//! trait covers three concerns:
//!
//! - **Representation** - the field's current value and its zero value as a
//!   dynamically-typed [`serde_json::Value`].
//! - **Coercion** - turning an arbitrary candidate value into the field's
//!   static type ([`FieldValue::coerce_from`]).
//! - **Capabilities** - optional hooks a type can expose: a default value used
//!   when the candidate is empty, and pre-receive / receive / post-receive
//!   hooks fired for values that came from the request.
//!
//! Capabilities are declared explicitly by overriding the `as_*` accessors:
//!
//! ```rust
//! use brrtbind::value::{FieldValue, Receiver};
//! use brrtbind::FieldError;
//! use serde_json::Value;
//!
//! #[derive(Debug, Default)]
//! struct Emote(String);
//!
//! impl Receiver for Emote {
//!     fn receive(&mut self, value: Value) -> anyhow::Result<()> {
//!         let text = value.as_str().ok_or_else(|| anyhow::anyhow!("expected a string"))?;
//!         self.0 = format!("{text}! :D");
//!         Ok(())
//!     }
//! }
//!
//! impl FieldValue for Emote {
//!     fn to_value(&self) -> Value {
//!         Value::String(self.0.clone())
//!     }
//!
//!     fn coerce_from(&mut self, value: Value) -> Result<(), FieldError> {
//!         self.0 = brrtbind::value::convert(value)?;
//!         Ok(())
//!     }
//!
//!     fn as_receiver(&mut self) -> Option<&mut dyn Receiver> {
//!         Some(self)
//!     }
//! }
//! ```
//!
//! ## Coercion rules
//!
//! | Field type            | Accepted candidates                                  |
//! |-----------------------|------------------------------------------------------|
//! | integers              | base-10 strings, any number (floats truncated)       |
//! | `f32` / `f64`         | strings parsed as `f64`, any number                  |
//! | `String`, `bool`, ... | values serde can convert to the type                 |
//! | `Option<T>`           | `null` clears, anything else allocates and coerces   |
//! | `Vec<T>`              | arrays, element by element                           |

mod coerce;
mod core;

pub use self::coerce::{coerce_float, coerce_integer, convert, type_label, value_kind};
pub use self::core::*;
