//! # brrtbind
//!
//! **brrtbind** binds a flat mapping of request parameters onto a strongly-typed
//! Rust record, driven entirely by per-field tags.
//!
//! ## Overview
//!
//! A request layer (query string, form body, JSON body) produces a mapping
//! from parameter name to a dynamically-typed value. brrtbind takes that
//! mapping and a target record and:
//!
//! - matches parameters to fields by external name, including the fields of
//!   embedded records
//! - picks each field's candidate value (request value, current value, zero
//!   value or the type's default)
//! - runs the field's options (`required`, `immutable`, `default=...`, or
//!   your own)
//! - fires lifecycle hooks on the target and on individual field values
//! - coerces the candidate into the field's declared type
//! - reports every failing field at once, and separately any request input
//!   that no field consumed
//!
//! ## Architecture
//!
//! - **[`field`]** - Static field metadata and name/option resolution
//! - **[`collect`]** - Matched-name set and per-name outcome ledger
//! - **[`options`]** - Option pipeline and registry with built-in options
//! - **[`value`]** - Field value capabilities and type coercion
//! - **[`record`]** - Record traits implemented by `#[derive(Record)]`
//! - **[`lifecycle`]** - Target and value hook dispatch
//! - **[`source`]** - Request parameter sources
//! - **[`unmarshal`]** - The [`Binder`] entry points
//! - **[`config`]** - Environment configuration
//! - **[`error`]** - Structural, field and unused-input errors
//!
//! ### Unmarshal Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller
//!     participant Binder
//!     participant Target
//!     participant Walker
//!     participant Options
//!     participant Field
//!
//!     Caller->>Binder: unmarshal(&source, &mut target)
//!     Binder->>Binder: source.params()
//!     Binder->>Target: pre_unmarshal()
//!     alt Target has custom unmarshaller
//!         Binder->>Target: unmarshal(&params)
//!     else Field walk
//!         loop every field (embedded records recursed)
//!             Walker->>Walker: resolve name + options
//!             Walker->>Walker: select candidate
//!             Walker->>Options: apply options in order
//!             Walker->>Field: receive / coerce
//!         end
//!         Walker-->>Binder: matched names + field errors
//!     end
//!     Binder->>Target: post_unmarshal()
//!     Binder-->>Caller: Ok / Fields / Unused
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtbind::source::Request;
//! use brrtbind::{Binder, Record};
//!
//! #[derive(Debug, Default, Record)]
//! pub struct Example {
//!     #[request(",required")]
//!     pub foo: i64,
//!     pub bar: f64,
//!     pub baz: String,
//! }
//!
//! let request = Request::new().with_body(
//!     "application/x-www-form-urlencoded",
//!     "foo=1&bar=2.7&baz=taz",
//! );
//! let mut example = Example::default();
//! Binder::new().unmarshal(&request, &mut example).unwrap();
//! assert_eq!(example.foo, 1);
//! assert_eq!(example.bar, 2.7);
//! assert_eq!(example.baz, "taz");
//! ```
//!
//! ## Tag Rules
//!
//! - `#[request("name,option1,option2")]` sets the external name and options.
//! - Options are only read from the `request` tag.
//! - Fallback tags (`#[tag(response = "name")]`) are only consulted when
//!   configured, see [`config`].
//! - Without a name from any tag, the lowercased field identifier is used.
//! - A name of `-` removes the field from unmarshalling; so does leaving the
//!   field private.

pub mod collect;
pub mod config;
pub mod error;
pub mod field;
pub mod lifecycle;
pub mod options;
pub mod record;
pub mod source;
pub mod unmarshal;
pub mod value;
mod walker;

pub use brrtbind_macros::Record;
pub use config::BindConfig;
pub use error::{FieldError, InputErrors, UnmarshalError, UnusedFields};
pub use field::{FieldDescriptor, FieldMeta};
pub use options::{OptionFunc, OptionRegistry};
pub use record::{AsRecord, FieldMut, PostUnmarshal, PreUnmarshal, Record, Unmarshaller};
pub use source::{ParamSource, Params, Request};
pub use unmarshal::{unmarshal, unmarshal_replace, Binder, Mode};
pub use value::{Field, FieldValue, PostReceiver, PreReceiver, Receiver};
