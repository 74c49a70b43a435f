//! # Record Module
//!
//! The traits a target type implements so that request parameters can be
//! bound onto it. They are normally generated with `#[derive(Record)]`.
//!
//! ## Overview
//!
//! - [`Record`] exposes the static field table and a mutable slot per field.
//! - [`AsRecord`] answers "is this a non-null reference to a record?". It is
//!   used to validate unmarshal targets and to follow embedded records, which
//!   may sit behind an `Option` or a `Box`.
//! - [`PreUnmarshal`], [`PostUnmarshal`] and [`Unmarshaller`] are optional
//!   whole-target capabilities, surfaced through the `as_*` accessors.
//!
//! ## Derive attributes
//!
//! ```rust
//! use brrtbind::Record;
//!
//! #[derive(Debug, Default, Record)]
//! pub struct Audit {
//!     pub created_by: String,
//! }
//!
//! #[derive(Debug, Default, Record)]
//! #[record(post_unmarshal)]
//! pub struct Example {
//!     #[request(",required")]
//!     pub foo: String,
//!     #[tag(response = "baz")]
//!     pub bar: String,
//!     #[request("-")]
//!     pub internal: u8,
//!     #[embed]
//!     pub audit: Option<Box<Audit>>,
//!     hidden: bool,
//! }
//!
//! impl brrtbind::PostUnmarshal for Example {
//!     fn post_unmarshal(&mut self) -> anyhow::Result<()> {
//!         self.foo = self.foo.trim().to_string();
//!         Ok(())
//!     }
//! }
//! ```
//!
//! Non-`pub` fields never take part in unmarshalling.

use crate::field::FieldMeta;
use crate::source::Params;
use crate::value::Field;

/// Hook run on the whole target before any field is touched.
pub trait PreUnmarshal {
    fn pre_unmarshal(&mut self) -> anyhow::Result<()>;
}

/// Hook run on the whole target after unmarshalling, whatever the outcome.
pub trait PostUnmarshal {
    fn post_unmarshal(&mut self) -> anyhow::Result<()>;
}

/// Full replacement of field-by-field unmarshalling.
///
/// A target exposing this capability consumes the raw parameter mapping
/// itself; no field is resolved, coerced or checked for unused input.
pub trait Unmarshaller {
    fn unmarshal(&mut self, params: &Params) -> anyhow::Result<()>;
}

/// Mutable access to one field of a record.
pub enum FieldMut<'a> {
    /// An ordinary value field
    Value(&'a mut dyn Field),
    /// An embedded record whose fields are treated as the parent's
    Embedded(&'a mut dyn AsRecord),
}

/// A struct whose fields can be filled from request parameters.
pub trait Record {
    /// Static metadata for every declared field, in declaration order.
    fn fields(&self) -> &'static [FieldMeta];

    /// Slot for the field at `index` in [`Record::fields`].
    ///
    /// Returns `None` for fields that never take part in unmarshalling.
    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>>;

    fn as_pre_unmarshal(&mut self) -> Option<&mut dyn PreUnmarshal> {
        None
    }

    fn as_post_unmarshal(&mut self) -> Option<&mut dyn PostUnmarshal> {
        None
    }

    fn as_unmarshaller(&mut self) -> Option<&mut dyn Unmarshaller> {
        None
    }
}

/// Access to a record behind a possibly-null reference.
pub trait AsRecord {
    /// The record, or `None` if this is not a record or the pointer is empty.
    fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
        None
    }
}

impl<R: AsRecord> AsRecord for Option<R> {
    fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
        self.as_mut().and_then(R::as_record_mut)
    }
}

impl<R: AsRecord + ?Sized> AsRecord for Box<R> {
    fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
        (**self).as_record_mut()
    }
}

impl<T> AsRecord for Vec<T> {}

macro_rules! impl_not_a_record {
    ($($ty:ty),* $(,)?) => {$(
        impl AsRecord for $ty {}
    )*};
}

impl_not_a_record!(
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    bool,
    String,
    serde_json::Value,
);
