//! # Field Module
//!
//! Static per-field metadata and the resolution of a field's external name
//! and option list from its tags.
//!
//! ## Overview
//!
//! `#[derive(Record)]` emits one [`FieldMeta`] per struct field. At unmarshal
//! time each exported, non-embedded field is resolved into a
//! [`FieldDescriptor`]:
//!
//! 1. The `request` tag is checked first. Its value has the form
//!    `name,option1,option2`.
//! 2. If it is missing or its name is empty, the configured fallback tags are
//!    checked in order.
//! 3. If no tag yields a name, the lowercased Rust identifier is used.
//!
//! Options are only ever read from the `request` tag. A field whose resolved
//! name is `-` does not take part in unmarshalling.

use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;

/// Name of the tag that carries both the external name and the option list.
pub const PRIMARY_TAG: &str = "request";

/// Resolved name that removes a field from unmarshalling.
pub const IGNORE_NAME: &str = "-";

/// Option identifiers for one field, in declared order.
pub type OptionList = SmallVec<[String; 4]>;

/// Compile-time metadata for one struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    /// Rust identifier of the field
    pub ident: &'static str,
    /// `(tag name, tag value)` pairs declared on the field
    pub tags: &'static [(&'static str, &'static str)],
    /// Whether the field is `pub`
    pub exported: bool,
    /// Whether the field is an embedded record (`#[embed]`)
    pub embedded: bool,
}

impl FieldMeta {
    /// Value of the named tag, if declared.
    #[must_use]
    pub fn tag(&self, name: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(tag, _)| *tag == name)
            .map(|(_, value)| *value)
    }
}

/// Converts a raw value to a field's type and renders it back, `None` when
/// the value does not convert.
pub type Retype = fn(&Value) -> Option<Value>;

/// A field resolved for one unmarshal pass.
#[derive(Clone)]
pub struct FieldDescriptor {
    /// Rust identifier of the field
    pub ident: &'static str,
    /// External name looked up in the request
    pub name: String,
    /// Option identifiers from the `request` tag
    pub options: OptionList,
    /// The zero value of the field's type (`null` for `Option` fields)
    pub zero: Value,
    /// Conversion into the field's type, see [`FieldDescriptor::retyped`]
    pub retype: Retype,
}

impl FieldDescriptor {
    /// True when the field is skipped entirely.
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        self.name == IGNORE_NAME
    }

    /// `value` as the field would hold it after coercion.
    ///
    /// Lets options compare a raw candidate (`"5"` from a form) with the
    /// field's current value (`5`).
    #[must_use]
    pub fn retyped(&self, value: &Value) -> Option<Value> {
        (self.retype)(value)
    }

    /// True when `value` is null or coerces to the field's zero value.
    #[must_use]
    pub fn is_zero(&self, value: &Value) -> bool {
        value.is_null() || self.retyped(value).as_ref() == Some(&self.zero)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("ident", &self.ident)
            .field("name", &self.name)
            .field("options", &self.options)
            .field("zero", &self.zero)
            .finish_non_exhaustive()
    }
}

/// Resolve the external name and options of a field.
///
/// `fallback_tags` are tag names consulted, in order, when the `request` tag
/// provides no name.
pub fn resolve<S: AsRef<str>>(meta: &FieldMeta, fallback_tags: &[S]) -> (String, OptionList) {
    let mut options = OptionList::new();
    let mut name = String::new();

    if let Some(tag) = meta.tag(PRIMARY_TAG) {
        let mut parts = tag.split(',');
        name = parts.next().unwrap_or_default().trim().to_string();
        options.extend(
            parts
                .map(str::trim)
                .filter(|opt| !opt.is_empty())
                .map(str::to_string),
        );
    }

    if name.is_empty() {
        name = fallback_tags
            .iter()
            .filter_map(|tag| meta.tag(tag.as_ref()))
            .map(tag_name)
            .find(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_default();
    }

    if name.is_empty() {
        name = meta.ident.trim_start_matches("r#").to_lowercase();
    }

    (name, options)
}

fn tag_name(tag: &str) -> &str {
    tag.split(',').next().unwrap_or_default().trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_FALLBACK: &[&str] = &[];

    fn meta(ident: &'static str, tags: &'static [(&'static str, &'static str)]) -> FieldMeta {
        FieldMeta {
            ident,
            tags,
            exported: true,
            embedded: false,
        }
    }

    #[test]
    fn test_identifier_is_lowercased_without_tags() {
        let (name, options) = resolve(&meta("UserName", &[]), NO_FALLBACK);
        assert_eq!(name, "username");
        assert!(options.is_empty());
    }

    #[test]
    fn test_raw_identifier_prefix_is_stripped() {
        let (name, _) = resolve(&meta("r#type", &[]), NO_FALLBACK);
        assert_eq!(name, "type");
    }

    #[test]
    fn test_primary_tag_with_options() {
        let (name, options) = resolve(
            &meta("foo", &[("request", "bar,required, immutable,")]),
            NO_FALLBACK,
        );
        assert_eq!(name, "bar");
        assert_eq!(options.as_slice(), ["required", "immutable"]);
    }

    #[test]
    fn test_empty_primary_name_keeps_options() {
        let (name, options) = resolve(&meta("Foo", &[("request", ",required")]), NO_FALLBACK);
        assert_eq!(name, "foo");
        assert_eq!(options.as_slice(), ["required"]);
    }

    #[test]
    fn test_fallback_tags_in_order() {
        let field = meta(
            "foo",
            &[("request", ",required"), ("json", "from_json"), ("response", "baz")],
        );
        let (name, options) = resolve(&field, &["response", "json"]);
        assert_eq!(name, "baz");
        assert_eq!(options.as_slice(), ["required"]);

        let (name, _) = resolve(&field, &["missing", "json"]);
        assert_eq!(name, "from_json");
    }

    #[test]
    fn test_fallback_options_are_ignored() {
        let (name, options) = resolve(&meta("foo", &[("json", "bar,omitempty")]), &["json"]);
        assert_eq!(name, "bar");
        assert!(options.is_empty());
    }

    #[test]
    fn test_fallback_ignored_without_configuration() {
        let (name, _) = resolve(&meta("foo", &[("response", "-")]), NO_FALLBACK);
        assert_eq!(name, "foo");
    }

    #[test]
    fn test_primary_wins_over_fallback_ignore() {
        let field = meta("bacon", &[("response", "-"), ("request", "bacon,required")]);
        let (name, _) = resolve(&field, &["response"]);
        assert_eq!(name, "bacon");
        let (name, _) = resolve(&meta("baz", &[("response", "-")]), &["response"]);
        assert_eq!(name, IGNORE_NAME);
    }
}
