//! # Error Module
//!
//! Error types produced while binding request parameters onto a record.
//!
//! ## Overview
//!
//! Three kinds of failure can come out of an unmarshal call, and callers tell
//! them apart by matching on [`UnmarshalError`]:
//!
//! - **Structural** - the target is not a record, the parameter source failed,
//!   or a whole-target hook failed. These abort the call.
//! - **Field errors** - [`InputErrors`], one [`FieldError`] per external name.
//!   A failing field never stops its siblings from being processed.
//! - **Unused input** - [`UnusedFields`], request keys no field consumed.
//!   Only reported when there were no field errors.
//!
//! ```rust,ignore
//! match brrtbind::unmarshal(&params, &mut target) {
//!     Ok(()) => {}
//!     Err(UnmarshalError::Fields(errors)) => {
//!         for (name, err) in errors.iter() {
//!             eprintln!("{name}: {err}");
//!         }
//!     }
//!     Err(UnmarshalError::Unused(unused)) => eprintln!("unknown fields: {unused}"),
//!     Err(other) => return Err(other.into()),
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Boxed error used for parse failures coming out of `str::parse`.
pub type ParseSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failure localized to a single field.
#[derive(Debug)]
pub enum FieldError {
    /// The field's tag names an option that is not registered.
    UnknownOption {
        /// Option name as written in the tag (without its argument)
        option: String,
    },
    /// A registered option rejected the candidate value.
    Option {
        /// Option name that failed
        option: String,
        /// Error returned by the option function
        source: anyhow::Error,
    },
    /// A null candidate was assigned to a field that is not an `Option`.
    NullToNonPointer,
    /// A string candidate could not be parsed into the field's numeric type.
    Parse {
        /// The raw input
        input: String,
        /// Underlying parse error
        source: ParseSource,
    },
    /// A numeric candidate does not fit the field's integer width.
    OutOfRange {
        /// The raw input, rendered
        input: String,
        /// Name of the field's type
        target: String,
    },
    /// The candidate's dynamic type cannot be converted to the field's type.
    Convert {
        /// Kind of the candidate value (`string`, `number`, ...)
        from: &'static str,
        /// Name of the field's type
        to: String,
    },
    /// The value's pre-receive hook failed.
    PreReceive(anyhow::Error),
    /// The value's receiver rejected the raw candidate.
    Receive(anyhow::Error),
    /// The value's post-receive hook failed.
    PostReceive(anyhow::Error),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::UnknownOption { option } => {
                write!(f, "no option function registered for option '{option}'")
            }
            FieldError::Option { option, source } => write!(f, "{option}: {source}"),
            FieldError::NullToNonPointer => write!(f, "cannot assign null to non-pointer value"),
            FieldError::Parse { input, source } => {
                write!(f, "cannot parse '{input}': {source}")
            }
            FieldError::OutOfRange { input, target } => {
                write!(f, "value {input} is out of range for type {target}")
            }
            FieldError::Convert { from, to } => {
                write!(f, "cannot convert value of type {from} to type {to}")
            }
            FieldError::PreReceive(err) => write!(f, "pre-receive hook failed: {err}"),
            FieldError::Receive(err) => write!(f, "{err}"),
            FieldError::PostReceive(err) => write!(f, "post-receive hook failed: {err}"),
        }
    }
}

impl std::error::Error for FieldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FieldError::Parse { source, .. } => Some(source.as_ref()),
            FieldError::Option { source, .. }
            | FieldError::PreReceive(source)
            | FieldError::Receive(source)
            | FieldError::PostReceive(source) => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Field errors keyed by external field name, ordered by name.
///
/// Only ever returned non-empty.
#[derive(Debug, Default)]
pub struct InputErrors {
    errors: BTreeMap<String, FieldError>,
}

impl InputErrors {
    pub(crate) fn from_map(errors: BTreeMap<String, FieldError>) -> Self {
        Self { errors }
    }

    /// Error recorded for an external name, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldError> {
        self.errors.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.errors.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate `(name, error)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// External names that failed, in name order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn into_inner(self) -> BTreeMap<String, FieldError> {
        self.errors
    }
}

impl fmt::Display for InputErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid input: ")?;
        for (i, (name, err)) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{name}: {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for InputErrors {}

/// Request keys that no field on the target consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnusedFields {
    names: BTreeSet<String>,
}

impl UnusedFields {
    pub(crate) fn new(names: BTreeSet<String>) -> Self {
        Self { names }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl fmt::Display for UnusedFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.names().collect();
        write!(f, "request contained unknown fields: {}", names.join(", "))
    }
}

impl std::error::Error for UnusedFields {}

/// Result of an unmarshal call that did not succeed.
#[derive(Debug)]
pub enum UnmarshalError {
    /// The target is not a non-null reference to a record.
    NotARecord,
    /// The parameter source could not produce its mapping.
    Params(anyhow::Error),
    /// The target's pre-unmarshal hook failed.
    PreUnmarshal(anyhow::Error),
    /// The target's custom unmarshaller failed.
    Custom(anyhow::Error),
    /// The target's post-unmarshal hook failed.
    PostUnmarshal(anyhow::Error),
    /// One or more fields failed.
    Fields(InputErrors),
    /// Every field succeeded but some request keys were never consumed.
    Unused(UnusedFields),
}

impl UnmarshalError {
    /// True for failures that aborted the call rather than being collected.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        !matches!(self, UnmarshalError::Fields(_) | UnmarshalError::Unused(_))
    }

    #[must_use]
    pub fn input_errors(&self) -> Option<&InputErrors> {
        match self {
            UnmarshalError::Fields(errors) => Some(errors),
            _ => None,
        }
    }

    #[must_use]
    pub fn unused_fields(&self) -> Option<&UnusedFields> {
        match self {
            UnmarshalError::Unused(unused) => Some(unused),
            _ => None,
        }
    }
}

impl fmt::Display for UnmarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmarshalError::NotARecord => write!(
                f,
                "the value passed to unmarshal must be a non-null reference to a record"
            ),
            UnmarshalError::Params(err) => write!(f, "failed to read request parameters: {err}"),
            UnmarshalError::PreUnmarshal(err) => write!(f, "pre-unmarshal hook failed: {err}"),
            UnmarshalError::Custom(err) => write!(f, "custom unmarshaller failed: {err}"),
            UnmarshalError::PostUnmarshal(err) => write!(f, "post-unmarshal hook failed: {err}"),
            UnmarshalError::Fields(errors) => errors.fmt(f),
            UnmarshalError::Unused(unused) => unused.fmt(f),
        }
    }
}

impl std::error::Error for UnmarshalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UnmarshalError::Params(err)
            | UnmarshalError::PreUnmarshal(err)
            | UnmarshalError::Custom(err)
            | UnmarshalError::PostUnmarshal(err) => Some(err.as_ref()),
            UnmarshalError::Fields(errors) => Some(errors),
            UnmarshalError::Unused(unused) => Some(unused),
            UnmarshalError::NotARecord => None,
        }
    }
}

impl From<InputErrors> for UnmarshalError {
    fn from(errors: InputErrors) -> Self {
        UnmarshalError::Fields(errors)
    }
}

impl From<UnusedFields> for UnmarshalError {
    fn from(unused: UnusedFields) -> Self {
        UnmarshalError::Unused(unused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_display_is_name_ordered() {
        let mut map = BTreeMap::new();
        map.insert("zeta".to_string(), FieldError::NullToNonPointer);
        map.insert(
            "alpha".to_string(),
            FieldError::Convert {
                from: "string",
                to: "bool".to_string(),
            },
        );
        let errors = InputErrors::from_map(map);
        assert_eq!(
            errors.to_string(),
            "invalid input: alpha: cannot convert value of type string to type bool; \
             zeta: cannot assign null to non-pointer value"
        );
        assert_eq!(errors.names().collect::<Vec<_>>(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_structural_classification() {
        assert!(UnmarshalError::NotARecord.is_structural());
        assert!(UnmarshalError::PreUnmarshal(anyhow::anyhow!("no")).is_structural());
        assert!(!UnmarshalError::Unused(UnusedFields::default()).is_structural());
        assert!(!UnmarshalError::Fields(InputErrors::default()).is_structural());
    }
}
