//! Recursive traversal of a record's fields.
//!
//! For every field, in declaration order, the walker resolves the external
//! name, picks the candidate value, runs the option pipeline and stores the
//! result. Embedded records are walked as if their fields were declared on
//! the parent; their outcomes override the parent's for the same name.

use crate::collect::{ErrorLedger, MatchedNames};
use crate::field::{self, FieldDescriptor, IGNORE_NAME};
use crate::options::{apply_options, OptionRegistry};
use crate::record::{FieldMut, Record};
use crate::source::Params;
use crate::unmarshal::Mode;
use crate::value::Field;
use serde_json::Value;
use tracing::{debug, trace};

/// The value a field will be set from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Candidate {
    pub(crate) value: Value,
    /// Whether the value was taken from the request mapping
    pub(crate) from_request: bool,
}

/// Decide where a field's candidate value comes from.
///
/// Request value first. Otherwise the zero value (replace mode) or the
/// current value (default mode); an empty result is swapped for the type's
/// default value when it has one.
pub(crate) fn select_candidate(params: &Params, mode: Mode, slot: &dyn Field, name: &str) -> Candidate {
    if let Some(value) = params.get(name) {
        return Candidate {
            value: value.clone(),
            from_request: true,
        };
    }

    let zero = slot.zero();
    let value = match mode {
        Mode::Replace => zero.clone(),
        Mode::Default => slot.current(),
    };
    let value = if value.is_null() || value == zero {
        slot.fallback_value().unwrap_or(value)
    } else {
        value
    };
    Candidate {
        value,
        from_request: false,
    }
}

/// Accumulated result of walking one (sub)record.
#[derive(Debug)]
pub(crate) struct WalkOutcome {
    pub(crate) matched: MatchedNames,
    pub(crate) errors: ErrorLedger,
}

pub(crate) struct Walker<'a> {
    pub(crate) params: &'a Params,
    pub(crate) mode: Mode,
    pub(crate) registry: &'a OptionRegistry,
    pub(crate) fallback_tags: &'a [String],
}

impl Walker<'_> {
    /// Walk `record`, which sits `depth` embedding levels below the target.
    pub(crate) fn walk(&self, record: &mut dyn Record, depth: usize) -> WalkOutcome {
        let mut outcome = WalkOutcome {
            matched: MatchedNames::new(),
            errors: ErrorLedger::new(),
        };

        for (index, meta) in record.fields().iter().enumerate() {
            if meta.embedded {
                let Some(FieldMut::Embedded(slot)) = record.field_mut(index) else {
                    continue;
                };
                match slot.as_record_mut() {
                    Some(child) => {
                        let nested = self.walk(child, depth + 1);
                        outcome.matched.extend(nested.matched);
                        outcome.errors.merge(nested.errors);
                    }
                    None => trace!(field = meta.ident, "embedded record absent"),
                }
                continue;
            }

            if !meta.exported {
                continue;
            }
            let (name, options) = field::resolve(meta, self.fallback_tags);
            if name == IGNORE_NAME {
                continue;
            }
            let Some(FieldMut::Value(slot)) = record.field_mut(index) else {
                continue;
            };

            let candidate = select_candidate(self.params, self.mode, &*slot, &name);
            if candidate.from_request {
                outcome.matched.add(&name);
            }
            trace!(
                field = meta.ident,
                name = %name,
                from_request = candidate.from_request,
                depth,
                "field candidate selected"
            );

            let descriptor = FieldDescriptor {
                ident: meta.ident,
                name,
                options,
                zero: slot.zero(),
                retype: slot.retype(),
            };
            let current = slot.current();
            let value = match apply_options(self.registry, &descriptor, &current, candidate.value) {
                Ok(value) => value,
                Err(err) => {
                    debug!(name = %descriptor.name, error = %err, "field option failed");
                    outcome.errors.record(&descriptor.name, depth, Err(err));
                    continue;
                }
            };

            let stored = slot.set_value(value, candidate.from_request);
            if let Err(err) = &stored {
                debug!(name = %descriptor.name, error = %err, "field rejected value");
            }
            outcome.errors.record(&descriptor.name, depth, stored);
        }

        outcome
    }
}
