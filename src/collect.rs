//! Accumulators filled in while walking a record: the set of matched request
//! names and the per-name field outcome ledger.

use crate::error::{FieldError, InputErrors};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// External names that some field consumed from the request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MatchedNames {
    names: BTreeSet<String>,
}

impl MatchedNames {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name. Returns false if it was already present.
    pub fn add(&mut self, name: &str) -> bool {
        if self.names.contains(name) {
            return false;
        }
        self.names.insert(name.to_string())
    }

    /// Union another set into this one.
    pub fn extend(&mut self, other: MatchedNames) {
        self.names.extend(other.names);
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

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Keys of `keys` that are not in this set.
    pub fn missing_from<'a, I>(&self, keys: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        keys.into_iter()
            .filter(|k| !self.names.contains(k.as_str()))
            .cloned()
            .collect()
    }
}

#[derive(Debug)]
struct Outcome {
    depth: usize,
    error: Option<FieldError>,
}

/// Per-name field outcomes, including successes.
///
/// A success is kept as an entry so that it can override a failure recorded
/// for the same name at a shallower embedding level. The entry with the
/// greatest depth wins; at equal depth the most recent one wins.
#[derive(Debug, Default)]
pub(crate) struct ErrorLedger {
    outcomes: BTreeMap<String, Outcome>,
}

impl ErrorLedger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of processing `name` at `depth`.
    ///
    /// Returns true when `outcome` was a failure.
    pub(crate) fn record(
        &mut self,
        name: &str,
        depth: usize,
        outcome: Result<(), FieldError>,
    ) -> bool {
        let error = outcome.err();
        let failed = error.is_some();
        self.insert(name.to_string(), Outcome { depth, error });
        failed
    }

    /// Fold a nested record's ledger into this one.
    pub(crate) fn merge(&mut self, child: ErrorLedger) {
        for (name, outcome) in child.outcomes {
            self.insert(name, outcome);
        }
    }

    fn insert(&mut self, name: String, outcome: Outcome) {
        match self.outcomes.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(outcome);
            }
            Entry::Occupied(mut slot) => {
                if outcome.depth >= slot.get().depth {
                    slot.insert(outcome);
                }
            }
        }
    }

    /// Number of names currently holding a failure.
    pub(crate) fn failure_count(&self) -> usize {
        self.outcomes.values().filter(|o| o.error.is_some()).count()
    }

    /// Drop successes; `None` when nothing failed.
    pub(crate) fn into_errors(self) -> Option<InputErrors> {
        let errors: BTreeMap<String, FieldError> = self
            .outcomes
            .into_iter()
            .filter_map(|(name, outcome)| outcome.error.map(|err| (name, err)))
            .collect();
        if errors.is_empty() {
            None
        } else {
            Some(InputErrors::from_map(errors))
        }
    }
}
