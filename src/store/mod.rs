pub mod json;

pub use json::JsonStore;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::PhoneNumber;

/// Persistent mapping from phone number to the ordered, distinct names the
/// community has reported for it.
///
/// Values are append-only: names keep their insertion order (oldest first)
/// and a name already present for a number is never added twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommunityLedger {
    entries: BTreeMap<String, Vec<String>>,
}

impl CommunityLedger {
    /// Append `name` under `number` unless the exact string is already
    /// recorded. Returns whether the ledger changed, so the caller can skip
    /// persisting a no-op.
    pub fn record_if_new(&mut self, number: &PhoneNumber, name: &str) -> bool {
        let names = self.entries.entry(number.as_digits().to_owned()).or_default();

        if names.iter().any(|n| n == name) {
            return false;
        }

        names.push(name.to_owned());
        true
    }

    /// Names reported for `number`, oldest first. Empty when the number has
    /// never been reported.
    pub fn names_for(&self, number: &PhoneNumber) -> &[String] {
        self.entries
            .get(number.as_digits())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Errors from the backing store.
///
/// `Corrupt` aborts the request that hit it; an unreadable-but-present file
/// is never overwritten. `Persist` is best-effort territory: the caller logs
/// it and keeps going with in-memory state.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read report store at {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("report store at {path} is not valid JSON")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to persist report store at {path}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Trait for report persistence backends
pub trait ReportStore: Send + Sync {
    /// Load the full ledger, initializing an empty one if none exists yet
    fn load(&self) -> Result<CommunityLedger, StoreError>;

    /// Overwrite the backing resource with the complete ledger
    fn save(&self, ledger: &CommunityLedger) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(input: &str) -> PhoneNumber {
        PhoneNumber::parse(input).unwrap()
    }

    #[test]
    fn test_record_if_new_appends_once() {
        let mut ledger = CommunityLedger::default();
        let key = number("919876543210");

        assert!(ledger.record_if_new(&key, "Asha"));
        assert!(!ledger.record_if_new(&key, "Asha"));

        assert_eq!(ledger.names_for(&key), ["Asha"]);
    }

    #[test]
    fn test_record_if_new_is_case_sensitive() {
        let mut ledger = CommunityLedger::default();
        let key = number("919876543210");

        assert!(ledger.record_if_new(&key, "asha"));
        assert!(ledger.record_if_new(&key, "Asha"));

        assert_eq!(ledger.names_for(&key), ["asha", "Asha"]);
    }

    #[test]
    fn test_names_keep_insertion_order() {
        let mut ledger = CommunityLedger::default();
        let key = number("919876543210");

        for name in ["Asha", "Ravi", "Meera"] {
            assert!(ledger.record_if_new(&key, name));
        }

        assert_eq!(ledger.names_for(&key), ["Asha", "Ravi", "Meera"]);
    }

    #[test]
    fn test_names_for_unknown_number_is_empty() {
        let ledger = CommunityLedger::default();
        assert!(ledger.names_for(&number("919876543210")).is_empty());
    }

    #[test]
    fn test_numbers_do_not_share_reports() {
        let mut ledger = CommunityLedger::default();
        let first = number("919876543210");
        let second = number("14155552671");

        ledger.record_if_new(&first, "Asha");
        ledger.record_if_new(&second, "Bob");

        assert_eq!(ledger.names_for(&first), ["Asha"]);
        assert_eq!(ledger.names_for(&second), ["Bob"]);
    }
}
