use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{CommunityLedger, ReportStore, StoreError};

/// Flat-file JSON store: one object, key = digit string, value = array of
/// reported names.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Serialize and write the ledger via a sibling temp file, then rename
    /// over the target so readers never observe a half-written file.
    fn write_atomic(&self, ledger: &CommunityLedger) -> Result<(), StoreError> {
        let content = serde_json::to_vec_pretty(ledger).map_err(|source| StoreError::Persist {
            path: self.path.clone(),
            source: source.into(),
        })?;

        let tmp = self.path.with_extension("json.tmp");

        fs::write(&tmp, content).map_err(|source| StoreError::Persist {
            path: self.path.clone(),
            source,
        })?;

        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Persist {
            path: self.path.clone(),
            source,
        })?;

        Ok(())
    }
}

impl ReportStore for JsonStore {
    fn load(&self) -> Result<CommunityLedger, StoreError> {
        if !self.path.exists() {
            let ledger = CommunityLedger::default();
            self.write_atomic(&ledger)?;
            info!(path = %self.path.display(), "Initialized empty report store");
            return Ok(ledger);
        }

        let content = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, ledger: &CommunityLedger) -> Result<(), StoreError> {
        self.write_atomic(ledger)?;

        debug!(path = %self.path.display(), "Saved report store");

        Ok(())
    }
}
