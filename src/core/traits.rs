//! Persistence abstraction for the bank state
//!
//! The service only needs to load a snapshot at startup and write one after
//! every mutating request. Implementations decide where it lives: a JSON file
//! on disk, or memory for tests and throwaway servers.

use crate::io::Snapshot;
use crate::types::LedgerError;

/// Storage for whole-bank snapshots
pub trait SnapshotStore: Send + Sync {
    /// Load the last saved snapshot
    ///
    /// Returns an empty snapshot when nothing has been saved yet.
    fn load(&self) -> Result<Snapshot, LedgerError>;

    /// Replace the saved snapshot
    fn save(&self, snapshot: &Snapshot) -> Result<(), LedgerError>;

    /// Short description for log lines
    fn describe(&self) -> String;
}
