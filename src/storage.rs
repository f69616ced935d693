//! Durable storage seam for persisted state
//!
//! The physical filesystem is an external collaborator; this trait is
//! the slice of it the settings store needs. A mount failure at startup
//! is fatal for the application; read/write failures at runtime are
//! surfaced to the caller.

use thiserror::Error;

/// Storage operation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("filesystem mount failed")]
    Mount,
    #[error("failed to open file")]
    Open,
    #[error("read failed")]
    Read,
    #[error("write failed")]
    Write,
}

/// Minimal block-storage/file API consumed by the settings store.
pub trait Storage {
    /// Mount the filesystem; must be called before any other operation.
    fn mount(&mut self) -> Result<(), StorageError>;

    /// Whether a record exists at `path`.
    fn exists(&mut self, path: &str) -> Result<bool, StorageError>;

    /// Read the record at `path` into `buf`, returning the byte count.
    fn read(&mut self, path: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Replace the record at `path` with `data`.
    fn write(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError>;
}
