//! Long-running tasks wired up by the board bootstrap.

pub mod ingest;

pub use ingest::ingest_task;
