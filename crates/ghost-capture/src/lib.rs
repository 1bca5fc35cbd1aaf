//! Change capture for the GHOST ledger.
//!
//! A [`DirectoryWatcher`] turns file-system notifications into
//! [`ChangeEvent`]s, an [`IgnoreFilter`] drops noise, and a
//! [`LedgerWriter`] stages the events into a shared chain and seals
//! blocks off the ingest path.

pub mod error;
pub mod filter;
pub mod monitor;
pub mod watcher;
pub mod writer;

pub use error::{CaptureError, Result};
pub use filter::IgnoreFilter;
pub use monitor::{run_monitor, MonitorOptions};
pub use watcher::{classify_event, ChangeEvent, DirectoryWatcher};
pub use writer::{LedgerWriter, WriterStats};
