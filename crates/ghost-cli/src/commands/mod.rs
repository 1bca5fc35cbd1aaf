//! Command implementations.

mod audit;
mod check;
mod commit;
mod history;
mod init;
mod monitor;
mod record;
mod summary;
mod verify;

pub use audit::AuditCommand;
pub use check::CheckCommand;
pub use commit::CommitCommand;
pub use history::HistoryCommand;
pub use init::InitCommand;
pub use monitor::MonitorCommand;
pub use record::RecordCommand;
pub use summary::SummaryCommand;
pub use verify::VerifyCommand;
