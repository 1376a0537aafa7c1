//! # Classbell Functions
//!
//! The server side of the fan-out pipeline: change-trigger handlers
//! (membership changes, task creation), the scheduled reminder scans
//! (deadlines, class starts), and the delivery orchestrator they all share.
//!
//! Every handler here completes normally no matter what fails underneath:
//! failures are logged at the point they happen and swallowed so the
//! triggering infrastructure never retries. The in-app record write is the
//! authoritative delivery; push is a best-effort side channel on top.

pub mod class_start_scan;
pub mod deadline_scan;
pub mod deliver;
pub mod membership;
pub mod schedule;
pub mod task_created;
pub mod triggers;

pub use deliver::Deliverer;
pub use triggers::ClassChange;
