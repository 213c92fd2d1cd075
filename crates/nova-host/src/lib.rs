//! # Nova Host
//!
//! The controlling half of nova. Raw channel messages flow through
//!
//! ```text
//! channel -> ingest -> input debounce -> dedup -> active timeline tab
//!                                              -> raw accumulator -> test steps
//! ```
//!
//! [`RecordingSession`] holds the synchronous state machine. [`HostProcessor`]
//! runs it as a task that owns the debounce timer, and [`SurfaceDriver`]
//! connects it to an embedded browsing surface (navigation events, recorder
//! re-injection, popup instrumentation and load-failure retries).

mod debounce;
mod dedup;
mod driver;
mod error;
mod load_failure;
mod navigation;
mod processor;
mod save;
mod session;
mod snapshot;
mod steps;
mod summary;
mod tabs;

pub use debounce::InputDebouncer;
pub use dedup::DedupFilter;
pub use driver::SurfaceDriver;
pub use error::HostError;
pub use load_failure::{LoadFailureKind, RetryPolicy};
pub use navigation::NavigationTracker;
pub use processor::{HostHandle, HostProcessor};
pub use save::{build_saved_test, SaveOptions};
pub use session::{IngestOutcome, RecordingSession, SessionState};
pub use snapshot::RecordingSnapshot;
pub use steps::generate_steps;
pub use summary::{action_fragment, action_summary, format_summaries};
pub use tabs::{TimelineTab, TimelineTabs};
