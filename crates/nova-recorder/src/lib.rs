//! # Nova Recorder
//!
//! The in-page half of nova. A [`Recorder`] instruments every document it can
//! reach in a [`BrowsingContext`] (the top-level page, same-origin iframes,
//! popup windows and iframes nested in those), turns qualifying DOM events
//! into [`RecordedEvent`](nova_protocols::RecordedEvent)s and posts them on a
//! [`HostChannel`](nova_protocols::HostChannel).
//!
//! [`recorder_script`] renders the JavaScript rendition of the same engine,
//! which the CDP surface injects into real pages.

mod capture;
mod clock;
mod context;
mod error;
mod recorder;
mod script;

pub use capture::{capture_event, DomEvent};
pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{BrowsingContext, WindowId, WindowState};
pub use error::RecorderError;
pub use recorder::{Recorder, INSTALL_MARKER};
pub use script::recorder_script;
