//! # Nova Protocols
//!
//! Shared definitions for the nova recorder. Contains the data model that
//! crosses the recorder/host boundary, the wire codec for the one-way
//! channel, and the traits the host uses to talk to an embedded browsing
//! surface. No recording logic lives here.
//!
//! ## Core Types
//!
//! - [`RecordedEvent`] - One observed interaction, as emitted by the recorder
//! - [`ChannelMessage`] - The single message shape carried by the channel
//! - [`TimelineEvent`] - Host-side wrapper used for display and derivation
//! - [`TestStep`] - Derived instruction (description + code fragment)
//! - [`SavedTestPayload`] - Finished recording handed to persistence
//!
//! ## Core Traits
//!
//! - [`HostChannel`] - Fire-and-forget delivery from recorder to host
//! - [`BrowsingSurface`] - Script execution and navigation on the embedded page

pub mod channel;
pub mod error;
pub mod event;
pub mod message;
pub mod step;
pub mod surface;
pub mod timeline;

pub use channel::{ChannelSender, HostChannel};
pub use error::{ProtocolError, RecordingError, SurfaceError};
pub use event::{EventType, FrameContext, FrameKind, RecordedEvent};
pub use message::{ChannelMessage, RECORDED_EVENT};
pub use saved_test::{SavedTestPayload, TestType};
pub use step::TestStep;
pub use surface::{BrowsingSurface, LoadFailure, SurfaceEvent};
pub use timeline::{TimelineEntry, TimelineEvent};
