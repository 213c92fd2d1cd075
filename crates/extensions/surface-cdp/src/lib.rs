//! # nova-surface-cdp
//!
//! Chrome DevTools Protocol implementation of the nova browsing surface.
//!
//! The host drives one Chrome page through [`CdpSurface`]: scripts are run
//! with `Runtime.evaluate`, recorder messages arrive through a
//! `Runtime.addBinding` binding, and page lifecycle events are translated
//! into [`nova_protocols::SurfaceEvent`]s by [`SurfaceEventMapper`].

pub mod cdp;
pub mod events;
pub mod launcher;
pub mod surface;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use events::SurfaceEventMapper;
pub use surface::CdpSurface;
