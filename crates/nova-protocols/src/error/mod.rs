//! Error types shared across nova crates.

mod protocol;
mod recording;
mod surface;

pub use protocol::*;
pub use recording::*;
pub use surface::*;
