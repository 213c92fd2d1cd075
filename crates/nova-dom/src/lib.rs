//! # Nova DOM
//!
//! A small arena-backed document model with just enough structure for the
//! recorder: element trees, attributes, form values, frame hosting, a
//! mutation log and per-document install markers.
//!
//! [`identify`] computes the two locators attached to every recorded event:
//! a short preference-ordered CSS selector and an absolute structural path.

mod builder;
mod document;
mod error;
pub mod identify;
mod node;

pub use builder::ElementBuilder;
pub use document::{Document, DocumentId, Mutation};
pub use error::DomError;
pub use identify::{css_selector, framed_selector, structural_path};
pub use node::{ElementData, FrameContent, Namespace, NodeData, NodeId};
