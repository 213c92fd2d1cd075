//! Document tree errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("Unknown node: {0}")]
    UnknownNode(usize),

    #[error("Node {0} cannot have children")]
    NotAContainer(usize),

    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),
}
