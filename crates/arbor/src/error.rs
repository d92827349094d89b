use std::result::Result as StdResult;

use thiserror::Error;

use crate::{NodeId, geom::Axis};

/// Result type for arbor operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
///
/// Every variant describes a caller defect. Missing capabilities, such as a
/// node without a handler or a container without a layout manager, are not
/// errors and never surface here.
#[derive(PartialEq, Error, Debug, Clone)]
pub enum Error {
    /// Node does not exist in the tree.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// A child operation was attempted on a leaf view.
    #[error("node is not a container: {0:?}")]
    NotAContainer(NodeId),

    /// An indexed child operation was out of range.
    #[error("index {index} out of range for {len} children")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Collection length at the time of the call.
        len: usize,
    },

    /// A measure constraint was negative or not a number.
    #[error("invalid {} constraint: {value}", axis.name())]
    InvalidConstraint {
        /// Axis the constraint applies to.
        axis: Axis,
        /// Offending value.
        value: f64,
    },

    /// Arrange bounds were not finite or had negative extents.
    #[error("invalid bounds: {0}")]
    InvalidBounds(String),

    /// Attaching would make a node its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle {
        /// Intended parent.
        parent: NodeId,
        /// Child being attached.
        child: NodeId,
    },

    /// The child is already present in this container.
    #[error("{child:?} is already a child of {parent:?}")]
    DuplicateChild {
        /// Container.
        parent: NodeId,
        /// Duplicated child.
        child: NodeId,
    },

    /// A layout manager re-entered layout for its own container.
    #[error("re-entrant layout on {0:?}")]
    ReentrantLayout(NodeId),

    /// A property value had the wrong shape.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}
