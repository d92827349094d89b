//! Arbor: an abstract view tree bridged to native handlers.
//!
//! Arbor keeps a mutable, ordered tree of platform-agnostic views, computes
//! their geometry with a two-pass measure/arrange protocol, and forwards
//! property changes to platform handlers through overridable mapper tables.
//!
//! # Quick Start
//!
//! The main entry points are:
//! - [`Tree`] - the node arena, structural mutation and dispatch
//! - [`Handler`] - the trait implemented by platform glue
//! - [`layout::LayoutManager`] - the measure/arrange algorithm for a container
//!
//! # Module Organization
//!
//! - [`geom`] - f64 geometry primitives
//! - [`layout`] - constraints, alignment and the built-in managers
//! - [`mapper`] - property and command dispatch tables
//! - [`property`] - well-known keys and value validation

/// Tree and node builders.
mod builder;
/// Input-transparency propagation.
mod cascade;
/// Child collections.
mod children;
/// Error types.
pub mod error;
/// Handler contract.
mod handler;
/// Node identifiers.
mod id;
pub mod layout;
pub mod mapper;
/// Node data.
mod node;
pub mod property;
/// Test helpers.
#[cfg(any(test, feature = "testing"))]
pub mod testing;
/// The view tree.
mod tree;
/// Dynamic values.
mod value;

pub use builder::{NodeBuilder, TreeBuilder};
pub use children::{ChildCollection, ChildList};
pub use geom;
pub use handler::{Handler, ViewRef};
pub use id::NodeId;
pub use node::{Node, ViewKind};
pub use property::Key;
pub use tree::Tree;
pub use value::{FromValue, ToValue, Value};
