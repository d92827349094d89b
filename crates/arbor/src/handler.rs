//! The platform handler contract and the read-only view handed to it.

use std::{any::Any, ops::Deref};

use crate::{
    NodeId, Tree,
    geom::{Rect, Size},
    layout::Constraint,
    mapper::CommandArgs,
    node::Node,
    property::Key,
};

/// Read-only access to one node and the tree around it.
///
/// Mapper actions and handler callbacks receive a `ViewRef`; they can read
/// anything in the tree but cannot mutate it.
#[derive(Clone, Copy)]
pub struct ViewRef<'a> {
    /// Tree the node lives in.
    tree: &'a Tree,
    /// Node id.
    id: NodeId,
    /// Node data.
    node: &'a Node,
}

impl<'a> ViewRef<'a> {
    /// Construct a view reference.
    pub(crate) fn new(tree: &'a Tree, id: NodeId, node: &'a Node) -> Self {
        Self { tree, id, node }
    }

    /// The node's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The tree the node lives in.
    pub fn tree(&self) -> &'a Tree {
        self.tree
    }

    /// The node's data.
    pub fn node(&self) -> &'a Node {
        self.node
    }

    /// The parent view, if attached.
    pub fn parent(&self) -> Option<Self> {
        self.node.parent.and_then(|p| self.tree.view(p))
    }

    /// Child views in order.
    pub fn children(&self) -> impl Iterator<Item = ViewRef<'a>> + 'a {
        let tree = self.tree;
        self.node
            .children
            .iter()
            .filter_map(move |child| tree.view(*child))
    }
}

impl Deref for ViewRef<'_> {
    type Target = Node;

    fn deref(&self) -> &Node {
        self.node
    }
}

/// Platform-side counterpart of a view.
///
/// A handler is owned by exactly one node at a time. The tree calls
/// [`Handler::connect`] when it is attached, replays every mapped property
/// through the mapper, and calls [`Handler::disconnect`] before it is
/// detached or replaced.
pub trait Handler {
    /// Execute a command routed through the command mapper.
    fn invoke(&mut self, view: &ViewRef<'_>, command: &Key, args: Option<&CommandArgs>);

    /// Push the current value of `key` to the platform element.
    fn update_value(&mut self, view: &ViewRef<'_>, key: &Key);

    /// Called after the handler is attached and before the property replay.
    fn connect(&mut self, _view: &ViewRef<'_>) {}

    /// Release the platform element.
    fn disconnect(&mut self);

    /// Intrinsic size of the platform element, used for leaves without
    /// explicit size requests.
    fn desired_size(
        &mut self,
        _view: &ViewRef<'_>,
        _width: Constraint,
        _height: Constraint,
    ) -> Option<Size> {
        None
    }

    /// Position the platform element after the core has arranged the node.
    fn platform_arrange(&mut self, _view: &ViewRef<'_>, _frame: Rect) {}

    /// Called on every node of a subtree before it is removed from the tree.
    fn pre_remove(&mut self, _view: &ViewRef<'_>) {}

    /// Downcast hook for tests and platform glue.
    fn as_any_mut(&mut self) -> Option<&mut dyn Any> {
        None
    }
}

impl dyn Handler {
    /// Downcast to a concrete handler type.
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut()?.downcast_mut::<T>()
    }
}
