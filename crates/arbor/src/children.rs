//! Ordered child collections and the structural mutation path.
//!
//! Every mutation validates first and mutates second, so an error never
//! leaves a partial change behind. Within one call, notifications for the
//! view leaving a slot always precede notifications for the view entering
//! it.

use std::{iter::Copied, slice};

use tracing::debug;

use crate::{
    NodeId, Tree, cascade,
    error::{Error, Result},
    mapper::{ChildUpdate, CommandArgs},
    property::{Key, commands, keys},
};

/// Read-only view of a container's children.
#[derive(Debug, Clone, Copy)]
pub struct ChildList<'a> {
    /// Children in order.
    children: &'a [NodeId],
}

impl<'a> ChildList<'a> {
    /// Wrap a child slice.
    pub(crate) fn new(children: &'a [NodeId]) -> Self {
        Self { children }
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True if there are no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// True if `child` is in the collection.
    pub fn contains(&self, child: NodeId) -> bool {
        self.children.contains(&child)
    }

    /// Position of `child`, if present.
    pub fn index_of(&self, child: NodeId) -> Option<usize> {
        self.children.iter().position(|c| *c == child)
    }

    /// Child at `index`.
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.children.get(index).copied()
    }

    /// Iterate children in order. The iterator can be cloned and restarted.
    pub fn iter(&self) -> Copied<slice::Iter<'a, NodeId>> {
        self.children.iter().copied()
    }

    /// The children as a slice.
    pub fn as_slice(&self) -> &'a [NodeId] {
        self.children
    }
}

impl<'a> IntoIterator for ChildList<'a> {
    type Item = NodeId;
    type IntoIter = Copied<slice::Iter<'a, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter().copied()
    }
}

/// Mutation handle for a container's children.
///
/// Absent views (`None`) passed to `add`, `insert` or `replace` are ignored.
pub struct ChildCollection<'a> {
    /// Tree being mutated.
    tree: &'a mut Tree,
    /// Container that owns the collection.
    container: NodeId,
}

impl<'a> ChildCollection<'a> {
    /// Construct a handle. The caller has checked that `container` is a container.
    pub(crate) fn new(tree: &'a mut Tree, container: NodeId) -> Self {
        Self { tree, container }
    }

    /// The container's children, read-only.
    pub fn list(&self) -> ChildList<'_> {
        ChildList::new(slots(self.tree, self.container))
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.list().len()
    }

    /// True if there are no children.
    pub fn is_empty(&self) -> bool {
        self.list().is_empty()
    }

    /// True if `child` is in the collection.
    pub fn contains(&self, child: NodeId) -> bool {
        self.list().contains(child)
    }

    /// Position of `child`, if present.
    pub fn index_of(&self, child: NodeId) -> Option<usize> {
        self.list().index_of(child)
    }

    /// Child at `index`.
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.list().get(index)
    }

    /// Append a view.
    pub fn add(&mut self, child: impl Into<Option<NodeId>>) -> Result<()> {
        let Some(child) = child.into() else {
            return Ok(());
        };
        check_attachable(self.tree, self.container, child)?;
        detach_from_parent(self.tree, child)?;
        let index = self.len();
        link(self.tree, self.container, index, child, &commands::ADD)?;
        after_addition(self.tree, self.container)
    }

    /// Insert a view at `index`. `index == len` appends.
    pub fn insert(&mut self, index: usize, child: impl Into<Option<NodeId>>) -> Result<()> {
        let Some(child) = child.into() else {
            return Ok(());
        };
        let len = self.len();
        if index > len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        check_attachable(self.tree, self.container, child)?;
        detach_from_parent(self.tree, child)?;
        link(self.tree, self.container, index, child, &commands::INSERT)?;
        after_addition(self.tree, self.container)
    }

    /// Remove and return the child at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<NodeId> {
        let len = self.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        let child = unlink(self.tree, self.container, index)?;
        self.tree.invalidate_measure(self.container)?;
        self.tree.ensure_invariants();
        Ok(child)
    }

    /// Remove `child` if present. Returns `false` if it was not a child.
    pub fn remove(&mut self, child: NodeId) -> Result<bool> {
        match self.index_of(child) {
            Some(index) => self.remove_at(index).map(|_| true),
            None => Ok(false),
        }
    }

    /// Remove every child.
    ///
    /// `Remove` is sent for each child from the last index to the first,
    /// then the collection is emptied and `Clear` is sent. Clearing an
    /// empty collection does nothing.
    pub fn clear(&mut self) -> Result<()> {
        let children = slots(self.tree, self.container).to_vec();
        if children.is_empty() {
            return Ok(());
        }
        for (index, child) in children.iter().enumerate().rev() {
            notify_removal(self.tree, self.container, index, *child)?;
        }
        if let Some(node) = self.tree.nodes.get_mut(self.container) {
            node.children.clear();
        }
        self.tree.invoke(self.container, &commands::CLEAR, None)?;
        debug!(container = ?self.container, removed = children.len(), "cleared children");
        self.tree.invalidate_measure(self.container)?;
        self.tree.ensure_invariants();
        Ok(())
    }

    /// Put `child` in slot `index`, returning the view it displaced.
    ///
    /// Replacing a view with itself does nothing. Otherwise the old view
    /// receives the removal path and the new view the insertion path at
    /// the same index.
    pub fn replace(
        &mut self,
        index: usize,
        child: impl Into<Option<NodeId>>,
    ) -> Result<Option<NodeId>> {
        let Some(child) = child.into() else {
            return Ok(None);
        };
        let len = self.len();
        let Some(old) = self.get(index) else {
            return Err(Error::IndexOutOfRange { index, len });
        };
        if old == child {
            return Ok(None);
        }
        check_attachable(self.tree, self.container, child)?;
        detach_from_parent(self.tree, child)?;
        unlink(self.tree, self.container, index)?;
        link(self.tree, self.container, index, child, &commands::INSERT)?;
        after_addition(self.tree, self.container)?;
        Ok(Some(old))
    }
}

/// The raw child slice of a node, empty if it is missing.
fn slots(tree: &Tree, container: NodeId) -> &[NodeId] {
    tree.nodes
        .get(container)
        .map(|n| n.children.as_slice())
        .unwrap_or_default()
}

/// Validate that `child` may be attached under `container`.
fn check_attachable(tree: &Tree, container: NodeId, child: NodeId) -> Result<()> {
    let node = tree
        .nodes
        .get(container)
        .ok_or(Error::NodeNotFound(container))?;
    if !node.is_container() {
        return Err(Error::NotAContainer(container));
    }
    if !tree.contains(child) {
        return Err(Error::NodeNotFound(child));
    }
    if tree.is_ancestor(child, container) {
        return Err(Error::WouldCreateCycle {
            parent: container,
            child,
        });
    }
    if node.children.contains(&child) {
        return Err(Error::DuplicateChild {
            parent: container,
            child,
        });
    }
    Ok(())
}

/// Structural command payload.
fn payload(index: usize, child: NodeId) -> CommandArgs {
    CommandArgs::Child(ChildUpdate { index, child })
}

/// Clear a child's parent link and tell the container it is leaving `index`.
fn notify_removal(tree: &mut Tree, container: NodeId, index: usize, child: NodeId) -> Result<()> {
    if let Some(node) = tree.nodes.get_mut(child) {
        node.parent = None;
    }
    tree.invoke(container, &commands::REMOVE, Some(&payload(index, child)))?;
    Ok(())
}

/// Detach the child at `index`: notify, then vacate the slot.
fn unlink(tree: &mut Tree, container: NodeId, index: usize) -> Result<NodeId> {
    let child = slots(tree, container)
        .get(index)
        .copied()
        .ok_or(Error::IndexOutOfRange {
            index,
            len: slots(tree, container).len(),
        })?;
    notify_removal(tree, container, index, child)?;
    if let Some(node) = tree.nodes.get_mut(container) {
        node.children.remove(index);
    }
    debug!(?container, ?child, index, "child removed");
    Ok(child)
}

/// Fill slot `index` with `child`, then notify.
fn link(
    tree: &mut Tree,
    container: NodeId,
    index: usize,
    child: NodeId,
    command: &Key,
) -> Result<()> {
    let node = tree
        .nodes
        .get_mut(container)
        .ok_or(Error::NodeNotFound(container))?;
    node.children.insert(index, child);
    if let Some(node) = tree.nodes.get_mut(child) {
        node.parent = Some(container);
    }
    tree.invoke(container, command, Some(&payload(index, child)))?;
    tree.update_value(container, &keys::CASCADE_INPUT_TRANSPARENT)?;
    debug!(?container, ?child, index, %command, "child attached");
    Ok(())
}

/// Invalidate and re-run the cascade after a view joined `container`.
fn after_addition(tree: &mut Tree, container: NodeId) -> Result<()> {
    tree.invalidate_measure(container)?;
    cascade::cascade_input_transparent(tree, container)?;
    tree.ensure_invariants();
    Ok(())
}

/// Remove `child` from its current parent, if any, through the removal path.
pub(crate) fn detach_from_parent(tree: &mut Tree, child: NodeId) -> Result<()> {
    let Some(parent) = tree.parent(child) else {
        return Ok(());
    };
    let Some(index) = slots(tree, parent).iter().position(|c| *c == child) else {
        return Ok(());
    };
    unlink(tree, parent, index)?;
    tree.invalidate_measure(parent)
}
