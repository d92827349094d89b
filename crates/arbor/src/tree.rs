#[cfg(debug_assertions)]
use std::collections::HashSet;
use std::{any::Any, rc::Rc};

use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::{
    NodeId,
    builder::{NodeBuilder, TreeBuilder},
    cascade,
    children::{self, ChildCollection, ChildList},
    error::{Error, Result},
    geom::{Axis, Rect, Size},
    handler::{Handler, ViewRef},
    layout::{
        Constraint, LayoutKind, LayoutManagerFactory,
        engine::{self, ManagerSlot},
    },
    mapper::{CommandArgs, MapperKind, Mappers},
    node::{Node, ViewKind},
    property::{self, Key, commands, keys},
    value::{ToValue, Value},
};

/// The view tree: an arena of nodes, the mapper registry and the injected
/// layout context.
///
/// Every structural and property mutation runs through the tree so that
/// handlers are notified synchronously and in a fixed order.
pub struct Tree {
    /// Node arena.
    pub(crate) nodes: SlotMap<NodeId, Node>,
    /// Registry entry for leaf views.
    view_mappers: Rc<Mappers>,
    /// Registry entry for containers.
    container_mappers: Rc<Mappers>,
    /// Injected source of layout managers.
    pub(crate) layout_factory: Option<Rc<dyn LayoutManagerFactory>>,
    /// Run structural invariant checks after each mutation.
    check_invariants: bool,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create an empty tree with the default mapper tables.
    pub fn new() -> Self {
        TreeBuilder::new().build()
    }

    /// Start configuring a tree.
    pub fn builder() -> TreeBuilder {
        TreeBuilder::new()
    }

    /// Assemble a tree from builder parts.
    pub(crate) fn from_parts(
        view_mappers: Mappers,
        container_mappers: Mappers,
        layout_factory: Option<Rc<dyn LayoutManagerFactory>>,
        check_invariants: bool,
    ) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            view_mappers: Rc::new(view_mappers),
            container_mappers: Rc::new(container_mappers),
            layout_factory,
            check_invariants,
        }
    }

    /// Create a detached leaf view.
    pub fn create_view(&mut self) -> NodeId {
        let id = self.nodes.insert(Node::new(ViewKind::View));
        trace!(?id, "created view");
        id
    }

    /// Create a detached container.
    pub fn create_container(&mut self, kind: LayoutKind) -> NodeId {
        let id = self.nodes.insert(Node::new(ViewKind::Container(kind)));
        trace!(?id, ?kind, "created container");
        id
    }

    /// Create a leaf view and configure it fluently.
    pub fn build_view(&mut self) -> NodeBuilder<'_> {
        let id = self.create_view();
        NodeBuilder::new(self, id)
    }

    /// Create a container and configure it fluently.
    pub fn build_container(&mut self, kind: LayoutKind) -> NodeBuilder<'_> {
        let id = self.create_container(kind);
        NodeBuilder::new(self, id)
    }

    /// Return true if the node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Borrow a node as a [`ViewRef`].
    pub fn view(&self, id: NodeId) -> Option<ViewRef<'_>> {
        self.nodes.get(id).map(|node| ViewRef::new(self, id, node))
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the tree holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Return a node's parent.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Return true if `ancestor` appears in the parent chain of `node`, or is `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// Borrow a node or fail with `NodeNotFound`.
    fn get(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(Error::NodeNotFound(id))
    }

    /// Mutably borrow a node or fail with `NodeNotFound`.
    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))
    }

    /// Return a raw property value.
    pub fn property(&self, id: NodeId, key: &Key) -> Option<&Value> {
        self.nodes.get(id).and_then(|n| n.property(key))
    }

    /// Set a property. Returns `true` if the stored value changed.
    ///
    /// A change runs the property-changed path: measure invalidation for
    /// size-affecting keys, dispatch through the property mapper, then the
    /// transparency cascade for the transparency keys.
    pub fn set_property(
        &mut self,
        id: NodeId,
        key: impl Into<Key>,
        value: impl ToValue,
    ) -> Result<bool> {
        let key = key.into();
        let value = value.to_value();
        property::validate(&key, &value)?;
        let node = self.get_mut(id)?;
        if node.properties.get(&key) == Some(&value) {
            return Ok(false);
        }
        node.properties.insert(key.clone(), value);
        self.property_changed(id, &key)?;
        Ok(true)
    }

    /// Remove a property, restoring its default. Returns `true` if it was set.
    pub fn clear_property(&mut self, id: NodeId, key: &Key) -> Result<bool> {
        let node = self.get_mut(id)?;
        if node.properties.shift_remove(key).is_none() {
            return Ok(false);
        }
        self.property_changed(id, key)?;
        Ok(true)
    }

    /// Propagate a property change.
    fn property_changed(&mut self, id: NodeId, key: &Key) -> Result<()> {
        trace!(?id, %key, "property changed");
        if self.effective_mappers(id)?.affects_measure(key) {
            self.invalidate_measure(id)?;
        }
        self.update_value(id, key)?;
        if *key == keys::INPUT_TRANSPARENT || *key == keys::CASCADE_INPUT_TRANSPARENT {
            cascade::cascade_input_transparent(self, id)?;
        }
        Ok(())
    }

    /// Push a property to the node's handler through the effective mapper.
    ///
    /// Without a handler the update is deferred: the attach replay delivers
    /// the current value later.
    pub fn update_value(&mut self, id: NodeId, key: &Key) -> Result<()> {
        let mappers = self.effective_mappers(id)?;
        let dispatched = self.with_handler_mut(id, |view, handler| {
            mappers.update_property(view, handler, key)
        });
        match dispatched {
            Some(true) => trace!(?id, %key, "update dispatched"),
            Some(false) => trace!(?id, %key, "no mapper entry"),
            None => trace!(?id, %key, "update deferred: no handler"),
        }
        Ok(())
    }

    /// Route a command through the node's command mapper.
    ///
    /// Returns `true` if an action ran.
    pub fn invoke(
        &mut self,
        id: NodeId,
        command: &Key,
        args: Option<&CommandArgs>,
    ) -> Result<bool> {
        let mappers = self.effective_mappers(id)?;
        let ran = self
            .with_handler_mut(id, |view, handler| mappers.invoke(view, handler, command, args))
            .unwrap_or(false);
        trace!(?id, %command, ran, "invoke");
        Ok(ran)
    }

    /// The registry entry for a kind of view.
    pub fn mappers(&self, kind: MapperKind) -> Rc<Mappers> {
        match kind {
            MapperKind::View => Rc::clone(&self.view_mappers),
            MapperKind::Container => Rc::clone(&self.container_mappers),
        }
    }

    /// Replace the registry entry for a kind of view.
    ///
    /// Attached handlers are not replayed; the new table applies to later
    /// dispatches.
    pub fn set_kind_mappers(&mut self, kind: MapperKind, mappers: Mappers) {
        match kind {
            MapperKind::View => self.view_mappers = Rc::new(mappers),
            MapperKind::Container => self.container_mappers = Rc::new(mappers),
        }
    }

    /// Install or remove a per-node mapper override.
    pub fn set_mappers(&mut self, id: NodeId, mappers: Option<Mappers>) -> Result<()> {
        self.get_mut(id)?.mappers = mappers.map(Rc::new);
        Ok(())
    }

    /// The tables a node dispatches through.
    pub fn effective_mappers(&self, id: NodeId) -> Result<Rc<Mappers>> {
        let node = self.get(id)?;
        Ok(match &node.mappers {
            Some(mappers) => Rc::clone(mappers),
            None => self.mappers(match node.kind {
                ViewKind::View => MapperKind::View,
                ViewKind::Container(_) => MapperKind::Container,
            }),
        })
    }

    /// Attach a handler, returning the one it replaced.
    ///
    /// The replaced handler is disconnected first. The new handler is
    /// connected and every entry of the effective property table is
    /// replayed in registration order.
    pub fn attach_handler(
        &mut self,
        id: NodeId,
        handler: Box<dyn Handler>,
    ) -> Result<Option<Box<dyn Handler>>> {
        let previous = self.release_handler(id)?;
        let mappers = self.effective_mappers(id)?;
        self.invalidate_intrinsic_size(id)?;
        self.get_mut(id)?.handler = Some(handler);
        self.with_handler_mut(id, |view, handler| {
            handler.connect(view);
            mappers.update_properties(view, handler);
        });
        debug!(?id, replay = mappers.properties.len(), "attached handler");
        Ok(previous)
    }

    /// Disconnect and return a node's handler.
    ///
    /// A measured leaf loses its cached size, since its intrinsic size came
    /// from the handler.
    pub fn detach_handler(&mut self, id: NodeId) -> Result<Option<Box<dyn Handler>>> {
        let handler = self.release_handler(id)?;
        if handler.is_some() {
            self.invalidate_intrinsic_size(id)?;
        }
        Ok(handler)
    }

    /// Take a node's handler out and disconnect it.
    fn release_handler(&mut self, id: NodeId) -> Result<Option<Box<dyn Handler>>> {
        let mut handler = self.get_mut(id)?.handler.take();
        if let Some(handler) = handler.as_mut() {
            handler.disconnect();
            debug!(?id, "detached handler");
        }
        Ok(handler)
    }

    /// Invalidate a measured leaf whose handler changed.
    fn invalidate_intrinsic_size(&mut self, id: NodeId) -> Result<()> {
        let node = self.get(id)?;
        if !node.is_container() && node.is_measure_valid() {
            self.invalidate_measure(id)?;
        }
        Ok(())
    }

    /// Move the handler from one node to another.
    ///
    /// The handler is disconnected from `from` before it is connected to
    /// `to`. Returns the handler `to` held before, already disconnected.
    /// Does nothing if `from` has no handler.
    pub fn move_handler(&mut self, from: NodeId, to: NodeId) -> Result<Option<Box<dyn Handler>>> {
        self.get(to)?;
        if from == to {
            return Ok(None);
        }
        match self.detach_handler(from)? {
            Some(handler) => self.attach_handler(to, handler),
            None => Ok(None),
        }
    }

    /// Return true if a handler is attached.
    pub fn has_handler(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(Node::has_handler)
    }

    /// Borrow a node's handler as a concrete type.
    pub fn handler_mut<T: Any>(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes
            .get_mut(id)?
            .handler
            .as_deref_mut()?
            .downcast_mut::<T>()
    }

    /// Run `f` with a node's handler taken out of its slot.
    ///
    /// Returns `None` if the node has no handler.
    pub(crate) fn with_handler_mut<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&ViewRef<'_>, &mut dyn Handler) -> R,
    ) -> Option<R> {
        let mut handler = self.nodes.get_mut(id)?.handler.take()?;
        let result = self.view(id).map(|view| f(&view, handler.as_mut()));
        if let Some(node) = self.nodes.get_mut(id)
            && node.handler.is_none()
        {
            node.handler = Some(handler);
        }
        result
    }

    /// Read-only handle to a container's children.
    pub fn children(&self, id: NodeId) -> Result<ChildList<'_>> {
        let node = self.get(id)?;
        if !node.is_container() {
            return Err(Error::NotAContainer(id));
        }
        Ok(ChildList::new(node.children()))
    }

    /// Mutation handle for a container's children.
    pub fn children_mut(&mut self, id: NodeId) -> Result<ChildCollection<'_>> {
        if !self.get(id)?.is_container() {
            return Err(Error::NotAContainer(id));
        }
        Ok(ChildCollection::new(self, id))
    }

    /// Remove a node and all of its descendants.
    ///
    /// Each node of the subtree receives `pre_remove` and `disconnect` in
    /// pre-order. The node is then removed from its parent with the usual
    /// structural notifications, parent links are cleared, and the arena
    /// entries are released children first.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<()> {
        self.get(id)?;
        let pre_order = self.subtree_pre_order(id);
        for node_id in &pre_order {
            self.with_handler_mut(*node_id, |view, handler| handler.pre_remove(view));
            self.release_handler(*node_id)?;
        }

        children::detach_from_parent(self, id)?;
        for node_id in &pre_order {
            if let Some(node) = self.nodes.get_mut(*node_id) {
                node.parent = None;
            }
        }

        for node_id in self.subtree_post_order(id) {
            self.nodes.remove(node_id);
        }
        debug!(?id, removed = pre_order.len(), "removed subtree");
        self.ensure_invariants();
        Ok(())
    }

    /// Collect a subtree in pre-order, including the root.
    fn subtree_pre_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(node_id) = stack.pop() {
            let Some(node) = self.nodes.get(node_id) else {
                continue;
            };
            out.push(node_id);
            for child in node.children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Collect a subtree in post-order, including the root.
    fn subtree_post_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![(root, false)];
        while let Some((node_id, visited)) = stack.pop() {
            let Some(node) = self.nodes.get(node_id) else {
                continue;
            };
            if visited {
                out.push(node_id);
                continue;
            }
            stack.push((node_id, true));
            for child in node.children.iter().rev() {
                stack.push((*child, false));
            }
        }
        out
    }

    /// Measure a node. `f64::INFINITY` means unconstrained.
    pub fn measure(&mut self, id: NodeId, width: f64, height: f64) -> Result<Size> {
        let width = Constraint::new(Axis::Horizontal, width)?;
        let height = Constraint::new(Axis::Vertical, height)?;
        self.measure_with(id, width, height)
    }

    /// Measure a node with validated constraints.
    pub fn measure_with(&mut self, id: NodeId, width: Constraint, height: Constraint) -> Result<Size> {
        engine::measure(self, id, width, height)
    }

    /// Arrange a node into `bounds`, returning the size it consumed.
    pub fn arrange(&mut self, id: NodeId, bounds: Rect) -> Result<Size> {
        engine::arrange(self, id, bounds)
    }

    /// The size from the node's last valid measure.
    pub fn desired_size(&self, id: NodeId) -> Option<Size> {
        self.nodes.get(id).and_then(Node::desired_size)
    }

    /// The frame from the node's last arrange.
    pub fn frame(&self, id: NodeId) -> Option<Rect> {
        self.nodes.get(id).and_then(Node::frame)
    }

    /// Return true if the node holds a valid cached measurement.
    pub fn is_measure_valid(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(Node::is_measure_valid)
    }

    /// Invalidate the measure cache of a node and all of its ancestors.
    ///
    /// Each node on the chain with a handler receives `InvalidateMeasure`.
    pub fn invalidate_measure(&mut self, id: NodeId) -> Result<()> {
        self.get(id)?;
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.nodes.get_mut(node_id) else {
                break;
            };
            node.measure_cache = None;
            current = node.parent;
            self.invoke(node_id, &commands::INVALIDATE_MEASURE, None)?;
        }
        trace!(?id, "invalidated measure");
        Ok(())
    }

    /// Replace the injected layout manager factory.
    ///
    /// Every container re-resolves its manager on next use and every
    /// cached measurement is dropped.
    pub fn set_layout_factory(&mut self, factory: Option<Rc<dyn LayoutManagerFactory>>) {
        self.layout_factory = factory;
        for (_, node) in self.nodes.iter_mut() {
            node.manager = ManagerSlot::Unresolved;
            node.measure_cache = None;
        }
        debug!(nodes = self.nodes.len(), "layout context changed");
    }

    /// Drop a container's cached manager so it is resolved again.
    pub fn invalidate_layout_manager(&mut self, id: NodeId) -> Result<()> {
        self.get_mut(id)?.manager = ManagerSlot::Unresolved;
        self.invalidate_measure(id)
    }

    /// Run the debug invariant checks if enabled.
    pub(crate) fn ensure_invariants(&self) {
        if self.check_invariants {
            self.debug_assert_tree_invariants();
        }
    }

    /// Assert structural invariants on the node tree in debug builds.
    #[cfg(debug_assertions)]
    pub(crate) fn debug_assert_tree_invariants(&self) {
        for (id, node) in self.nodes.iter() {
            self.debug_assert_node_links(id, node);
            self.debug_assert_no_cycle(id);
        }
    }

    /// Release builds skip the invariant checks.
    #[cfg(not(debug_assertions))]
    pub(crate) fn debug_assert_tree_invariants(&self) {}

    /// Assert parent/child link invariants for a specific node in debug builds.
    #[cfg(debug_assertions)]
    fn debug_assert_node_links(&self, id: NodeId, node: &Node) {
        debug_assert!(
            node.is_container() || node.children.is_empty(),
            "leaf {id:?} has children"
        );
        let mut seen = HashSet::with_capacity(node.children.len());
        for child in &node.children {
            debug_assert!(
                seen.insert(*child),
                "duplicate child {child:?} under {id:?}"
            );
            let child_node = self.nodes.get(*child);
            debug_assert!(child_node.is_some(), "child {child:?} missing");
            if let Some(child_node) = child_node {
                debug_assert!(
                    child_node.parent == Some(id),
                    "child {child:?} parent mismatch under {id:?}"
                );
            }
        }

        if let Some(parent) = node.parent {
            let parent_node = self.nodes.get(parent);
            debug_assert!(parent_node.is_some(), "parent {parent:?} missing");
            if let Some(parent_node) = parent_node {
                debug_assert!(
                    parent_node.children.contains(&id),
                    "parent {parent:?} missing child {id:?}"
                );
            }
        }
    }

    /// Assert that the parent chain for a node contains no cycles.
    #[cfg(debug_assertions)]
    fn debug_assert_no_cycle(&self, start: NodeId) {
        debug_assert!(
            !self.parent_chain_has_cycle(start),
            "cycle detected from {start:?}"
        );
    }

    /// Return true if a node's parent chain contains a cycle.
    #[cfg(debug_assertions)]
    fn parent_chain_has_cycle(&self, start: NodeId) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(start);
        while let Some(id) = current {
            if !seen.insert(id) {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }
}
