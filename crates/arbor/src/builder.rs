use std::rc::Rc;

use crate::{
    NodeId, Tree,
    error::{Error, Result},
    geom::Edges,
    layout::{Align, LayoutManagerFactory},
    mapper::{MapperKind, Mappers, defaults},
    property::{Key, keys},
    value::ToValue,
};

/// Configuration for a new [`Tree`].
pub struct TreeBuilder {
    /// Registry entry for leaf views.
    view_mappers: Mappers,
    /// Registry entry for containers.
    container_mappers: Mappers,
    /// Injected layout manager factory.
    layout_factory: Option<Rc<dyn LayoutManagerFactory>>,
    /// Run invariant checks after structural mutations.
    check_invariants: bool,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Default tables, no factory, invariant checks on in debug builds.
    pub fn new() -> Self {
        Self {
            view_mappers: defaults::view(),
            container_mappers: defaults::container(),
            layout_factory: None,
            check_invariants: cfg!(debug_assertions),
        }
    }

    /// Inject a layout manager factory.
    pub fn layout_factory(mut self, factory: impl LayoutManagerFactory + 'static) -> Self {
        self.layout_factory = Some(Rc::new(factory));
        self
    }

    /// Replace the default tables for a kind of view.
    pub fn mappers(mut self, kind: MapperKind, mappers: Mappers) -> Self {
        match kind {
            MapperKind::View => self.view_mappers = mappers,
            MapperKind::Container => self.container_mappers = mappers,
        }
        self
    }

    /// Edit the tables for a kind of view in place.
    pub fn with_mappers(mut self, kind: MapperKind, f: impl FnOnce(&mut Mappers)) -> Self {
        match kind {
            MapperKind::View => f(&mut self.view_mappers),
            MapperKind::Container => f(&mut self.container_mappers),
        }
        self
    }

    /// Toggle tree invariant checks. They only run in debug builds.
    pub fn check_invariants(mut self, enabled: bool) -> Self {
        self.check_invariants = enabled;
        self
    }

    /// Build the tree.
    pub fn build(self) -> Tree {
        Tree::from_parts(
            self.view_mappers,
            self.container_mappers,
            self.layout_factory,
            self.check_invariants,
        )
    }
}

/// Fluent helper for configuring a fresh node.
///
/// The first failing step is remembered and returned from
/// [`NodeBuilder::build`]; later steps are skipped.
pub struct NodeBuilder<'a> {
    /// Tree the node lives in.
    tree: &'a mut Tree,
    /// Node being configured.
    id: NodeId,
    /// First error encountered.
    error: Option<Error>,
}

impl<'a> NodeBuilder<'a> {
    /// Start configuring `id`.
    pub(crate) fn new(tree: &'a mut Tree, id: NodeId) -> Self {
        Self {
            tree,
            id,
            error: None,
        }
    }

    /// The node being configured.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Run a step unless an earlier one failed.
    fn step(mut self, f: impl FnOnce(&mut Tree, NodeId) -> Result<()>) -> Self {
        if self.error.is_none()
            && let Err(e) = f(&mut *self.tree, self.id)
        {
            self.error = Some(e);
        }
        self
    }

    /// Set an arbitrary property.
    pub fn set(self, key: impl Into<Key>, value: impl ToValue) -> Self {
        let key = key.into();
        self.step(|tree, id| tree.set_property(id, key, value).map(|_| ()))
    }

    /// Set the explicit width and height.
    pub fn size(self, width: f64, height: f64) -> Self {
        self.set(keys::WIDTH_REQUEST, width)
            .set(keys::HEIGHT_REQUEST, height)
    }

    /// Set the explicit width.
    pub fn width(self, width: f64) -> Self {
        self.set(keys::WIDTH_REQUEST, width)
    }

    /// Set the explicit height.
    pub fn height(self, height: f64) -> Self {
        self.set(keys::HEIGHT_REQUEST, height)
    }

    /// Set padding.
    pub fn padding(self, padding: Edges) -> Self {
        self.set(keys::PADDING, padding)
    }

    /// Set spacing between stacked children.
    pub fn spacing(self, spacing: f64) -> Self {
        self.set(keys::SPACING, spacing)
    }

    /// Set horizontal and vertical alignment.
    pub fn align(self, horizontal: Align, vertical: Align) -> Self {
        self.set(keys::HORIZONTAL_OPTIONS, horizontal)
            .set(keys::VERTICAL_OPTIONS, vertical)
    }

    /// Set visibility.
    pub fn visible(self, visible: bool) -> Self {
        self.set(keys::IS_VISIBLE, visible)
    }

    /// Set input transparency.
    pub fn input_transparent(self, transparent: bool) -> Self {
        self.set(keys::INPUT_TRANSPARENT, transparent)
    }

    /// Append a child.
    pub fn child(self, child: NodeId) -> Self {
        self.step(|tree, id| tree.children_mut(id)?.add(child))
    }

    /// Append several children in order.
    pub fn children(self, children: impl IntoIterator<Item = NodeId>) -> Self {
        children.into_iter().fold(self, Self::child)
    }

    /// Finish, returning the node or the first error.
    pub fn build(self) -> Result<NodeId> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geom::Size,
        layout::{LayoutKind, LayoutManager, StackLayoutManager},
        handler::ViewRef,
    };

    #[test]
    fn node_builder_sets_properties_and_children() -> Result<()> {
        let mut tree = Tree::new();
        let a = tree.build_view().size(3.0, 4.0).build()?;
        let b = tree.build_view().size(5.0, 1.0).build()?;
        let stack = tree
            .build_container(LayoutKind::VerticalStack)
            .spacing(1.0)
            .align(Align::Start, Align::Start)
            .children([a, b])
            .build()?;

        assert_eq!(tree.children(stack)?.as_slice(), &[a, b]);
        assert_eq!(tree.measure(stack, 100.0, 100.0)?, Size::new(5.0, 6.0));
        Ok(())
    }

    #[test]
    fn node_builder_reports_first_error() {
        let mut tree = Tree::new();
        let leaf = tree.create_view();
        let result = tree.build_view().width(-1.0).child(leaf).build();
        assert!(matches!(result, Err(Error::InvalidValue(_))));

        let result = tree.build_view().child(leaf).build();
        assert!(matches!(result, Err(Error::NotAContainer(_))));
    }

    /// Lays out `Custom("row")` containers as horizontal stacks.
    struct HorizontalFactory;

    impl LayoutManagerFactory for HorizontalFactory {
        fn create_layout_manager(&self, container: &ViewRef<'_>) -> Option<Box<dyn LayoutManager>> {
            matches!(container.kind().layout(), Some(LayoutKind::Custom("row")))
                .then(|| Box::new(StackLayoutManager::horizontal()) as Box<dyn LayoutManager>)
        }
    }

    #[test]
    fn tree_builder_injects_factory_and_tables() -> Result<()> {
        let mut tree = Tree::builder()
            .layout_factory(HorizontalFactory)
            .with_mappers(MapperKind::View, |m| {
                m.properties.unset(&keys::OPACITY);
            })
            .check_invariants(true)
            .build();
        assert!(!tree.mappers(MapperKind::View).properties.contains(&keys::OPACITY));

        let a = tree.build_view().size(2.0, 1.0).build()?;
        let b = tree.build_view().size(3.0, 1.0).build()?;
        let row = tree
            .build_container(LayoutKind::Custom("row"))
            .align(Align::Start, Align::Start)
            .children([a, b])
            .build()?;
        assert_eq!(tree.measure(row, 50.0, 50.0)?, Size::new(5.0, 1.0));

        let other = tree.build_container(LayoutKind::Custom("grid")).build()?;
        assert_eq!(tree.measure(other, 50.0, 50.0)?, Size::ZERO);
        Ok(())
    }
}
