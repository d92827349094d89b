//! The two-pass measure/arrange protocol and the built-in layout managers.
//!
//! A container resolves its [`LayoutManager`] lazily: the tree's injected
//! [`LayoutManagerFactory`] is consulted first, then the default manager for
//! the container's [`LayoutKind`]. The result is cached on the node until
//! the factory changes or the slot is explicitly invalidated.

/// Measure/arrange driver and per-node layout state.
pub(crate) mod engine;
/// Overlay manager: all children share one cell.
mod overlay;
/// Horizontal and vertical stack manager.
mod stack;

pub use overlay::OverlayLayoutManager;
pub use stack::StackLayoutManager;

use crate::{
    NodeId, Tree, ViewRef,
    error::{Error, Result},
    geom::{Axis, Edges, Rect, Size},
};

/// A per-axis measure constraint.
#[derive(Debug, Clone, Copy)]
pub enum Constraint {
    /// A finite, non-negative upper bound.
    Bounded(f64),
    /// No upper bound.
    Unconstrained,
}

impl Constraint {
    /// Validate a raw constraint value. Positive infinity means unconstrained.
    pub fn new(axis: Axis, value: f64) -> Result<Self> {
        if value == f64::INFINITY {
            Ok(Self::Unconstrained)
        } else if value.is_finite() && value >= 0.0 {
            Ok(Self::Bounded(value))
        } else {
            Err(Error::InvalidConstraint { axis, value })
        }
    }

    /// True if the constraint has a finite bound.
    pub fn is_bounded(self) -> bool {
        matches!(self, Self::Bounded(_))
    }

    /// The bound, or infinity when unconstrained.
    pub fn max(self) -> f64 {
        match self {
            Self::Bounded(v) => v,
            Self::Unconstrained => f64::INFINITY,
        }
    }

    /// Reduce the bound by an inset, never going below zero.
    pub fn deflate(self, inset: f64) -> Self {
        match self {
            Self::Bounded(v) => Self::Bounded((v - inset).max(0.0)),
            Self::Unconstrained => Self::Unconstrained,
        }
    }

    /// Clamp a length to the bound.
    pub fn clamp(self, length: f64) -> f64 {
        match self {
            Self::Bounded(v) => length.min(v),
            Self::Unconstrained => length,
        }
    }
}

/// Constraints compare bit-for-bit so that cache reuse is exact.
impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bounded(a), Self::Bounded(b)) => a.to_bits() == b.to_bits(),
            (Self::Unconstrained, Self::Unconstrained) => true,
            _ => false,
        }
    }
}

impl Eq for Constraint {}

/// Alignment of a child within the slot its parent assigns along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Align {
    /// Align to the leading edge.
    Start,
    /// Center within the slot.
    Center,
    /// Align to the trailing edge.
    End,
    /// Stretch to the full slot.
    #[default]
    Fill,
}

impl Align {
    /// Offset of a child of extent `child` within `available` space.
    pub fn offset(self, child: f64, available: f64) -> f64 {
        let slack = (available - child).max(0.0);
        match self {
            Self::Start | Self::Fill => 0.0,
            Self::Center => slack / 2.0,
            Self::End => slack,
        }
    }
}

/// Layout semantics declared by a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// Children placed left to right.
    HorizontalStack,
    /// Children placed top to bottom.
    VerticalStack,
    /// Children share the full content box.
    Overlay,
    /// Semantics supplied only by an injected factory.
    Custom(&'static str),
}

/// The measure/arrange algorithm for one kind of container.
pub trait LayoutManager {
    /// Compute the container's desired size, measuring children through `ctx`.
    fn measure(
        &mut self,
        ctx: &mut LayoutContext<'_>,
        width: Constraint,
        height: Constraint,
    ) -> Result<Size>;

    /// Position children inside `bounds` and return the size consumed.
    fn arrange_children(&mut self, ctx: &mut LayoutContext<'_>, bounds: Rect) -> Result<Size>;
}

/// Injected source of layout managers.
pub trait LayoutManagerFactory {
    /// Create a manager for `container`, or `None` to fall back to the default.
    fn create_layout_manager(&self, container: &ViewRef<'_>) -> Option<Box<dyn LayoutManager>>;
}

/// The built-in manager for a layout kind, if there is one.
pub fn default_manager(kind: LayoutKind) -> Option<Box<dyn LayoutManager>> {
    match kind {
        LayoutKind::HorizontalStack => Some(Box::new(StackLayoutManager::horizontal())),
        LayoutKind::VerticalStack => Some(Box::new(StackLayoutManager::vertical())),
        LayoutKind::Overlay => Some(Box::new(OverlayLayoutManager)),
        LayoutKind::Custom(_) => None,
    }
}

/// The view of the tree a layout manager works through.
pub struct LayoutContext<'a> {
    /// Tree being laid out.
    tree: &'a mut Tree,
    /// Container whose manager is running.
    container: NodeId,
}

impl<'a> LayoutContext<'a> {
    /// Construct a context for a container.
    pub(crate) fn new(tree: &'a mut Tree, container: NodeId) -> Self {
        Self { tree, container }
    }

    /// The container being laid out.
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Read-only access to the container.
    pub fn view(&self) -> Option<ViewRef<'_>> {
        self.tree.view(self.container)
    }

    /// Visible children in order.
    pub fn children(&self) -> Vec<NodeId> {
        let Some(node) = self.tree.node(self.container) else {
            return Vec::new();
        };
        node.children()
            .iter()
            .copied()
            .filter(|child| self.tree.node(*child).is_some_and(|n| n.is_visible()))
            .collect()
    }

    /// The container's padding.
    pub fn padding(&self) -> Edges {
        self.tree
            .node(self.container)
            .map(|n| n.padding())
            .unwrap_or_default()
    }

    /// The container's spacing between children.
    pub fn spacing(&self) -> f64 {
        self.tree
            .node(self.container)
            .map(|n| n.spacing())
            .unwrap_or_default()
    }

    /// True if the container itself fills its slot along an axis.
    pub fn fills(&self, axis: Axis) -> bool {
        self.alignment(self.container, axis) == Align::Fill
    }

    /// A node's alignment along an axis.
    pub fn alignment(&self, node: NodeId, axis: Axis) -> Align {
        self.tree
            .node(node)
            .map(|n| n.alignment(axis))
            .unwrap_or_default()
    }

    /// The size a child reported from its most recent measure.
    pub fn desired_size(&self, child: NodeId) -> Size {
        self.tree.desired_size(child).unwrap_or(Size::ZERO)
    }

    /// Measure a child.
    pub fn measure_child(
        &mut self,
        child: NodeId,
        width: Constraint,
        height: Constraint,
    ) -> Result<Size> {
        engine::measure(self.tree, child, width, height)
    }

    /// Arrange a child into a frame.
    pub fn arrange_child(&mut self, child: NodeId, frame: Rect) -> Result<Size> {
        engine::arrange(self.tree, child, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_validation() -> Result<()> {
        assert_eq!(
            Constraint::new(Axis::Horizontal, f64::INFINITY)?,
            Constraint::Unconstrained
        );
        assert_eq!(
            Constraint::new(Axis::Vertical, 0.0)?,
            Constraint::Bounded(0.0)
        );
        assert!(matches!(
            Constraint::new(Axis::Vertical, -1.0),
            Err(Error::InvalidConstraint {
                axis: Axis::Vertical,
                ..
            })
        ));
        assert!(Constraint::new(Axis::Horizontal, f64::NAN).is_err());
        assert!(Constraint::new(Axis::Horizontal, f64::NEG_INFINITY).is_err());
        Ok(())
    }

    #[test]
    fn constraint_equality_is_bitwise() {
        assert_eq!(Constraint::Bounded(1.0), Constraint::Bounded(1.0));
        assert_ne!(Constraint::Bounded(0.0), Constraint::Bounded(-0.0));
        assert_ne!(Constraint::Bounded(1.0), Constraint::Unconstrained);
    }

    #[test]
    fn deflate_and_clamp() {
        assert_eq!(Constraint::Bounded(10.0).deflate(4.0), Constraint::Bounded(6.0));
        assert_eq!(Constraint::Bounded(3.0).deflate(4.0), Constraint::Bounded(0.0));
        assert_eq!(Constraint::Unconstrained.deflate(4.0), Constraint::Unconstrained);
        assert_eq!(Constraint::Bounded(5.0).clamp(7.0), 5.0);
        assert_eq!(Constraint::Unconstrained.clamp(7.0), 7.0);
    }

    #[test]
    fn align_offsets() {
        assert_eq!(Align::Start.offset(2.0, 10.0), 0.0);
        assert_eq!(Align::Center.offset(2.0, 10.0), 4.0);
        assert_eq!(Align::End.offset(2.0, 10.0), 8.0);
        assert_eq!(Align::End.offset(12.0, 10.0), 0.0);
    }
}
