use std::rc::Rc;

use indexmap::IndexMap;

use crate::{
    NodeId,
    geom::{Axis, Edges, Rect, Size},
    handler::Handler,
    layout::{
        Align, LayoutKind,
        engine::{ManagerSlot, MeasureEntry},
    },
    mapper::Mappers,
    property::{Key, keys},
    value::{FromValue, Value},
};

/// What a node is: a leaf view or a container with child layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// A leaf view.
    View,
    /// A view that owns an ordered child collection.
    Container(LayoutKind),
}

impl ViewKind {
    /// True for containers.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Container(_))
    }

    /// The container's layout kind.
    pub fn layout(self) -> Option<LayoutKind> {
        match self {
            Self::View => None,
            Self::Container(kind) => Some(kind),
        }
    }
}

/// Core node data stored in the arena.
pub struct Node {
    /// Leaf or container.
    pub(crate) kind: ViewKind,
    /// Property values in the order they were first set.
    pub(crate) properties: IndexMap<Key, Value>,

    /// Parent in the arena tree.
    pub(crate) parent: Option<NodeId>,
    /// Children in the arena tree.
    pub(crate) children: Vec<NodeId>,

    /// Attached platform handler.
    pub(crate) handler: Option<Box<dyn Handler>>,
    /// Per-node mapper override; the registry entry for the kind is used otherwise.
    pub(crate) mappers: Option<Rc<Mappers>>,

    /// Last measure call and its result.
    pub(crate) measure_cache: Option<MeasureEntry>,
    /// Size reported by the most recent measure.
    pub(crate) desired: Size,
    /// Frame assigned by the most recent arrange.
    pub(crate) frame: Option<Rect>,
    /// Cached layout manager.
    pub(crate) manager: ManagerSlot,
}

impl Node {
    /// Construct a detached node.
    pub(crate) fn new(kind: ViewKind) -> Self {
        Self {
            kind,
            properties: IndexMap::new(),
            parent: None,
            children: Vec::new(),
            handler: None,
            mappers: None,
            measure_cache: None,
            desired: Size::ZERO,
            frame: None,
            manager: ManagerSlot::default(),
        }
    }

    /// Return the node's kind.
    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    /// Return true if the node can hold children.
    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Return the node's parent, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Return the node's children.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Return a raw property value.
    pub fn property(&self, key: &Key) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Iterate over set properties in insertion order.
    pub fn properties(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.properties.iter()
    }

    /// Decode a property, falling back to `default` when unset or mistyped.
    fn typed<T: FromValue>(&self, key: &Key, default: T) -> T {
        self.properties
            .get(key)
            .and_then(|v| T::from_value(v).ok())
            .unwrap_or(default)
    }

    /// Return true if the node takes part in layout.
    pub fn is_visible(&self) -> bool {
        self.typed(&keys::IS_VISIBLE, true)
    }

    /// Return true if the node ignores input.
    pub fn input_transparent(&self) -> bool {
        self.typed(&keys::INPUT_TRANSPARENT, false)
    }

    /// Return true if transparency on this container is forced onto its children.
    pub fn cascade_input_transparent(&self) -> bool {
        self.typed(&keys::CASCADE_INPUT_TRANSPARENT, true)
    }

    /// Return the clipping hint.
    pub fn clips_to_bounds(&self) -> bool {
        self.typed(&keys::CLIPS_TO_BOUNDS, false)
    }

    /// Return true if the container extends under the platform's safe-area insets.
    pub fn ignore_safe_area(&self) -> bool {
        self.typed(&keys::IGNORE_SAFE_AREA, false)
    }

    /// Return the container padding.
    pub fn padding(&self) -> Edges {
        self.typed(&keys::PADDING, Edges::zero())
    }

    /// Return the gap between stacked children.
    pub fn spacing(&self) -> f64 {
        self.typed(&keys::SPACING, 0.0)
    }

    /// Return the explicit width, if any.
    pub fn width_request(&self) -> Option<f64> {
        self.typed(&keys::WIDTH_REQUEST, None)
    }

    /// Return the explicit height, if any.
    pub fn height_request(&self) -> Option<f64> {
        self.typed(&keys::HEIGHT_REQUEST, None)
    }

    /// Return the horizontal alignment.
    pub fn horizontal_options(&self) -> Align {
        self.typed(&keys::HORIZONTAL_OPTIONS, Align::Fill)
    }

    /// Return the vertical alignment.
    pub fn vertical_options(&self) -> Align {
        self.typed(&keys::VERTICAL_OPTIONS, Align::Fill)
    }

    /// Return the alignment along an axis.
    pub fn alignment(&self, axis: Axis) -> Align {
        match axis {
            Axis::Horizontal => self.horizontal_options(),
            Axis::Vertical => self.vertical_options(),
        }
    }

    /// Return true if a cached measurement is available.
    pub fn is_measure_valid(&self) -> bool {
        self.measure_cache.is_some()
    }

    /// Return true if a handler is attached.
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Return the size reported by the last measure.
    pub fn desired_size(&self) -> Option<Size> {
        self.measure_cache.map(|_| self.desired)
    }

    /// Return the frame from the last arrange.
    pub fn frame(&self) -> Option<Rect> {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let node = Node::new(ViewKind::Container(LayoutKind::Overlay));
        assert!(node.is_container());
        assert!(node.is_visible());
        assert!(!node.input_transparent());
        assert!(node.cascade_input_transparent());
        assert_eq!(node.padding(), Edges::zero());
        assert!(!node.ignore_safe_area());
        assert_eq!(node.width_request(), None);
        assert_eq!(node.alignment(Axis::Vertical), Align::Fill);
        assert!(!node.is_measure_valid());
        assert_eq!(node.desired_size(), None);
    }

    #[test]
    fn typed_accessors() {
        let mut node = Node::new(ViewKind::View);
        node.properties.insert(keys::PADDING, Value::Number(3.0));
        node.properties.insert(keys::WIDTH_REQUEST, Value::Number(12.0));
        node.properties
            .insert(keys::HORIZONTAL_OPTIONS, Value::Align(Align::End));
        assert_eq!(node.padding(), Edges::all(3.0));
        assert_eq!(node.width_request(), Some(12.0));
        assert_eq!(node.alignment(Axis::Horizontal), Align::End);
        assert_eq!(node.kind().layout(), None);

        node.properties.insert(keys::IGNORE_SAFE_AREA, Value::Bool(true));
        assert!(node.ignore_safe_area());
    }
}
