use super::{Align, Constraint, LayoutContext, LayoutManager};
use crate::{
    error::Result,
    geom::{Axis, Rect, Size},
};

/// Places children one after another along an axis.
///
/// Children are measured with the stacking axis unconstrained and the
/// container's content constraint on the cross axis. The stack's main
/// extent is the sum of its children plus spacing; its cross extent is the
/// bounded cross constraint when the container fills that axis, and the
/// largest child otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackLayoutManager {
    /// Stacking axis.
    axis: Axis,
}

impl StackLayoutManager {
    /// A stack along an arbitrary axis.
    pub fn new(axis: Axis) -> Self {
        Self { axis }
    }

    /// A left-to-right stack.
    pub fn horizontal() -> Self {
        Self::new(Axis::Horizontal)
    }

    /// A top-to-bottom stack.
    pub fn vertical() -> Self {
        Self::new(Axis::Vertical)
    }

    /// The stacking axis.
    pub fn axis(&self) -> Axis {
        self.axis
    }
}

/// Total spacing between `count` children.
fn total_spacing(spacing: f64, count: usize) -> f64 {
    spacing * count.saturating_sub(1) as f64
}

impl LayoutManager for StackLayoutManager {
    fn measure(
        &mut self,
        ctx: &mut LayoutContext<'_>,
        width: Constraint,
        height: Constraint,
    ) -> Result<Size> {
        let axis = self.axis;
        let padding = ctx.padding();
        let content_w = width.deflate(padding.horizontal());
        let content_h = height.deflate(padding.vertical());
        let cross_constraint = match axis {
            Axis::Horizontal => content_h,
            Axis::Vertical => content_w,
        };
        let (child_w, child_h) = match axis {
            Axis::Horizontal => (Constraint::Unconstrained, cross_constraint),
            Axis::Vertical => (cross_constraint, Constraint::Unconstrained),
        };

        let children = ctx.children();
        let mut main = total_spacing(ctx.spacing(), children.len());
        let mut cross = 0.0f64;
        for child in &children {
            let size = ctx.measure_child(*child, child_w, child_h)?;
            main += size.main(axis);
            cross = cross.max(size.cross(axis));
        }

        if ctx.fills(axis.cross())
            && let Constraint::Bounded(bound) = cross_constraint
        {
            cross = bound;
        }

        Ok(Size::from_main_cross(
            axis,
            main + padding.along(axis),
            cross + padding.along(axis.cross()),
        ))
    }

    fn arrange_children(&mut self, ctx: &mut LayoutContext<'_>, bounds: Rect) -> Result<Size> {
        let axis = self.axis;
        let cross_axis = axis.cross();
        let padding = ctx.padding();
        let spacing = ctx.spacing();
        let content = bounds.inset(padding);
        let available_cross = content.extent(cross_axis);

        let children = ctx.children();
        let mut pos = content.start(axis);
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                pos += spacing;
            }
            let desired = ctx.desired_size(*child);
            let main = desired.main(axis);
            let align = ctx.alignment(*child, cross_axis);
            let cross = if align == Align::Fill {
                available_cross
            } else {
                desired.cross(axis).min(available_cross)
            };
            let cross_start = content.start(cross_axis) + align.offset(cross, available_cross);
            ctx.arrange_child(
                *child,
                Rect::from_main_cross(axis, (pos, main), (cross_start, cross)),
            )?;
            pos += main;
        }

        let used = pos - content.start(axis) + padding.along(axis);
        let consumed_main = if ctx.fills(axis) {
            used.max(bounds.extent(axis))
        } else {
            used
        };
        Ok(Size::from_main_cross(
            axis,
            consumed_main,
            bounds.extent(cross_axis),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Tree,
        error::Result,
        geom::Edges,
        layout::LayoutKind,
        property::keys,
    };

    fn leaf(tree: &mut Tree, w: f64, h: f64) -> Result<crate::NodeId> {
        let id = tree.create_view();
        tree.set_property(id, keys::WIDTH_REQUEST, w)?;
        tree.set_property(id, keys::HEIGHT_REQUEST, h)?;
        Ok(id)
    }

    #[test]
    fn vertical_sum_main_max_cross() -> Result<()> {
        let mut tree = Tree::new();
        let stack = tree.create_container(LayoutKind::VerticalStack);
        tree.set_property(stack, keys::HORIZONTAL_OPTIONS, Align::Start)?;
        let a = leaf(&mut tree, 5.0, 3.0)?;
        let b = leaf(&mut tree, 8.0, 4.0)?;
        tree.children_mut(stack)?.add(a)?;
        tree.children_mut(stack)?.add(b)?;

        let size = tree.measure(stack, 100.0, f64::INFINITY)?;
        assert_eq!(size, Size::new(8.0, 7.0));
        Ok(())
    }

    #[test]
    fn spacing_counts_only_visible_children() -> Result<()> {
        let mut tree = Tree::new();
        let stack = tree.create_container(LayoutKind::HorizontalStack);
        tree.set_property(stack, keys::SPACING, 2.0)?;
        tree.set_property(stack, keys::VERTICAL_OPTIONS, Align::Start)?;
        let a = leaf(&mut tree, 5.0, 1.0)?;
        let b = leaf(&mut tree, 5.0, 1.0)?;
        let hidden = leaf(&mut tree, 5.0, 1.0)?;
        tree.set_property(hidden, keys::IS_VISIBLE, false)?;
        for child in [a, hidden, b] {
            tree.children_mut(stack)?.add(child)?;
        }

        let size = tree.measure(stack, f64::INFINITY, f64::INFINITY)?;
        assert_eq!(size, Size::new(12.0, 1.0));

        tree.arrange(stack, Rect::new(0.0, 0.0, 12.0, 1.0))?;
        assert_eq!(tree.frame(b), Some(Rect::new(7.0, 0.0, 5.0, 1.0)));
        Ok(())
    }

    #[test]
    fn padding_deflates_and_offsets() -> Result<()> {
        let mut tree = Tree::new();
        let stack = tree.create_container(LayoutKind::VerticalStack);
        tree.set_property(stack, keys::PADDING, Edges::new(1.0, 2.0, 3.0, 4.0))?;
        tree.set_property(stack, keys::HORIZONTAL_OPTIONS, Align::Start)?;
        let a = leaf(&mut tree, 10.0, 10.0)?;
        tree.set_property(a, keys::HORIZONTAL_OPTIONS, Align::Start)?;
        tree.children_mut(stack)?.add(a)?;

        assert_eq!(tree.measure(stack, 50.0, 50.0)?, Size::new(14.0, 16.0));
        let consumed = tree.arrange(stack, Rect::new(0.0, 0.0, 50.0, 50.0))?;
        assert_eq!(tree.frame(a), Some(Rect::new(1.0, 2.0, 10.0, 10.0)));
        assert_eq!(consumed, Size::new(50.0, 50.0));
        Ok(())
    }

    #[test]
    fn cross_alignment() -> Result<()> {
        let mut tree = Tree::new();
        let stack = tree.create_container(LayoutKind::VerticalStack);
        let start = leaf(&mut tree, 4.0, 1.0)?;
        let center = leaf(&mut tree, 4.0, 1.0)?;
        let end = leaf(&mut tree, 4.0, 1.0)?;
        tree.set_property(start, keys::HORIZONTAL_OPTIONS, Align::Start)?;
        tree.set_property(center, keys::HORIZONTAL_OPTIONS, Align::Center)?;
        tree.set_property(end, keys::HORIZONTAL_OPTIONS, Align::End)?;
        for child in [start, center, end] {
            tree.children_mut(stack)?.add(child)?;
        }

        tree.arrange(stack, Rect::new(0.0, 0.0, 10.0, 10.0))?;
        assert_eq!(tree.frame(start), Some(Rect::new(0.0, 0.0, 4.0, 1.0)));
        assert_eq!(tree.frame(center), Some(Rect::new(3.0, 1.0, 4.0, 1.0)));
        assert_eq!(tree.frame(end), Some(Rect::new(6.0, 2.0, 4.0, 1.0)));
        Ok(())
    }

    #[test]
    fn non_filling_stack_reports_used_extent() -> Result<()> {
        let mut tree = Tree::new();
        let stack = tree.create_container(LayoutKind::HorizontalStack);
        tree.set_property(stack, keys::HORIZONTAL_OPTIONS, Align::Start)?;
        let a = leaf(&mut tree, 6.0, 2.0)?;
        tree.children_mut(stack)?.add(a)?;

        let consumed = tree.arrange(stack, Rect::new(0.0, 0.0, 20.0, 5.0))?;
        assert_eq!(consumed, Size::new(6.0, 5.0));
        Ok(())
    }
}
