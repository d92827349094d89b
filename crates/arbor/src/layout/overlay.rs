use super::{Align, Constraint, LayoutContext, LayoutManager};
use crate::{
    error::Result,
    geom::{Axis, Rect, Size},
};

/// Stacks every child in the same content box, aligned per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayLayoutManager;

/// Position and extent of a child along one axis of the content box.
fn place(align: Align, desired: f64, start: f64, available: f64) -> (f64, f64) {
    if align == Align::Fill {
        (start, available)
    } else {
        let extent = desired.min(available);
        (start + align.offset(extent, available), extent)
    }
}

impl LayoutManager for OverlayLayoutManager {
    fn measure(
        &mut self,
        ctx: &mut LayoutContext<'_>,
        width: Constraint,
        height: Constraint,
    ) -> Result<Size> {
        let padding = ctx.padding();
        let content_w = width.deflate(padding.horizontal());
        let content_h = height.deflate(padding.vertical());

        let mut size = Size::ZERO;
        for child in ctx.children() {
            let child_size = ctx.measure_child(child, content_w, content_h)?;
            size.width = size.width.max(child_size.width);
            size.height = size.height.max(child_size.height);
        }
        Ok(Size::new(
            size.width + padding.horizontal(),
            size.height + padding.vertical(),
        ))
    }

    fn arrange_children(&mut self, ctx: &mut LayoutContext<'_>, bounds: Rect) -> Result<Size> {
        let padding = ctx.padding();
        let content = bounds.inset(padding);

        let mut used = Size::ZERO;
        for child in ctx.children() {
            let desired = ctx.desired_size(child);
            let (x, w) = place(
                ctx.alignment(child, Axis::Horizontal),
                desired.width,
                content.tl.x,
                content.w,
            );
            let (y, h) = place(
                ctx.alignment(child, Axis::Vertical),
                desired.height,
                content.tl.y,
                content.h,
            );
            ctx.arrange_child(child, Rect::new(x, y, w, h))?;
            used.width = used.width.max(w);
            used.height = used.height.max(h);
        }

        let mut consumed = Size::new(
            used.width + padding.horizontal(),
            used.height + padding.vertical(),
        );
        for axis in [Axis::Horizontal, Axis::Vertical] {
            if ctx.fills(axis) {
                consumed.set_along(axis, consumed.along(axis).max(bounds.extent(axis)));
            }
        }
        Ok(consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Tree, geom::Edges, layout::LayoutKind, property::keys};

    #[test]
    fn size_is_largest_child_plus_padding() -> Result<()> {
        let mut tree = Tree::new();
        let overlay = tree.create_container(LayoutKind::Overlay);
        tree.set_property(overlay, keys::PADDING, Edges::all(1.0))?;
        let a = tree.create_view();
        tree.set_property(a, keys::WIDTH_REQUEST, 10.0)?;
        tree.set_property(a, keys::HEIGHT_REQUEST, 2.0)?;
        let b = tree.create_view();
        tree.set_property(b, keys::WIDTH_REQUEST, 4.0)?;
        tree.set_property(b, keys::HEIGHT_REQUEST, 6.0)?;
        tree.children_mut(overlay)?.add(a)?;
        tree.children_mut(overlay)?.add(b)?;

        let size = tree.measure(overlay, f64::INFINITY, f64::INFINITY)?;
        assert_eq!(size, Size::new(12.0, 8.0));
        Ok(())
    }

    #[test]
    fn children_share_the_content_box() -> Result<()> {
        let mut tree = Tree::new();
        let overlay = tree.create_container(LayoutKind::Overlay);
        let fill = tree.create_view();
        let centered = tree.create_view();
        tree.set_property(centered, keys::WIDTH_REQUEST, 4.0)?;
        tree.set_property(centered, keys::HEIGHT_REQUEST, 2.0)?;
        tree.set_property(centered, keys::HORIZONTAL_OPTIONS, Align::Center)?;
        tree.set_property(centered, keys::VERTICAL_OPTIONS, Align::End)?;
        tree.children_mut(overlay)?.add(fill)?;
        tree.children_mut(overlay)?.add(centered)?;

        let consumed = tree.arrange(overlay, Rect::new(0.0, 0.0, 10.0, 10.0))?;
        assert_eq!(consumed, Size::new(10.0, 10.0));
        assert_eq!(tree.frame(fill), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert_eq!(tree.frame(centered), Some(Rect::new(3.0, 8.0, 4.0, 2.0)));
        Ok(())
    }
}
