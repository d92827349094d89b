use std::mem;

use tracing::{debug, trace};

use super::{Constraint, LayoutContext, LayoutManager, default_manager};
use crate::{
    NodeId, Tree,
    error::{Error, Result},
    geom::{Rect, Size},
    node::ViewKind,
};

/// A cached measurement and the constraints that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MeasureEntry {
    /// Width constraint of the cached call.
    pub(crate) width: Constraint,
    /// Height constraint of the cached call.
    pub(crate) height: Constraint,
    /// Result of the cached call.
    pub(crate) size: Size,
}

impl MeasureEntry {
    /// True if the entry was produced by exactly these constraints.
    fn matches(&self, width: Constraint, height: Constraint) -> bool {
        self.width == width && self.height == height
    }
}

/// Single-slot cache for a container's layout manager.
#[derive(Default)]
pub(crate) enum ManagerSlot {
    /// Not yet resolved since the last context change.
    #[default]
    Unresolved,
    /// Resolution found no manager.
    Unavailable,
    /// A resolved manager.
    Ready(Box<dyn LayoutManager>),
    /// The manager is running; re-entry is a defect.
    InUse,
}

/// Measure a node, reusing the cached result when the constraints match exactly.
pub(crate) fn measure(
    tree: &mut Tree,
    id: NodeId,
    width: Constraint,
    height: Constraint,
) -> Result<Size> {
    let node = tree.node(id).ok_or(Error::NodeNotFound(id))?;
    if let Some(entry) = node.measure_cache
        && entry.matches(width, height)
    {
        trace!(?id, "measure cache hit");
        return Ok(entry.size);
    }

    let size = if !node.is_visible() {
        Size::ZERO
    } else {
        match node.kind() {
            ViewKind::View => measure_leaf(tree, id, width, height),
            ViewKind::Container(_) => measure_container(tree, id, width, height)?,
        }
    };

    let node = tree.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
    node.measure_cache = Some(MeasureEntry {
        width,
        height,
        size,
    });
    node.desired = size;
    trace!(?id, ?width, ?height, ?size, "measured");
    Ok(size)
}

/// Measure a leaf from explicit requests, falling back to the handler.
fn measure_leaf(tree: &mut Tree, id: NodeId, width: Constraint, height: Constraint) -> Size {
    let (w_req, h_req) = requests(tree, id);
    let intrinsic = if w_req.is_none() || h_req.is_none() {
        tree.with_handler_mut(id, |view, handler| {
            handler.desired_size(view, width, height)
        })
        .flatten()
        .unwrap_or(Size::ZERO)
    } else {
        Size::ZERO
    };
    resolve(
        Size::new(
            w_req.unwrap_or(intrinsic.width),
            h_req.unwrap_or(intrinsic.height),
        ),
        width,
        height,
    )
}

/// Measure a container through its layout manager.
fn measure_container(
    tree: &mut Tree,
    id: NodeId,
    width: Constraint,
    height: Constraint,
) -> Result<Size> {
    let measured = match with_manager(tree, id, |manager, ctx| {
        manager.measure(ctx, width, height)
    })? {
        Some(size) => size,
        None => {
            let padding = tree.node(id).map(|n| n.padding()).unwrap_or_default();
            Size::new(padding.horizontal(), padding.vertical())
        }
    };
    let (w_req, h_req) = requests(tree, id);
    Ok(resolve(
        Size::new(
            w_req.unwrap_or(measured.width),
            h_req.unwrap_or(measured.height),
        ),
        width,
        height,
    ))
}

/// Explicit width and height requests for a node.
fn requests(tree: &Tree, id: NodeId) -> (Option<f64>, Option<f64>) {
    tree.node(id)
        .map(|n| (n.width_request(), n.height_request()))
        .unwrap_or_default()
}

/// Clamp a size to bounded constraints.
fn resolve(size: Size, width: Constraint, height: Constraint) -> Size {
    Size::new(width.clamp(size.width), height.clamp(size.height))
}

/// Arrange a node into `bounds`, measuring first if its cache is stale.
pub(crate) fn arrange(tree: &mut Tree, id: NodeId, bounds: Rect) -> Result<Size> {
    if !bounds.is_valid() {
        return Err(Error::InvalidBounds(format!("{bounds:?}")));
    }
    let node = tree.node(id).ok_or(Error::NodeNotFound(id))?;
    let visible = node.is_visible();
    let kind = node.kind();
    if node.measure_cache.is_none() {
        measure(
            tree,
            id,
            Constraint::Bounded(bounds.w),
            Constraint::Bounded(bounds.h),
        )?;
    }

    if !visible {
        if let Some(node) = tree.nodes.get_mut(id) {
            node.frame = Some(Size::ZERO.at(bounds.tl));
        }
        return Ok(Size::ZERO);
    }

    if let Some(node) = tree.nodes.get_mut(id) {
        node.frame = Some(bounds);
    }
    let consumed = match kind {
        ViewKind::View => bounds.size(),
        ViewKind::Container(_) => with_manager(tree, id, |manager, ctx| {
            manager.arrange_children(ctx, bounds)
        })?
        .unwrap_or_else(|| bounds.size()),
    };
    tree.with_handler_mut(id, |view, handler| handler.platform_arrange(view, bounds));
    trace!(?id, ?bounds, ?consumed, "arranged");
    Ok(consumed)
}

/// Resolve a container's manager if the slot has not been filled yet.
fn resolve_manager(tree: &mut Tree, id: NodeId) -> Result<()> {
    let node = tree.node(id).ok_or(Error::NodeNotFound(id))?;
    if !matches!(node.manager, ManagerSlot::Unresolved) {
        return Ok(());
    }
    let ViewKind::Container(kind) = node.kind() else {
        return Ok(());
    };

    let factory = tree.layout_factory.clone();
    let from_factory = match (factory, tree.view(id)) {
        (Some(factory), Some(view)) => factory.create_layout_manager(&view),
        _ => None,
    };
    let source = if from_factory.is_some() {
        "factory"
    } else {
        "default"
    };
    let slot = match from_factory.or_else(|| default_manager(kind)) {
        Some(manager) => ManagerSlot::Ready(manager),
        None => ManagerSlot::Unavailable,
    };
    debug!(
        ?id,
        ?kind,
        source,
        available = matches!(slot, ManagerSlot::Ready(_)),
        "resolved layout manager"
    );
    if let Some(node) = tree.nodes.get_mut(id) {
        node.manager = slot;
    }
    Ok(())
}

/// Run `f` against a container's manager, returning `None` when it has none.
fn with_manager<R>(
    tree: &mut Tree,
    id: NodeId,
    f: impl FnOnce(&mut dyn LayoutManager, &mut LayoutContext<'_>) -> Result<R>,
) -> Result<Option<R>> {
    resolve_manager(tree, id)?;
    let node = tree.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))?;
    let mut manager = match mem::replace(&mut node.manager, ManagerSlot::InUse) {
        ManagerSlot::Ready(manager) => manager,
        ManagerSlot::InUse => return Err(Error::ReentrantLayout(id)),
        other => {
            node.manager = other;
            return Ok(None);
        }
    };

    let result = {
        let mut ctx = LayoutContext::new(tree, id);
        f(manager.as_mut(), &mut ctx)
    };

    if let Some(node) = tree.nodes.get_mut(id)
        && matches!(node.manager, ManagerSlot::InUse)
    {
        node.manager = ManagerSlot::Ready(manager);
    }
    result.map(Some)
}
