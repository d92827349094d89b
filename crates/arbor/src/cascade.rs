//! Input-transparency cascade.
//!
//! A container that is input-transparent with cascading enabled forces
//! `InputTransparent = true` onto each direct child. Each child that
//! changes runs its own property-changed path, which cascades one level
//! further; no explicit recursion happens here.

use tracing::trace;

use crate::{NodeId, Tree, error::Result, property::keys};

/// Apply the cascade from `container` to its direct children.
///
/// Does nothing for leaves, for containers that are not transparent, and
/// for containers with cascading disabled. Turning transparency off never
/// reverts children.
pub(crate) fn cascade_input_transparent(tree: &mut Tree, container: NodeId) -> Result<()> {
    let Some(node) = tree.node(container) else {
        return Ok(());
    };
    if !node.is_container() || !node.input_transparent() || !node.cascade_input_transparent() {
        return Ok(());
    }
    let children = node.children().to_vec();
    trace!(?container, children = children.len(), "cascading input transparency");
    for child in children {
        tree.set_property(child, keys::INPUT_TRANSPARENT, true)?;
    }
    Ok(())
}
