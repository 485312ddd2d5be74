//! Bottom-up row metrics: width, margins, footprint and size.

use log::trace;

use crate::tree::{FamilyTree, NodeIndex, ROOT};

use super::Geometry;

pub(super) fn measure(tree: &mut FamilyTree, geometry: &Geometry) {
    for node in &mut tree.nodes {
        node.width = 0.0;
        node.footprint = 0.0;
        node.size = 0.0;
        node.margins = [0.0; 2];
    }

    for depth in (1..tree.levels.len()).rev() {
        for position in 0..tree.levels[depth].len() {
            let level = &tree.levels[depth];
            let index = level[position];
            let previous = position.checked_sub(1).map(|p| level[p]);
            let next = level.get(position + 1).copied();

            let margins = [
                half_gap(tree, geometry, index, previous),
                half_gap(tree, geometry, index, next),
            ];
            let ancestor = tree.nodes[index].ancestor;

            let node = &mut tree.nodes[index];
            node.width = node.elements.len() as f32 * geometry.box_width();
            node.margins = margins;
            node.size = node.width.max(node.footprint);
            let extent = node.size + margins[0] + margins[1];
            trace!(
                id = node.id().unwrap_or_default(),
                width = node.width,
                size = node.size;
                "Row measured"
            );

            tree.nodes[ancestor].footprint += extent;
        }
    }

    let root = &mut tree.nodes[ROOT];
    root.size = root.footprint.max(0.0);
}

/// Half of the gap towards a neighbour in the level: the same-family gap
/// when both rows hang beneath the same ancestor.
fn half_gap(
    tree: &FamilyTree,
    geometry: &Geometry,
    index: NodeIndex,
    neighbour: Option<NodeIndex>,
) -> f32 {
    let same_family = neighbour
        .is_some_and(|neighbour| tree.node(neighbour).ancestor() == tree.node(index).ancestor());
    if same_family {
        geometry.same_family_gap() / 2.0
    } else {
        geometry.different_family_gap() / 2.0
    }
}
