//! Top-down placement.
//!
//! Each level is laid out left to right. The children of one ancestor form a
//! contiguous run whose block, margins included, is centred under the
//! ancestor's row. Within the block every child's row is centred in its own
//! `size`.

use log::{debug, warn};

use crate::tree::{FamilyTree, NodeIndex, ROOT};

use super::{Geometry, compaction};

/// Spaces smaller than this are treated as touching.
const OVERLAP_TOLERANCE: f32 = 1e-3;

pub(super) fn place(tree: &mut FamilyTree, geometry: &Geometry) {
    let origin = geometry.origin();
    let root = &mut tree.nodes[ROOT];
    root.left = origin.x();
    root.top = origin.y() - geometry.row_pitch();

    for depth in 1..tree.levels.len() {
        place_level(tree, geometry, depth);
        repair_overlaps(tree, depth);
    }
}

fn place_level(tree: &mut FamilyTree, geometry: &Geometry, depth: usize) {
    let mut offset = 0.0;
    let mut current_ancestor = None;

    for position in 0..tree.levels[depth].len() {
        let index = tree.levels[depth][position];
        let ancestor = tree.nodes[index].ancestor;
        if current_ancestor != Some(ancestor) {
            let owner = tree.node(ancestor);
            offset = tree.row_left(ancestor) + (owner.width() - owner.footprint()) / 2.0;
            current_ancestor = Some(ancestor);
        }

        let top = tree.nodes[ancestor].top + geometry.row_pitch();
        let node = &tree.nodes[index];
        let padding = (node.size - node.width) / 2.0;
        let [before, after] = node.margins;

        offset += before + padding;
        for element in node.elements.clone() {
            let element = &mut tree.nodes[element];
            element.left = offset;
            element.top = top;
            offset += geometry.box_width();
        }
        offset += after + padding;
    }
    debug!(depth = depth, rows = tree.levels[depth].len(); "Level placed");
}

/// Pushes rows right until no two neighbours overlap.
///
/// Rows of deeper levels are positioned relative to their ancestor later,
/// so only the row itself has to move.
fn repair_overlaps(tree: &mut FamilyTree, depth: usize) {
    for position in 1..tree.levels[depth].len() {
        let left = tree.levels[depth][position - 1];
        let right = tree.levels[depth][position];
        let space = compaction::space(tree, left, right);
        if space < -OVERLAP_TOLERANCE {
            warn!(
                left = tree.node(left).id().unwrap_or_default(),
                right = tree.node(right).id().unwrap_or_default(),
                overlap = -space;
                "Rows overlap after placement, shifting right"
            );
            shift_row(tree, right, -space);
        }
    }
}

pub(super) fn shift_row(tree: &mut FamilyTree, index: NodeIndex, delta: f32) {
    for element in tree.nodes[index].elements.clone() {
        tree.nodes[element].left += delta;
    }
}
