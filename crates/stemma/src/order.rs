//! Family rows, generations and sibling order.
//!
//! Once the parent links are known this module
//!
//! 1. sorts every node's spouses by `(sex, id)`, male first;
//! 2. builds the family row (`elements`) of each lineage node: a male leads
//!    his row followed by his spouses, anyone else closes the row after
//!    them;
//! 3. groups lineage nodes into levels and sorts each level by
//!    `(ancestor index, group index, id)`, where the group index is the
//!    position of the node's parent within the ancestor's row. Ids are
//!    unique, so the order is total;
//! 4. fills `children` in level order.

use std::cmp::Ordering;

use crate::tree::{FamilyTree, NodeIndex, ROOT};

pub(crate) fn resolve(tree: &mut FamilyTree) {
    sort_spouses(tree);
    assign_elements(tree);
    build_levels(tree);
}

fn spouse_order(tree: &FamilyTree, a: NodeIndex, b: NodeIndex) -> Ordering {
    let (a, b) = (tree.node(a), tree.node(b));
    (a.sex(), a.id()).cmp(&(b.sex(), b.id()))
}

fn sort_spouses(tree: &mut FamilyTree) {
    for index in 0..tree.nodes.len() {
        let mut spouses = std::mem::take(&mut tree.nodes[index].spouses);
        let view: &FamilyTree = tree;
        spouses.sort_by(|&a, &b| spouse_order(view, a, b));
        tree.nodes[index].spouses = spouses;
    }
}

/// Everyone drawn next to a lineage node: its spouses and, transitively,
/// spouses attached to those spouses.
fn family_of(tree: &FamilyTree, index: NodeIndex) -> Vec<NodeIndex> {
    let mut family = Vec::new();
    let mut pending = tree.node(index).spouses.clone();
    while let Some(spouse) = pending.pop() {
        family.push(spouse);
        pending.extend_from_slice(&tree.node(spouse).spouses);
    }
    family.sort_by(|&a, &b| spouse_order(tree, a, b));
    family
}

fn assign_elements(tree: &mut FamilyTree) {
    for index in 1..tree.nodes.len() {
        let node = tree.node(index);
        if !(node.attached && node.lineage) {
            continue;
        }

        let family = family_of(tree, index);
        let elements = if tree.node(index).sex().is_male() {
            std::iter::once(index).chain(family).collect()
        } else {
            family.into_iter().chain(std::iter::once(index)).collect()
        };
        tree.nodes[index].elements = elements;
    }
}

/// Sort key of a lineage node within its level.
fn sibling_key(tree: &FamilyTree, index: NodeIndex) -> (usize, usize, &str) {
    let node = tree.node(index);
    let ancestor = tree.node(node.ancestor);
    let group = ancestor
        .elements
        .iter()
        .position(|&element| element == node.parent)
        .unwrap_or(0);
    (ancestor.index, group, node.id().unwrap_or_default())
}

fn build_levels(tree: &mut FamilyTree) {
    let mut levels: Vec<Vec<NodeIndex>> = vec![vec![ROOT]];
    for index in 1..tree.nodes.len() {
        let node = tree.node(index);
        if !(node.attached && node.lineage) {
            continue;
        }
        if levels.len() <= node.level {
            levels.resize_with(node.level + 1, Vec::new);
        }
        levels[node.level].push(index);
    }

    tree.nodes[ROOT].index = 0;
    for level in levels.iter_mut().skip(1) {
        let view: &FamilyTree = tree;
        level.sort_by(|&a, &b| sibling_key(view, a).cmp(&sibling_key(view, b)));

        for (position, &index) in level.iter().enumerate() {
            tree.nodes[index].index = position;
            let ancestor = tree.nodes[index].ancestor;
            let parent = tree.nodes[index].parent;
            tree.nodes[ancestor].children.push(index);
            if parent != ancestor {
                tree.nodes[parent].children.push(index);
            }
        }
    }

    tree.levels = levels;
}

#[cfg(test)]
mod tests {
    use stemma_core::person::{PersonRecord, Sex};

    use super::*;

    fn lineage(id: &str, sex: Sex, parent: Option<&str>) -> PersonRecord {
        PersonRecord::new(id)
            .with_lineage(true)
            .with_sex(sex)
            .with_parent_ref(parent.map(str::to_string))
    }

    fn spouse(id: &str, sex: Sex, partner: &str) -> PersonRecord {
        PersonRecord::new(id)
            .with_sex(sex)
            .with_parent_ref(Some(partner.to_string()))
    }

    fn ids(tree: &FamilyTree, indices: &[NodeIndex]) -> Vec<String> {
        indices
            .iter()
            .map(|&i| tree.node(i).id().unwrap_or("<root>").to_string())
            .collect()
    }

    #[test]
    fn test_female_lineage_closes_row() {
        let tree = FamilyTree::build(&[
            lineage("A", Sex::Female, None),
            spouse("S", Sex::Male, "A"),
        ])
        .unwrap();
        let a = tree.find("A").unwrap();
        assert_eq!(ids(&tree, tree.node(a).elements()), vec!["S", "A"]);
    }

    #[test]
    fn test_male_lineage_leads_row_and_spouses_sorted() {
        let tree = FamilyTree::build(&[
            lineage("A", Sex::Male, None),
            spouse("Z", Sex::Female, "A"),
            spouse("M", Sex::Male, "A"),
            spouse("B", Sex::Female, "A"),
            spouse("U", Sex::Unknown, "A"),
        ])
        .unwrap();
        let a = tree.find("A").unwrap();
        assert_eq!(ids(&tree, tree.node(a).spouses()), vec!["M", "B", "Z", "U"]);
        assert_eq!(ids(&tree, tree.node(a).elements()), vec!["A", "M", "B", "Z", "U"]);
    }

    #[test]
    fn test_spouse_of_spouse_joins_row() {
        let tree = FamilyTree::build(&[
            lineage("A", Sex::Female, None),
            spouse("H1", Sex::Male, "A"),
            spouse("W2", Sex::Female, "H1"),
        ])
        .unwrap();
        let a = tree.find("A").unwrap();
        assert_eq!(ids(&tree, tree.node(a).elements()), vec!["H1", "W2", "A"]);
    }

    #[test]
    fn test_level_order_groups_by_parent_then_id() {
        // A's row is [A, S1, S2]; children of S2 come after children of A.
        let tree = FamilyTree::build(&[
            lineage("A", Sex::Male, None),
            spouse("S1", Sex::Female, "A"),
            spouse("S2", Sex::Female, "A"),
            lineage("c3", Sex::Male, Some("S2")),
            lineage("c2", Sex::Male, Some("S1")),
            lineage("c1", Sex::Male, Some("S1")),
            lineage("c0", Sex::Male, Some("A")),
        ])
        .unwrap();

        assert_eq!(ids(&tree, &tree.levels()[2]), vec!["c0", "c1", "c2", "c3"]);
        let a = tree.find("A").unwrap();
        assert_eq!(ids(&tree, tree.node(a).children()), vec!["c0", "c1", "c2", "c3"]);
        let s1 = tree.find("S1").unwrap();
        assert_eq!(ids(&tree, tree.node(s1).children()), vec!["c1", "c2"]);
    }

    #[test]
    fn test_level_order_follows_ancestor_index() {
        let tree = FamilyTree::build(&[
            lineage("B", Sex::Male, None),
            lineage("A", Sex::Male, None),
            lineage("b1", Sex::Male, Some("B")),
            lineage("a1", Sex::Male, Some("A")),
            lineage("a0", Sex::Male, Some("A")),
        ])
        .unwrap();

        assert_eq!(ids(&tree, &tree.levels()[1]), vec!["A", "B"]);
        assert_eq!(ids(&tree, &tree.levels()[2]), vec!["a0", "a1", "b1"]);
        let b1 = tree.find("b1").unwrap();
        assert_eq!(tree.node(b1).index(), 2);
        assert_eq!(ids(&tree, tree.root().children()), vec!["A", "B"]);
    }
}
