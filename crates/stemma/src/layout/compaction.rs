//! Horizontal compaction of placed rows.
//!
//! Placement reserves a full `size` for every row, so wide subtrees leave
//! slack between their neighbours. Compaction closes it from both ends of a
//! generation at once: two pointers walk in from the outermost rows, and the
//! first row on each side that can move inwards does so by the smaller of
//! the two available gaps. This keeps the generation symmetric about its
//! centre.
//!
//! A row may only move within its corridor:
//!
//! - the outermost children of an ancestor stay within the ancestor's row;
//! - a row with children stays above the span of those children.
//!
//! Generations are visited widest first, and passes repeat until a whole
//! pass moves nothing.

use log::{debug, info, trace, warn};

use crate::tree::{FamilyTree, NodeIndex, ROOT};

use super::placement::shift_row;

/// Upper bound of moves on one row within a pass.
const MAX_ROW_STEPS: usize = 100_000;

/// Outcome of [`compact`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompactionReport {
    passes: usize,
    total_improvement: f32,
    converged: bool,
}

impl Default for CompactionReport {
    fn default() -> Self {
        Self {
            passes: 0,
            total_improvement: 0.0,
            converged: true,
        }
    }
}

impl CompactionReport {
    /// Number of passes run, including the final one that moved nothing.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Sum of every move applied, in layout units.
    pub fn total_improvement(&self) -> f32 {
        self.total_improvement
    }

    /// `false` when the pass limit was reached first.
    pub fn converged(&self) -> bool {
        self.converged
    }
}

/// Direction of travel along a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Way {
    Left,
    Right,
}

/// Rounds half up to `precision` decimals.
fn round_to(value: f32, precision: u32) -> f32 {
    let factor = 10f32.powi(precision as i32);
    (value * factor + 0.5).floor() / factor
}

/// Truncates towards zero to `precision` decimals.
fn truncate_to(value: f32, precision: u32) -> f32 {
    let factor = 10f32.powi(precision as i32);
    (value * factor).trunc() / factor
}

/// Distance between two rows of the same level, from the right edge of the
/// leftmost to the left edge of the other.
pub(crate) fn distance(tree: &FamilyTree, a: NodeIndex, b: NodeIndex) -> f32 {
    if tree.row_left(a) < tree.row_left(b) {
        tree.row_left(b) - tree.row_right(a)
    } else {
        tree.row_left(a) - tree.row_right(b)
    }
}

/// Distance between two rows minus their facing margins.
pub(crate) fn space(tree: &FamilyTree, a: NodeIndex, b: NodeIndex) -> f32 {
    let [a_before, a_after] = tree.node(a).margins();
    let [b_before, b_after] = tree.node(b).margins();
    let facing = if tree.row_left(a) < tree.row_left(b) {
        a_after + b_before
    } else {
        a_before + b_after
    };
    distance(tree, a, b) - facing
}

/// How far `index` may travel in `way` without leaving its corridor, or
/// `None` when nothing bounds it on that side.
fn corridor(tree: &FamilyTree, index: NodeIndex, way: Way, precision: u32) -> Option<f32> {
    let node = tree.node(index);
    let row_left = tree.row_left(index);

    let mut lower: Option<f32> = None;
    let mut upper: Option<f32> = None;

    let ancestor = node.ancestor();
    let siblings = tree.node(ancestor).children();
    let outermost = siblings.first() == Some(&index) || siblings.last() == Some(&index);
    if ancestor != ROOT && outermost {
        let bound = match way {
            Way::Right => tree.row_left(ancestor),
            Way::Left => tree.row_right(ancestor) - node.width(),
        };
        if bound < row_left || (bound == row_left && way == Way::Left) {
            lower = Some(bound);
        } else {
            upper = Some(bound);
        }
    }

    if let (Some(&first), Some(&last)) = (node.children().first(), node.children().last()) {
        let children_lower = tree.row_left(first);
        let children_upper = tree.row_right(last) - node.width();
        lower = Some(lower.map_or(children_lower, |bound| bound.max(children_lower)));
        upper = Some(upper.map_or(children_upper, |bound| bound.min(children_upper)));
    }

    let available = match way {
        Way::Left => lower.map(|bound| row_left - bound),
        Way::Right => upper.map(|bound| bound - row_left),
    };
    available.map(|value| round_to(value, precision))
}

/// How far row `a` can move towards row `b`.
pub(crate) fn gap(tree: &FamilyTree, a: NodeIndex, b: NodeIndex, precision: u32) -> f32 {
    let way = if tree.row_left(a) < tree.row_left(b) {
        Way::Right
    } else {
        Way::Left
    };
    let space = space(tree, a, b);
    let available = match corridor(tree, a, way, precision) {
        Some(bound) => space.min(bound),
        None => space,
    };
    round_to(available, precision)
}

/// Horizontal extent of a level, from its first element to its last.
fn span(tree: &FamilyTree, level: &[NodeIndex]) -> f32 {
    match (level.first(), level.last()) {
        (Some(&first), Some(&last)) => tree.row_right(last) - tree.row_left(first),
        _ => 0.0,
    }
}

/// One step of the two-pointer scan.
///
/// Moves `left` to the first row from the left that can move right and
/// `right` to the first row from the right that can move left, and returns
/// the symmetric move both can make.
fn scan(
    tree: &FamilyTree,
    row: &[NodeIndex],
    left: &mut usize,
    right: &mut usize,
    precision: u32,
) -> f32 {
    let mut left_gap = 0.0;
    for k in *left..*right {
        let candidate = gap(tree, row[k], row[k + 1], precision);
        if candidate > 0.0 {
            *left = k;
            left_gap = candidate;
            break;
        }
    }

    let mut right_gap = 0.0;
    for k in (*left + 1..=*right).rev() {
        let candidate = gap(tree, row[k], row[k - 1], precision);
        if candidate > 0.0 {
            *right = k;
            right_gap = candidate;
            break;
        }
    }

    let mut improvement: f32 = f32::min(left_gap, right_gap);
    if *left + 1 == *right {
        improvement /= 2.0;
    }
    truncate_to(improvement, precision)
}

/// Compacts one generation until the scan finds nothing to move.
fn compact_row(tree: &mut FamilyTree, depth: usize, precision: u32) -> f32 {
    let row = tree.levels[depth].clone();
    if row.len() < 2 {
        return 0.0;
    }

    let (mut left, mut right) = (0, row.len() - 1);
    let mut total = 0.0;
    for _ in 0..MAX_ROW_STEPS {
        let improvement = scan(tree, &row, &mut left, &mut right, precision);
        if improvement <= 0.0 {
            return total;
        }
        trace!(
            depth = depth,
            left = tree.node(row[left]).id().unwrap_or_default(),
            right = tree.node(row[right]).id().unwrap_or_default(),
            improvement = improvement;
            "Rows moved inwards"
        );
        let before = (tree.row_left(row[left]), tree.row_left(row[right]));
        shift_row(tree, row[left], improvement);
        shift_row(tree, row[right], -improvement);
        if (tree.row_left(row[left]), tree.row_left(row[right])) == before {
            // the move is below the resolution of the coordinates
            debug!(
                depth = depth,
                improvement = improvement;
                "Row settled at coordinate resolution"
            );
            return total;
        }
        total += improvement;
    }

    warn!(depth = depth, steps = MAX_ROW_STEPS; "Row compaction step limit reached");
    total
}

/// One pass over every generation, widest first.
fn compact_pass(tree: &mut FamilyTree, precision: u32) -> f32 {
    let mut order: Vec<(usize, f32)> = (1..tree.levels.len())
        .map(|depth| (depth, span(tree, &tree.levels[depth])))
        .collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    order
        .into_iter()
        .map(|(depth, _)| compact_row(tree, depth, precision))
        .sum()
}

/// Compacts every generation of a placed tree.
///
/// Passes repeat until one moves nothing or `max_passes` is reached. Moves
/// are truncated to `precision` decimals so each of them closes at least one
/// unit of that precision.
pub fn compact(tree: &mut FamilyTree, precision: u32, max_passes: usize) -> CompactionReport {
    let mut report = CompactionReport {
        converged: false,
        ..CompactionReport::default()
    };

    while report.passes < max_passes {
        report.passes += 1;
        let moved = compact_pass(tree, precision);
        debug!(pass = report.passes, moved = moved; "Compaction pass");
        if moved <= 0.0 {
            report.converged = true;
            break;
        }
        report.total_improvement += moved;
    }

    if report.converged {
        info!(
            passes = report.passes,
            improvement = report.total_improvement;
            "Compaction converged"
        );
    } else {
        warn!(
            passes = report.passes,
            improvement = report.total_improvement;
            "Compaction stopped at the pass limit"
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use stemma_core::person::{PersonRecord, Sex};

    use super::*;
    use crate::{
        config::LayoutConfig,
        layout::{Geometry, metrics, placement},
    };

    fn lineage(id: &str, parent: Option<&str>) -> PersonRecord {
        PersonRecord::new(id)
            .with_lineage(true)
            .with_sex(Sex::Male)
            .with_parent_ref(parent.map(str::to_string))
    }

    fn placed(records: &[PersonRecord]) -> FamilyTree {
        let geometry = Geometry::from_config(
            &LayoutConfig::default()
                .with_box_size(26.0, 16.0)
                .with_family_gaps(6.0, 10.0)
                .with_vertical_gaps(10.0, 16.0)
                .with_origin(500.0, 100.0),
        );
        let mut tree = FamilyTree::build(records).unwrap();
        metrics::measure(&mut tree, &geometry);
        placement::place(&mut tree, &geometry);
        tree
    }

    /// Two cousins' families of four, facing each other across the gap left
    /// by their grandparents' rows.
    fn one_sided() -> Vec<PersonRecord> {
        let mut records = vec![
            lineage("A", None),
            lineage("B", None),
            lineage("a1", Some("A")),
            lineage("b1", Some("B")),
        ];
        for i in 0..4 {
            records.push(lineage(&format!("a1-{i}"), Some("a1")));
            records.push(lineage(&format!("b1-{i}"), Some("b1")));
        }
        records
    }

    fn positions(tree: &FamilyTree) -> Vec<f32> {
        tree.nodes().iter().map(|node| node.left()).collect()
    }

    #[test]
    fn test_round_and_truncate() {
        assert_approx_eq!(f32, round_to(1.005_1, 2), 1.01);
        assert_approx_eq!(f32, round_to(-0.004, 2), 0.0);
        assert_approx_eq!(f32, truncate_to(1.009, 2), 1.0);
        assert_approx_eq!(f32, truncate_to(0.5, 0), 0.0);
    }

    #[test]
    fn test_space_subtracts_facing_margins() {
        let tree = placed(&[lineage("A", None), lineage("B", None)]);
        let a = tree.find("A").unwrap();
        let b = tree.find("B").unwrap();

        // A: [5, 3], B: [3, 5]; placed touching after margins
        assert_approx_eq!(f32, distance(&tree, a, b), 6.0, epsilon = 1e-4);
        assert_approx_eq!(f32, space(&tree, a, b), 0.0, epsilon = 1e-4);
        assert_approx_eq!(f32, space(&tree, b, a), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_corridor_bounded_by_children() {
        let tree = placed(&[
            lineage("A", None),
            lineage("a1", Some("A")),
            lineage("a2", Some("A")),
        ]);
        let a = tree.find("A").unwrap();

        // children span [A - 16, A + 42]; A may move 16 left and 16 right
        let left = corridor(&tree, a, Way::Left, 2).unwrap();
        let right = corridor(&tree, a, Way::Right, 2).unwrap();
        assert_approx_eq!(f32, left, 16.0, epsilon = 0.01);
        assert_approx_eq!(f32, right, 16.0, epsilon = 0.01);
    }

    #[test]
    fn test_corridor_free_at_top_level_without_children() {
        let tree = placed(&[lineage("A", None), lineage("B", None)]);
        let a = tree.find("A").unwrap();
        assert_eq!(corridor(&tree, a, Way::Right, 2), None);
        assert_eq!(corridor(&tree, a, Way::Left, 2), None);
    }

    #[test]
    fn test_only_child_is_held_under_ancestor() {
        let tree = placed(&[lineage("A", None), lineage("a1", Some("A"))]);
        let a1 = tree.find("a1").unwrap();

        // a1 sits exactly under A, so it cannot move either way
        assert_eq!(corridor(&tree, a1, Way::Right, 2), Some(0.0));
        assert_eq!(corridor(&tree, a1, Way::Left, 2), Some(0.0));
    }

    #[test]
    fn test_one_sided_subtrees_are_pulled_together() {
        let mut tree = placed(&one_sided());
        let depth = 3;
        let before = span(&tree, &tree.levels()[depth]);

        let report = compact(&mut tree, 2, 1000);

        assert!(report.converged());
        assert!(report.total_improvement() > 0.0);
        let after = span(&tree, &tree.levels()[depth]);
        assert!(after < before);
        for level in tree.levels().iter().skip(1) {
            for pair in level.windows(2) {
                assert!(space(&tree, pair[0], pair[1]) >= -0.01);
            }
        }
    }

    #[test]
    fn test_compaction_is_idempotent() {
        let mut tree = placed(&one_sided());
        compact(&mut tree, 2, 1000);
        let first = positions(&tree);

        let report = compact(&mut tree, 2, 1000);
        assert_eq!(positions(&tree), first);
        assert_eq!(report.passes(), 1);
        assert_approx_eq!(f32, report.total_improvement(), 0.0);
    }

    #[test]
    fn test_scan_finds_nothing_after_compaction() {
        let mut tree = placed(&one_sided());
        compact(&mut tree, 2, 1000);

        for row in tree.levels().iter().skip(1).filter(|row| row.len() > 1) {
            let (mut left, mut right) = (0, row.len() - 1);
            assert_approx_eq!(f32, scan(&tree, row, &mut left, &mut right, 2), 0.0);
        }
    }

    #[test]
    fn test_high_precision_still_converges() {
        let mut tree = placed(&one_sided());
        let report = compact(&mut tree, 6, 1000);

        assert!(report.converged());
        for level in tree.levels().iter().skip(1) {
            for pair in level.windows(2) {
                assert!(space(&tree, pair[0], pair[1]) >= -0.01);
            }
        }
    }

    #[test]
    fn test_pass_limit_is_reported() {
        let mut tree = placed(&one_sided());
        let report = compact(&mut tree, 2, 0);
        assert!(!report.converged());
        assert_eq!(report.passes(), 0);
    }
}
