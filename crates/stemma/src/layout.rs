//! Geometric layout of a family tree.
//!
//! Layout runs in three stages over the ordered [`FamilyTree`]:
//!
//! 1. [`metrics`] - bottom-up widths, margins and footprints;
//! 2. [`placement`] - top-down coordinates, children centred beneath their
//!    ancestor's row, followed by an overlap repair;
//! 3. [`compaction`] - iterative removal of horizontal slack.
//!
//! The result is a [`TreeLayout`], a read-only list of placed boxes and
//! connectors that a renderer can draw without knowing anything about the
//! tree.

pub mod compaction;
mod metrics;
mod placement;

use log::{debug, info};

use stemma_core::{
    geometry::{Bounds, Point, Size},
    person::Sex,
};

use crate::{
    config::LayoutConfig,
    tree::{FamilyTree, NodeIndex, ROOT},
};

pub use compaction::CompactionReport;

/// Layout constants with the scale factor applied.
#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    box_size: Size,
    same_family_gap: f32,
    different_family_gap: f32,
    gap_before: f32,
    gap_after: f32,
    origin: Point,
}

impl Geometry {
    pub fn from_config(config: &LayoutConfig) -> Self {
        let scale = config.scale();
        Self {
            box_size: Size::new(config.box_width(), config.box_height()).scale(scale),
            same_family_gap: config.same_family_gap() * scale,
            different_family_gap: config.different_family_gap() * scale,
            gap_before: config.gap_before() * scale,
            gap_after: config.gap_after() * scale,
            origin: Point::new(config.origin_left(), config.origin_top()),
        }
    }

    pub fn box_size(&self) -> Size {
        self.box_size
    }

    pub fn box_width(&self) -> f32 {
        self.box_size.width()
    }

    pub fn box_height(&self) -> f32 {
        self.box_size.height()
    }

    pub fn same_family_gap(&self) -> f32 {
        self.same_family_gap
    }

    pub fn different_family_gap(&self) -> f32 {
        self.different_family_gap
    }

    pub fn gap_before(&self) -> f32 {
        self.gap_before
    }

    pub fn gap_after(&self) -> f32 {
        self.gap_after
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Vertical distance between the tops of two consecutive generations.
    pub fn row_pitch(&self) -> f32 {
        self.box_height() + self.gap_before + self.gap_after
    }
}

/// A box ready to draw: one person at its final position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBox {
    id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    sex: Sex,
    birth: Option<String>,
    death: Option<String>,
    wedding: Option<String>,
    lineage: bool,
    level: usize,
    family: String,
    position: usize,
    bounds: Bounds,
}

impl PlacedBox {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn birth(&self) -> Option<&str> {
        self.birth.as_deref()
    }

    pub fn death(&self) -> Option<&str> {
        self.death.as_deref()
    }

    pub fn wedding(&self) -> Option<&str> {
        self.wedding.as_deref()
    }

    pub fn lineage(&self) -> bool {
        self.lineage
    }

    /// Generation, 1 for the first drawn row.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Id of the lineage person whose row this box belongs to.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Position within the family row, from the left.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn left(&self) -> f32 {
        self.bounds.min_x()
    }

    pub fn top(&self) -> f32 {
        self.bounds.min_y()
    }

    pub fn width(&self) -> f32 {
        self.bounds.width()
    }

    pub fn height(&self) -> f32 {
        self.bounds.height()
    }
}

/// An orthogonal line from a parent's box down to a child's box.
///
/// The line leaves the bottom centre of the parent, runs down to `elbow_y`,
/// across to the child's centre and down to the child's top.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    parent_id: String,
    child_id: String,
    start: Point,
    end: Point,
    elbow_y: f32,
}

impl Connector {
    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    pub fn child_id(&self) -> &str {
        &self.child_id
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn elbow_y(&self) -> f32 {
        self.elbow_y
    }
}

/// The laid out tree.
#[derive(Debug, Clone)]
pub struct TreeLayout {
    boxes: Vec<PlacedBox>,
    connectors: Vec<Connector>,
    orphans: Vec<String>,
    bounds: Bounds,
    compaction: CompactionReport,
}

impl TreeLayout {
    /// Boxes level by level, left to right.
    pub fn boxes(&self) -> &[PlacedBox] {
        &self.boxes
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    /// Ids of records left out because they do not reach the root.
    pub fn orphans(&self) -> &[String] {
        &self.orphans
    }

    /// Bounding box of all boxes, empty when there are none.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn compaction(&self) -> &CompactionReport {
        &self.compaction
    }

    pub fn find_box(&self, id: &str) -> Option<&PlacedBox> {
        self.boxes.iter().find(|placed| placed.id == id)
    }

    fn from_tree(tree: &FamilyTree, geometry: &Geometry, compaction: CompactionReport) -> Self {
        let mut boxes = Vec::new();
        let mut connectors = Vec::new();

        for level in tree.levels().iter().skip(1) {
            for &owner in level {
                let family = tree.node(owner).id().unwrap_or_default();
                for (position, &element) in tree.node(owner).elements().iter().enumerate() {
                    if let Some(placed) = placed_box(tree, geometry, element, family, position) {
                        boxes.push(placed);
                    }
                }
            }
        }

        for level in tree.levels().iter().skip(2) {
            for &child in level {
                if let Some(connector) = connector(tree, geometry, child) {
                    connectors.push(connector);
                }
            }
        }

        let bounds = boxes
            .iter()
            .map(PlacedBox::bounds)
            .reduce(|acc, bounds| acc.merge(&bounds))
            .unwrap_or_default();

        Self {
            boxes,
            connectors,
            orphans: tree.orphans().to_vec(),
            bounds,
            compaction,
        }
    }
}

fn placed_box(
    tree: &FamilyTree,
    geometry: &Geometry,
    index: NodeIndex,
    family: &str,
    position: usize,
) -> Option<PlacedBox> {
    let node = tree.node(index);
    let record = node.record()?;
    Some(PlacedBox {
        id: record.id().to_string(),
        first_name: record.first_name().map(str::to_string),
        last_name: record.last_name().map(str::to_string),
        sex: record.sex(),
        birth: record.birth().map(str::to_string),
        death: record.death().map(str::to_string),
        wedding: record.wedding().map(str::to_string),
        lineage: node.lineage(),
        level: node.level(),
        family: family.to_string(),
        position,
        bounds: Bounds::new_from_top_left(Point::new(node.left(), node.top()), geometry.box_size()),
    })
}

/// Connector from the box the child's record points at, which may be a
/// spouse of the ancestor.
fn connector(tree: &FamilyTree, geometry: &Geometry, child: NodeIndex) -> Option<Connector> {
    let child_node = tree.node(child);
    let parent = child_node.parent();
    if parent == ROOT {
        return None;
    }
    let parent_node = tree.node(parent);
    let half_width = geometry.box_width() / 2.0;
    let parent_bottom = parent_node.top() + geometry.box_height();

    Some(Connector {
        parent_id: parent_node.id()?.to_string(),
        child_id: child_node.id()?.to_string(),
        start: Point::new(parent_node.left() + half_width, parent_bottom),
        end: Point::new(child_node.left() + half_width, child_node.top()),
        elbow_y: parent_bottom + geometry.gap_before(),
    })
}

/// Lay out an ordered tree.
///
/// Runs the metric, placement and (when enabled) compaction stages on
/// `tree` and returns the drawable result.
pub fn arrange(tree: &mut FamilyTree, config: &LayoutConfig) -> TreeLayout {
    let geometry = Geometry::from_config(config);
    debug!(geometry:?; "Layout constants");

    metrics::measure(tree, &geometry);
    placement::place(tree, &geometry);

    let report = if config.compaction() {
        compaction::compact(tree, config.precision(), config.max_compaction_passes())
    } else {
        debug!("Compaction disabled");
        CompactionReport::default()
    };

    let layout = TreeLayout::from_tree(tree, &geometry, report);
    info!(
        boxes = layout.boxes.len(),
        connectors = layout.connectors.len(),
        width = layout.bounds.width();
        "Layout computed"
    );
    layout
}
