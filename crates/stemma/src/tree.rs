//! Genealogical graph built from flat person records.
//!
//! Every record becomes a [`PersonNode`] in an arena addressed by
//! [`NodeIndex`]. Index [`ROOT`] holds a synthetic root that every top-level
//! record hangs beneath; it has no identifier and is never drawn.
//!
//! Records point at their parent by id. A lineage record (a blood
//! descendant) pointing at a node becomes a child one generation below it; a
//! non-lineage record becomes a spouse on the same generation. Children are
//! often attached to a spouse rather than to the descendant, so the nearest
//! lineage node one generation up, the *ancestor*, is what groups siblings.
//!
//! ```text
//!   [root]
//!      │
//!   Jean ── Louise        (Louise: spouse of Jean)
//!      │
//!   Pierre, Marie         (parent_ref = Louise, ancestor = Jean)
//! ```

use std::collections::HashMap;

use log::{debug, info, warn};
use petgraph::{
    algo::tarjan_scc,
    graph::{DiGraph, NodeIndex as GraphIndex},
    visit::{Dfs, EdgeRef},
};
use thiserror::Error;

use stemma_core::person::{PersonRecord, Sex};

use crate::order;

/// Position of a node in the [`FamilyTree`] arena.
pub type NodeIndex = usize;

/// Arena index of the synthetic root.
pub const ROOT: NodeIndex = 0;

/// How a node attaches to the node its record references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// One generation below.
    Lineage,
    /// Same generation, drawn in the partner's row.
    Spouse,
}

/// Errors raised while building the tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("identifier `{0}` is used by more than one record")]
    DuplicateId(String),

    #[error("parent references form a cycle through {}", .ids.join(", "))]
    CyclicReference { ids: Vec<String> },
}

/// One person in the tree, or the root.
///
/// Besides the record, a node carries its resolved relations and the layout
/// state the later stages write: metrics from the bottom-up pass and the
/// top-left corner of its own box.
#[derive(Debug, Clone)]
pub struct PersonNode {
    pub(crate) record: Option<PersonRecord>,
    pub(crate) lineage: bool,
    /// Whether the parent chain reaches the root.
    pub(crate) attached: bool,
    pub(crate) parent: NodeIndex,
    pub(crate) children: Vec<NodeIndex>,
    pub(crate) spouses: Vec<NodeIndex>,
    pub(crate) ancestor: NodeIndex,
    pub(crate) elements: Vec<NodeIndex>,
    pub(crate) level: usize,
    pub(crate) index: usize,
    pub(crate) width: f32,
    pub(crate) footprint: f32,
    pub(crate) size: f32,
    pub(crate) margins: [f32; 2],
    pub(crate) left: f32,
    pub(crate) top: f32,
}

impl PersonNode {
    fn root() -> Self {
        Self {
            record: None,
            lineage: true,
            attached: true,
            parent: ROOT,
            children: Vec::new(),
            spouses: Vec::new(),
            ancestor: ROOT,
            elements: Vec::new(),
            level: 0,
            index: 0,
            width: 0.0,
            footprint: 0.0,
            size: 0.0,
            margins: [0.0; 2],
            left: 0.0,
            top: 0.0,
        }
    }

    fn from_record(record: PersonRecord) -> Self {
        Self {
            lineage: record.lineage(),
            record: Some(record),
            attached: false,
            ..Self::root()
        }
    }

    /// Returns the identifier, `None` for the root.
    pub fn id(&self) -> Option<&str> {
        self.record.as_ref().map(PersonRecord::id)
    }

    pub fn record(&self) -> Option<&PersonRecord> {
        self.record.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.record.is_none()
    }

    pub fn sex(&self) -> Sex {
        self.record.as_ref().map(PersonRecord::sex).unwrap_or_default()
    }

    pub fn lineage(&self) -> bool {
        self.lineage
    }

    pub fn attached(&self) -> bool {
        self.attached
    }

    pub fn parent(&self) -> NodeIndex {
        self.parent
    }

    /// Lineage nodes of the next generation hanging beneath this node.
    ///
    /// For a lineage node this aggregates the children of all its spouses,
    /// in level order.
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    pub fn spouses(&self) -> &[NodeIndex] {
        &self.spouses
    }

    /// Nearest lineage node of an earlier generation.
    pub fn ancestor(&self) -> NodeIndex {
        self.ancestor
    }

    /// The family row of a lineage node, empty for spouses and the root.
    pub fn elements(&self) -> &[NodeIndex] {
        &self.elements
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// Position within the level after sorting.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Width of the family row.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Space the children's rows need, margins included.
    pub fn footprint(&self) -> f32 {
        self.footprint
    }

    /// `max(width, footprint)`.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Half gaps before and after the row.
    pub fn margins(&self) -> [f32; 2] {
        self.margins
    }

    /// Left edge of this node's own box.
    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn top(&self) -> f32 {
        self.top
    }
}

/// The arena of person nodes with relations, levels and order resolved.
#[derive(Debug, Clone)]
pub struct FamilyTree {
    pub(crate) nodes: Vec<PersonNode>,
    pub(crate) levels: Vec<Vec<NodeIndex>>,
    pub(crate) orphans: Vec<String>,
}

impl FamilyTree {
    /// Build the tree from records in file order.
    ///
    /// Records whose parent chain does not reach the root are excluded and
    /// reported through [`FamilyTree::orphans`].
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DuplicateId`] when two records share an id and
    /// [`TreeError::CyclicReference`] when parent references loop.
    pub fn build(records: &[PersonRecord]) -> Result<Self, TreeError> {
        let mut ids: HashMap<&str, NodeIndex> = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if ids.insert(record.id(), position + 1).is_some() {
                return Err(TreeError::DuplicateId(record.id().to_string()));
            }
        }

        let mut nodes = Vec::with_capacity(records.len() + 1);
        nodes.push(PersonNode::root());
        nodes.extend(records.iter().cloned().map(PersonNode::from_record));

        let graph = relation_graph(records, &ids);
        check_cycles(&graph, &nodes)?;

        let mut tree = Self {
            nodes,
            levels: Vec::new(),
            orphans: Vec::new(),
        };
        tree.attach(&graph);
        tree.resolve_ancestors();
        tree.collect_orphans();
        order::resolve(&mut tree);

        info!(
            nodes = tree.nodes.len() - 1,
            levels = tree.levels.len(),
            orphans = tree.orphans.len();
            "Family tree built"
        );
        Ok(tree)
    }

    pub fn nodes(&self) -> &[PersonNode] {
        &self.nodes
    }

    pub fn node(&self, index: NodeIndex) -> &PersonNode {
        &self.nodes[index]
    }

    pub fn root(&self) -> &PersonNode {
        &self.nodes[ROOT]
    }

    /// Lineage nodes per generation; level 0 holds only the root.
    pub fn levels(&self) -> &[Vec<NodeIndex>] {
        &self.levels
    }

    /// Ids of records left out because they do not reach the root.
    pub fn orphans(&self) -> &[String] {
        &self.orphans
    }

    /// Find the arena index of the node with the given id.
    pub fn find(&self, id: &str) -> Option<NodeIndex> {
        self.nodes.iter().position(|node| node.id() == Some(id))
    }

    /// Left edge of the family row of `index`.
    pub fn row_left(&self, index: NodeIndex) -> f32 {
        let node = &self.nodes[index];
        node.elements
            .first()
            .map_or(node.left, |&first| self.nodes[first].left)
    }

    /// Right edge of the family row of `index`.
    pub fn row_right(&self, index: NodeIndex) -> f32 {
        self.row_left(index) + self.nodes[index].width
    }

    /// Walks the parent links with a visited set, fixing each reached node's
    /// parent, generation and spouse list.
    fn attach(&mut self, graph: &DiGraph<(), Relation>) {
        let mut dfs = Dfs::new(graph, GraphIndex::new(ROOT));
        while let Some(current) = dfs.next(graph) {
            let index = current.index();
            self.nodes[index].attached = true;
            let level = self.nodes[index].level;

            for edge in graph.edges(current) {
                let target = edge.target().index();
                self.nodes[target].parent = index;
                match edge.weight() {
                    Relation::Lineage => self.nodes[target].level = level + 1,
                    Relation::Spouse => {
                        self.nodes[target].level = level;
                        self.nodes[index].spouses.push(target);
                    }
                }
            }
        }
    }

    fn resolve_ancestors(&mut self) {
        for index in 1..self.nodes.len() {
            if !self.nodes[index].attached {
                continue;
            }
            let level = self.nodes[index].level;
            let mut current = self.nodes[index].parent;
            while current != ROOT
                && !(self.nodes[current].lineage && self.nodes[current].level < level)
            {
                current = self.nodes[current].parent;
            }
            self.nodes[index].ancestor = current;
        }
    }

    fn collect_orphans(&mut self) {
        for node in &self.nodes[1..] {
            if node.attached {
                continue;
            }
            let Some(record) = node.record() else {
                continue;
            };
            warn!(
                id = record.id(),
                parent_ref:? = record.parent_ref();
                "Record does not reach the root, leaving it out of the layout"
            );
            self.orphans.push(record.id().to_string());
        }
    }
}

/// Indexes parent references as edges parent → child.
///
/// A record without a parent reference hangs beneath the root when it is a
/// lineage record. A spouse has no partner to stand next to there, so it
/// gets no edge and ends up among the orphans, as does any record whose
/// parent id does not exist.
fn relation_graph(records: &[PersonRecord], ids: &HashMap<&str, NodeIndex>) -> DiGraph<(), Relation> {
    let mut graph = DiGraph::with_capacity(records.len() + 1, records.len());
    for _ in 0..=records.len() {
        graph.add_node(());
    }

    for (position, record) in records.iter().enumerate() {
        let parent = match record.parent_ref() {
            None if record.lineage() => Some(ROOT),
            None => None,
            Some(parent_id) => ids.get(parent_id).copied(),
        };
        let relation = if record.lineage() {
            Relation::Lineage
        } else {
            Relation::Spouse
        };

        match parent {
            Some(parent) => {
                graph.add_edge(GraphIndex::new(parent), GraphIndex::new(position + 1), relation);
            }
            None => debug!(id = record.id(); "Record has no resolvable parent"),
        }
    }
    graph
}

fn check_cycles(graph: &DiGraph<(), Relation>, nodes: &[PersonNode]) -> Result<(), TreeError> {
    let mut ids: Vec<String> = tarjan_scc(graph)
        .into_iter()
        .filter(|component| component.len() > 1 || graph.contains_edge(component[0], component[0]))
        .flatten()
        .filter_map(|index| nodes[index.index()].id().map(str::to_string))
        .collect();

    if ids.is_empty() {
        return Ok(());
    }
    ids.sort();
    Err(TreeError::CyclicReference { ids })
}
