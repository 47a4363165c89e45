use std::collections::BTreeMap;

use crate::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// The far end of an edge, seen from the document that owns it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EdgeTarget {
    Node(NodeId),
    /// Unresolved link; the raw target string.
    Missing(String),
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkEdge {
    pub direction: Direction,
    pub peer: EdgeTarget,
}

impl LinkEdge {
    /// False for links whose target does not exist in the vault.
    pub fn exists(&self) -> bool {
        matches!(self.peer, EdgeTarget::Node(_))
    }

    pub fn node(&self) -> Option<NodeId> {
        match &self.peer {
            EdgeTarget::Node(id) => Some(*id),
            EdgeTarget::Missing(_) => None,
        }
    }
}

/// Outgoing and incoming link edges per document.
///
/// Duplicate links are kept as duplicate edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkGraph {
    edges: BTreeMap<NodeId, Vec<LinkEdge>>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `source -> target` and the mirrored `target <- source`.
    pub fn record_link(&mut self, source: NodeId, target: NodeId) {
        self.push(
            source,
            LinkEdge {
                direction: Direction::Outgoing,
                peer: EdgeTarget::Node(target),
            },
        );
        self.push(
            target,
            LinkEdge {
                direction: Direction::Incoming,
                peer: EdgeTarget::Node(source),
            },
        );
    }

    /// Records an outgoing edge to a target that does not exist.
    pub fn record_broken(&mut self, source: NodeId, raw_target: impl Into<String>) {
        self.push(
            source,
            LinkEdge {
                direction: Direction::Outgoing,
                peer: EdgeTarget::Missing(raw_target.into()),
            },
        );
    }

    fn push(&mut self, doc: NodeId, edge: LinkEdge) {
        self.edges.entry(doc).or_default().push(edge);
    }

    pub fn edges(&self, doc: NodeId) -> &[LinkEdge] {
        self.edges.get(&doc).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn outgoing(&self, doc: NodeId) -> impl Iterator<Item = &LinkEdge> {
        self.edges(doc)
            .iter()
            .filter(|e| e.direction == Direction::Outgoing)
    }

    pub fn incoming(&self, doc: NodeId) -> impl Iterator<Item = &LinkEdge> {
        self.edges(doc)
            .iter()
            .filter(|e| e.direction == Direction::Incoming)
    }

    /// Every unresolved link as `(source, raw target)`, in document order.
    pub fn broken(&self) -> impl Iterator<Item = (NodeId, &str)> {
        self.edges.iter().flat_map(|(doc, edges)| {
            edges.iter().filter_map(move |e| match &e.peer {
                EdgeTarget::Missing(raw) => Some((*doc, raw.as_str())),
                EdgeTarget::Node(_) => None,
            })
        })
    }

    /// Documents that have at least one edge.
    pub fn documents(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.edges.keys().copied()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
