use ahash::{AHashMap, AHashSet};

use super::definition::{Edge, Node, NodeKind, WorkflowDocument};

/// Arena-style index over a document: an id → node map and an adjacency list,
/// built once in O(n + e) and shared by the validator and the traversal
/// engine. The graph stays flat arrays with id references; this index is the
/// only pointer structure, so the document itself remains trivially
/// serializable and diffable.
pub struct GraphIndex<'a> {
    document: &'a WorkflowDocument,
    nodes: AHashMap<&'a str, &'a Node>,
    outgoing: AHashMap<&'a str, Vec<&'a Edge>>,
    entry_candidates: Vec<&'a Node>,
}

impl<'a> GraphIndex<'a> {
    pub fn new(document: &'a WorkflowDocument) -> Self {
        let mut nodes: AHashMap<&str, &Node> = AHashMap::with_capacity(document.nodes.len());
        for node in &document.nodes {
            // First declaration wins on (invalid) duplicate ids.
            nodes.entry(node.id.as_str()).or_insert(node);
        }

        let mut outgoing: AHashMap<&str, Vec<&Edge>> = AHashMap::new();
        for edge in &document.edges {
            outgoing.entry(edge.source.as_str()).or_default().push(edge);
        }

        // A jump target counts as an incoming connection even when the editor
        // did not draw a mirroring edge for it.
        let mut targeted: AHashSet<&str> =
            document.edges.iter().map(|e| e.target.as_str()).collect();
        for node in &document.nodes {
            if node.kind == NodeKind::Jump {
                if let Some(target) = node.target_node_id.as_deref() {
                    targeted.insert(target);
                }
            }
        }

        let entry_candidates = document
            .nodes
            .iter()
            .filter(|n| !targeted.contains(n.id.as_str()))
            .collect();

        Self {
            document,
            nodes,
            outgoing,
            entry_candidates,
        }
    }

    pub fn document(&self) -> &'a WorkflowDocument {
        self.document
    }

    pub fn node(&self, id: &str) -> Option<&'a Node> {
        self.nodes.get(id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.document.nodes.len()
    }

    /// Edges leaving `id`, in document order.
    pub fn edges_from(&self, id: &str) -> &[&'a Edge] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every node with no incoming connection. A valid document has exactly
    /// one; the validator reports zero or several as defects.
    pub fn entry_candidates(&self) -> &[&'a Node] {
        &self.entry_candidates
    }

    /// The entry node, when it is unique.
    pub fn entry(&self) -> Option<&'a Node> {
        match self.entry_candidates.as_slice() {
            [single] => Some(*single),
            _ => None,
        }
    }

    /// Ids this node can transition to: the jump target for `Jump` nodes,
    /// outgoing edge targets for everything else.
    pub fn successors(&self, node: &'a Node) -> Vec<&'a str> {
        match node.kind {
            NodeKind::Jump => node.target_node_id.as_deref().into_iter().collect(),
            _ => self
                .edges_from(&node.id)
                .iter()
                .map(|e| e.target.as_str())
                .collect(),
        }
    }
}
