use serde::{Deserialize, Serialize};
use std::fmt;

use super::index::GraphIndex;
use super::knowledge::{Action, Faq, Objection, Product, Service};

/// The complete, canonical definition of a conversational workflow for one agent.
///
/// This is the persisted wire shape (camelCase JSON) and the structure the
/// validator and the traversal engine operate on. Construction never fails:
/// malformed graphs are representable so an editor can hold them transiently,
/// and only `validator::validate` decides whether a document is executable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowDocument {
    pub name: String,
    pub description: String,
    /// Agent-level framing prepended to every conversation.
    pub instructions: String,
    pub global_actions: Vec<Action>,
    pub global_faqs: Vec<Faq>,
    pub global_objections: Vec<Objection>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Opaque editor hint; never read by the engine.
    pub entry_position_x: f64,
    pub entry_position_y: f64,
}

/// A single step of the conversation graph.
///
/// `target_node_id` is only meaningful for `Jump` nodes and `branches` only for
/// `Branch` nodes; the validator enforces the per-variant shape rules. The
/// embedded knowledge collections are node-local overrides and additions,
/// resolved against the document's global collections on every visit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Node {
    pub id: String,
    #[serde(rename = "variant")]
    pub kind: NodeKind,
    pub label: String,
    /// Marks a suspension point: the engine halts here and waits for the next
    /// user utterance before evaluating any outgoing edge.
    pub require_user_response: bool,
    pub instructions: String,
    pub instructions_detailed: String,
    pub target_node_id: Option<String>,
    pub branches: Vec<Branch>,
    pub actions: Vec<Action>,
    pub faqs: Vec<Faq>,
    pub objections: Vec<Objection>,
    pub products: Vec<Product>,
    pub services: Vec<Service>,
}

/// Structural variant of a node, serialized as the wire's `variant` string tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Linear step with at most one outgoing edge.
    #[default]
    Default,
    /// Terminal state; no outgoing edges.
    End,
    /// Unconditional transfer to `target_node_id`.
    Jump,
    /// Fan-out on the user's reply; one outgoing edge per declared branch.
    Branch,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Default => "default",
            NodeKind::End => "end",
            NodeKind::Jump => "jump",
            NodeKind::Branch => "branch",
        };
        write!(f, "{}", name)
    }
}

/// One labelled exit of a `Branch` node. The branch `id` must equal the
/// `source_handle` of exactly one outgoing edge of the owning node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Branch {
    pub id: String,
    pub label: String,
    /// Free-text predicate evaluated against the incoming signal; matching
    /// semantics belong to the `BranchMatcher` seam, not the data model.
    pub condition: String,
}

/// A directed arc between two nodes. `source_handle` disambiguates which
/// branch of a `Branch` node the edge represents; edges from other node
/// variants ignore it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

impl WorkflowDocument {
    /// The canonical empty document: what `WorkflowStore::load` returns for an
    /// agent that has never saved a workflow.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when the document holds no nodes and no edges.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Looks up a node by id. On (invalid) documents with duplicate ids the
    /// first declaration wins.
    pub fn node_by_id(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// All edges leaving `id`, in document order.
    pub fn edges_from<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| e.source == id)
    }

    /// The unique node with no incoming connections (edges or jump targets),
    /// or `None` when the document is empty or the entry is ambiguous.
    pub fn entry_node(&self) -> Option<&Node> {
        GraphIndex::new(self).entry()
    }
}
