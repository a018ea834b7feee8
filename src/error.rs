use crate::service::SessionId;
use std::fmt;
use thiserror::Error;

/// A structural defect found by the validator. Each variant belongs to one of
/// the document invariants: id uniqueness, referential integrity, entry
/// uniqueness, per-variant shape rules, and reachability. Issues are surfaced
/// at save time; a document carrying any of them never reaches the runtime.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    #[error("node id '{node_id}' is declared more than once")]
    DuplicateNodeId { node_id: String },

    #[error("edge '{edge_id}' references unknown source node '{node_id}'")]
    EdgeSourceUnknown { edge_id: String, node_id: String },

    #[error("edge '{edge_id}' references unknown target node '{node_id}'")]
    EdgeTargetUnknown { edge_id: String, node_id: String },

    #[error("no entry node: every node has at least one incoming connection")]
    NoEntryNode,

    #[error("entry node is ambiguous: nodes {node_ids:?} all have no incoming connection")]
    MultipleEntryNodes { node_ids: Vec<String> },

    #[error("end node '{node_id}' has {edge_count} outgoing edge(s); end nodes must have none")]
    EndNodeWithOutgoing { node_id: String, edge_count: usize },

    #[error("jump node '{node_id}' has no target node id")]
    JumpWithoutTarget { node_id: String },

    #[error("jump node '{node_id}' targets unknown node '{target_id}'")]
    JumpTargetUnknown { node_id: String, target_id: String },

    #[error(
        "jump node '{node_id}' has {edge_count} outgoing edge(s) that do not mirror its jump target"
    )]
    JumpWithOutgoingEdges { node_id: String, edge_count: usize },

    #[error("branch node '{node_id}' declares {count} branch(es); at least 2 are required")]
    BranchesTooFew { node_id: String, count: usize },

    #[error("branch node '{node_id}' declares branch id '{branch_id}' more than once")]
    DuplicateBranchId { node_id: String, branch_id: String },

    #[error(
        "branch '{branch_id}' of node '{node_id}' has no outgoing edge with a matching source handle"
    )]
    BranchWithoutEdge { node_id: String, branch_id: String },

    #[error(
        "branch '{branch_id}' of node '{node_id}' is claimed by {edge_count} outgoing edges; exactly one is required"
    )]
    BranchEdgeConflict {
        node_id: String,
        branch_id: String,
        edge_count: usize,
    },

    #[error(
        "edge '{edge_id}' leaves branch node '{node_id}' with source handle '{handle}' matching no declared branch"
    )]
    EdgeWithoutBranch {
        node_id: String,
        edge_id: String,
        handle: String,
    },

    #[error("default node '{node_id}' has {edge_count} outgoing edges; at most one is allowed")]
    DefaultWithMultipleEdges { node_id: String, edge_count: usize },

    #[error("node '{node_id}' is not reachable from the entry node")]
    UnreachableNode { node_id: String },
}

/// The ordered list of issues a failed validation produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub(crate) fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "workflow document failed validation with {} issue(s): ",
            self.issues.len()
        )?;
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

impl IntoIterator for ValidationReport {
    type Item = ValidationIssue;
    type IntoIter = std::vec::IntoIter<ValidationIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a ValidationIssue;
    type IntoIter = std::slice::Iter<'a, ValidationIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}

/// Errors that can occur when converting a custom editor format into a
/// canonical `WorkflowDocument`.
#[derive(Error, Debug, Clone)]
pub enum DocumentConversionError {
    #[error("node '{node_id}' has unknown variant '{variant}'")]
    UnknownVariant { node_id: String, variant: String },

    #[error("invalid workflow data: {0}")]
    Invalid(String),
}

/// Errors raised by the traversal engine for a single session.
///
/// `ReplyExpected`, `ReplyNotExpected` and `SessionAlreadyTerminated` are
/// caller contract violations and are never retried by the engine. A missed
/// branch match is *not* an error: it is reported through
/// [`crate::engine::TurnOutcome::NoBranchMatched`] and leaves the session
/// parked and resumable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("workflow document failed validation: {0}")]
    InvalidDocument(ValidationReport),

    #[error("session is already terminated; no further transitions are possible")]
    SessionAlreadyTerminated,

    #[error("node '{node_id}' is a suspension point awaiting a user reply; Continue is not valid here")]
    ReplyExpected { node_id: String },

    #[error("node '{node_id}' does not await a user reply; UserReply is not valid here")]
    ReplyNotExpected { node_id: String },

    #[error("auto-advance revisited node '{node_id}': the graph cycles without a suspension point")]
    NonSuspendingCycle { node_id: String },

    #[error("workflow document is internally inconsistent: {detail}")]
    InconsistentDocument { detail: String },
}

/// Errors surfaced by the session façade.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("no live session with id '{0}'")]
    UnknownSession(SessionId),

    #[error(transparent)]
    Session(#[from] SessionError),
}
