//! The traversal engine: a single-threaded state machine that, given a
//! document, a cursor and an incoming signal, computes the next node and the
//! externally observable instruction payload.
//!
//! Session state is an explicit value passed to pure functions rather than a
//! mutable session object: `start` and `advance` are deterministic in their
//! arguments, which makes turns trivially testable, replayable and
//! persistable. The engine performs no I/O and never mutates the document.

use serde::{Deserialize, Serialize};

use crate::document::{GraphIndex, Node, NodeKind, WorkflowDocument};
use crate::error::SessionError;
use crate::resolver::{ResolvedKnowledge, resolve};
use crate::validator::validate;

mod matcher;

pub use matcher::{BranchMatcher, LiteralMatcher};

/// The cursor of one live conversation, pinned to the document revision it
/// started against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Revision stamp of the document this session runs against. An in-flight
    /// session keeps executing that revision even if an author saves a newer
    /// one mid-conversation.
    pub revision: u64,
    /// Current node. `None` only for the degenerate session started on the
    /// canonical empty document.
    pub node_id: Option<String>,
    /// True when the session is suspended at a node awaiting a user reply.
    pub awaiting_reply: bool,
    /// True once a terminal node has been reached; no further transitions.
    pub terminated: bool,
}

/// The signal driving one `advance` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "camelCase")]
pub enum Signal {
    /// The next user utterance. Only valid when the current node is a
    /// suspension point.
    UserReply(String),
    /// Resume a non-suspending node. Only valid when the current node does
    /// not await a reply.
    Continue,
}

/// The externally observable payload produced on every node visit: the node's
/// instructions plus its resolved knowledge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Emission {
    pub node_id: String,
    pub instructions: String,
    pub instructions_detailed: String,
    pub knowledge: ResolvedKnowledge,
}

/// How a turn left the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TurnOutcome {
    /// Suspended at a node awaiting the next user reply.
    AwaitingReply,
    /// A terminal node was reached; the session is over.
    Terminated,
    /// No branch condition matched the signal. A recoverable authoring
    /// defect: the session stays parked at the branch node so the caller can
    /// retry with different input or escalate.
    NoBranchMatched,
}

/// The result of one external round-trip: every node visited this turn (the
/// auto-chain collapses consecutive non-suspending steps) and the state the
/// session is left in. The last emission is the node the turn landed on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub state: SessionState,
    pub emissions: Vec<Emission>,
    pub outcome: TurnOutcome,
}

/// Result of resolving a single transition out of a node.
enum Step<'a> {
    Moved(&'a Node),
    /// A suspending dead-end default node: the reply consumes the suspension
    /// and the node behaves as an implicit end.
    Terminal,
    NoMatch,
}

/// Walks a validated workflow document turn by turn.
///
/// One `Engine` can serve any number of sessions concurrently; it holds no
/// per-session state, only the branch matching policy.
pub struct Engine {
    matcher: Box<dyn BranchMatcher>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// An engine with the default [`LiteralMatcher`] branch policy.
    pub fn new() -> Self {
        Self {
            matcher: Box::new(LiteralMatcher),
        }
    }

    /// An engine with a custom branch matching policy.
    pub fn with_matcher(matcher: Box<dyn BranchMatcher>) -> Self {
        Self { matcher }
    }

    /// Validates the document (failing fast with the full issue list), places
    /// the cursor on the entry node and emits it. A non-suspending entry node
    /// is an automatic step, so the turn immediately auto-advances until it
    /// reaches a suspension point or a terminal node.
    ///
    /// Starting on the canonical empty document yields a terminated session
    /// with no emissions.
    pub fn start(&self, document: &WorkflowDocument, revision: u64) -> Result<Turn, SessionError> {
        validate(document).map_err(SessionError::InvalidDocument)?;

        if document.is_empty() {
            return Ok(Turn {
                state: SessionState {
                    revision,
                    node_id: None,
                    awaiting_reply: false,
                    terminated: true,
                },
                emissions: Vec::new(),
                outcome: TurnOutcome::Terminated,
            });
        }

        let index = GraphIndex::new(document);
        let entry = index.entry().ok_or_else(|| SessionError::InconsistentDocument {
            detail: "validated document has no unique entry node".to_string(),
        })?;
        self.settle(&index, entry, Vec::new(), revision)
    }

    /// Applies `signal` to the current node and moves the cursor. After a
    /// successful move the engine keeps advancing with [`Signal::Continue`]
    /// through non-suspending nodes, so one call collapses a run of purely
    /// informational steps into a single external round-trip.
    ///
    /// Contract violations (wrong signal kind, advancing a terminated
    /// session) are errors. A missed branch match is not: the turn comes back
    /// with [`TurnOutcome::NoBranchMatched`] and an unchanged state.
    pub fn advance(
        &self,
        document: &WorkflowDocument,
        state: &SessionState,
        signal: Signal,
    ) -> Result<Turn, SessionError> {
        if state.terminated {
            return Err(SessionError::SessionAlreadyTerminated);
        }
        let Some(node_id) = state.node_id.as_deref() else {
            return Err(SessionError::SessionAlreadyTerminated);
        };

        let index = GraphIndex::new(document);
        let current = index
            .node(node_id)
            .ok_or_else(|| SessionError::InconsistentDocument {
                detail: format!("current node '{}' is not part of the document", node_id),
            })?;

        match (&signal, current.require_user_response) {
            (Signal::Continue, true) => {
                return Err(SessionError::ReplyExpected {
                    node_id: current.id.clone(),
                });
            }
            (Signal::UserReply(_), false) => {
                return Err(SessionError::ReplyNotExpected {
                    node_id: current.id.clone(),
                });
            }
            _ => {}
        }

        match self.step(&index, current, &signal)? {
            Step::Moved(next) => self.settle(&index, next, Vec::new(), state.revision),
            Step::Terminal => Ok(Turn {
                state: SessionState {
                    revision: state.revision,
                    node_id: state.node_id.clone(),
                    awaiting_reply: false,
                    terminated: true,
                },
                emissions: Vec::new(),
                outcome: TurnOutcome::Terminated,
            }),
            Step::NoMatch => Ok(Turn {
                state: state.clone(),
                emissions: Vec::new(),
                outcome: TurnOutcome::NoBranchMatched,
            }),
        }
    }

    /// The resolved knowledge for the session's current node, for callers
    /// that rebuild an outward-facing prompt between turns.
    pub fn resolve_knowledge(
        &self,
        document: &WorkflowDocument,
        state: &SessionState,
    ) -> Option<ResolvedKnowledge> {
        state
            .node_id
            .as_deref()
            .map(|node_id| resolve(document, node_id))
    }

    /// Emits `node` and keeps advancing with `Continue` until a suspension
    /// point or terminal node. Visiting more nodes in one turn than the
    /// document holds means the graph cycles without a suspension point.
    fn settle<'a>(
        &self,
        index: &GraphIndex<'a>,
        first: &'a Node,
        mut emissions: Vec<Emission>,
        revision: u64,
    ) -> Result<Turn, SessionError> {
        let mut node = first;
        let mut remaining = index.node_count();
        loop {
            emissions.push(self.emit(index.document(), node));

            if node.require_user_response {
                return Ok(Turn {
                    state: SessionState {
                        revision,
                        node_id: Some(node.id.clone()),
                        awaiting_reply: true,
                        terminated: false,
                    },
                    emissions,
                    outcome: TurnOutcome::AwaitingReply,
                });
            }
            if Self::is_terminal(index, node) {
                return Ok(Turn {
                    state: SessionState {
                        revision,
                        node_id: Some(node.id.clone()),
                        awaiting_reply: false,
                        terminated: true,
                    },
                    emissions,
                    outcome: TurnOutcome::Terminated,
                });
            }

            if remaining == 0 {
                return Err(SessionError::NonSuspendingCycle {
                    node_id: node.id.clone(),
                });
            }
            remaining -= 1;

            node = match self.step(index, node, &Signal::Continue)? {
                Step::Moved(next) => next,
                // A non-suspending branch node whose conditions all miss
                // `Continue`: park the session there with what was emitted.
                Step::NoMatch => {
                    return Ok(Turn {
                        state: SessionState {
                            revision,
                            node_id: Some(node.id.clone()),
                            awaiting_reply: false,
                            terminated: false,
                        },
                        emissions,
                        outcome: TurnOutcome::NoBranchMatched,
                    });
                }
                Step::Terminal => {
                    return Err(SessionError::InconsistentDocument {
                        detail: format!("terminal node '{}' advanced during auto-chain", node.id),
                    });
                }
            };
        }
    }

    /// Resolves a single transition out of `node` under `signal`.
    fn step<'a>(
        &self,
        index: &GraphIndex<'a>,
        node: &'a Node,
        signal: &Signal,
    ) -> Result<Step<'a>, SessionError> {
        match node.kind {
            NodeKind::End => Err(SessionError::SessionAlreadyTerminated),
            NodeKind::Jump => {
                let target =
                    node.target_node_id
                        .as_deref()
                        .ok_or_else(|| SessionError::InconsistentDocument {
                            detail: format!("jump node '{}' has no target", node.id),
                        })?;
                let next = index
                    .node(target)
                    .ok_or_else(|| SessionError::InconsistentDocument {
                        detail: format!("jump node '{}' targets unknown node '{}'", node.id, target),
                    })?;
                Ok(Step::Moved(next))
            }
            NodeKind::Default => match index.edges_from(&node.id).first() {
                Some(edge) => {
                    let next =
                        index
                            .node(&edge.target)
                            .ok_or_else(|| SessionError::InconsistentDocument {
                                detail: format!(
                                    "edge '{}' targets unknown node '{}'",
                                    edge.id, edge.target
                                ),
                            })?;
                    Ok(Step::Moved(next))
                }
                None => Ok(Step::Terminal),
            },
            NodeKind::Branch => {
                // First match in array order wins; conditions need not be
                // mutually exclusive.
                let matched = node
                    .branches
                    .iter()
                    .find(|b| self.matcher.matches(&b.condition, signal));
                let Some(branch) = matched else {
                    return Ok(Step::NoMatch);
                };
                let edge = index
                    .edges_from(&node.id)
                    .iter()
                    .find(|e| e.source_handle.as_deref() == Some(branch.id.as_str()))
                    .copied()
                    .ok_or_else(|| SessionError::InconsistentDocument {
                        detail: format!(
                            "branch '{}' of node '{}' has no matching edge",
                            branch.id, node.id
                        ),
                    })?;
                let next =
                    index
                        .node(&edge.target)
                        .ok_or_else(|| SessionError::InconsistentDocument {
                            detail: format!(
                                "edge '{}' targets unknown node '{}'",
                                edge.id, edge.target
                            ),
                        })?;
                Ok(Step::Moved(next))
            }
        }
    }

    fn emit(&self, document: &WorkflowDocument, node: &Node) -> Emission {
        Emission {
            node_id: node.id.clone(),
            instructions: node.instructions.clone(),
            instructions_detailed: node.instructions_detailed.clone(),
            knowledge: resolve(document, &node.id),
        }
    }

    /// `end` nodes terminate; so does a `default` node with no outgoing edge,
    /// which behaves as an implicit end.
    fn is_terminal(index: &GraphIndex<'_>, node: &Node) -> bool {
        match node.kind {
            NodeKind::End => true,
            NodeKind::Default => index.edges_from(&node.id).is_empty(),
            NodeKind::Jump | NodeKind::Branch => false,
        }
    }
}
