//! The framework-neutral boundary a conversation runtime talks to: save and
//! load workflows, start sessions, feed user replies in and get the next
//! instruction payload back.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use ahash::AHashMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::document::WorkflowDocument;
use crate::engine::{Engine, SessionState, Signal, Turn, TurnOutcome};
use crate::error::{ServiceError, ValidationReport};
use crate::resolver::{ResolvedKnowledge, resolve};
use crate::store::{VersionedWorkflow, WorkflowStore};

/// Opaque handle to one live conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct LiveSession {
    agent_id: String,
    workflow: VersionedWorkflow,
    state: SessionState,
}

/// What one external round-trip hands back to the caller: the landed node's
/// instructions and resolved knowledge plus the session flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReply {
    pub session_id: SessionId,
    pub node_id: Option<String>,
    pub instructions: String,
    pub knowledge: ResolvedKnowledge,
    pub awaiting_reply: bool,
    pub terminated: bool,
    /// Set when no branch condition matched and the session stayed parked.
    pub no_branch_matched: bool,
}

/// Conversation façade over a [`WorkflowStore`] and an [`Engine`].
///
/// Sessions fetch their document once at start and stay pinned to that
/// revision; authors saving a newer revision only affect sessions started
/// afterwards. Dropping a session (`end_session`) is the only cancellation
/// primitive; wall-clock expiry belongs to the caller.
pub struct ConversationService<S: WorkflowStore> {
    store: S,
    engine: Engine,
    sessions: RwLock<AHashMap<SessionId, LiveSession>>,
    next_session: AtomicU64,
}

impl<S: WorkflowStore> ConversationService<S> {
    pub fn new(store: S) -> Self {
        Self::with_engine(store, Engine::new())
    }

    /// A service with a custom engine (e.g. a non-default branch matcher).
    pub fn with_engine(store: S, engine: Engine) -> Self {
        Self {
            store,
            engine,
            sessions: RwLock::new(AHashMap::new()),
            next_session: AtomicU64::new(1),
        }
    }

    /// The latest saved workflow for `agent_id`, or the canonical empty
    /// document at revision 0.
    pub fn load_workflow(&self, agent_id: &str) -> VersionedWorkflow {
        self.store.load(agent_id)
    }

    /// Validates and atomically replaces the agent's workflow, returning the
    /// new revision. In-flight sessions keep their pinned revision.
    pub fn save_workflow(
        &self,
        agent_id: &str,
        document: WorkflowDocument,
    ) -> Result<u64, ValidationReport> {
        self.store.save(agent_id, document)
    }

    /// Starts a conversation against the agent's latest workflow. On an agent
    /// with no saved workflow this yields a well-defined, already-terminated
    /// session with no instructions.
    pub fn start_session(&self, agent_id: &str) -> Result<SessionReply, ServiceError> {
        let workflow = self.store.load(agent_id);
        let turn = self.engine.start(&workflow.document, workflow.revision)?;

        let session_id = SessionId(self.next_session.fetch_add(1, Ordering::Relaxed));
        info!(
            agent_id,
            session = %session_id,
            revision = workflow.revision,
            "conversation session started"
        );

        let reply = Self::reply(session_id, &workflow.document, &turn);
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                session_id,
                LiveSession {
                    agent_id: agent_id.to_string(),
                    workflow,
                    state: turn.state,
                },
            );
        Ok(reply)
    }

    /// Feeds the next signal into a live session and returns the payload of
    /// the resulting turn. Contract violations leave the session untouched;
    /// a missed branch match parks it, resumable, at the branch node.
    pub fn advance_session(
        &self,
        session_id: SessionId,
        signal: Signal,
    ) -> Result<SessionReply, ServiceError> {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let session = sessions
            .get_mut(&session_id)
            .ok_or(ServiceError::UnknownSession(session_id))?;

        let turn = self
            .engine
            .advance(&session.workflow.document, &session.state, signal)?;
        session.state = turn.state.clone();
        debug!(
            agent_id = session.agent_id.as_str(),
            session = %session_id,
            node = session.state.node_id.as_deref().unwrap_or("-"),
            outcome = ?turn.outcome,
            "session advanced"
        );

        Ok(Self::reply(session_id, &session.workflow.document, &turn))
    }

    /// Drops the session state. Returns false for unknown (or already
    /// dropped) sessions.
    pub fn end_session(&self, session_id: SessionId) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&session_id)
            .is_some()
    }

    fn reply(session_id: SessionId, document: &WorkflowDocument, turn: &Turn) -> SessionReply {
        // A turn with no emissions did not move: re-read the current node so
        // the caller can re-prompt (or emit nothing for the empty document).
        let (instructions, knowledge) = match turn.emissions.last() {
            Some(emission) => (emission.instructions.clone(), emission.knowledge.clone()),
            None => match turn
                .state
                .node_id
                .as_deref()
                .and_then(|id| document.node_by_id(id))
            {
                Some(node) => (node.instructions.clone(), resolve(document, &node.id)),
                None => (String::new(), ResolvedKnowledge::default()),
            },
        };

        SessionReply {
            session_id,
            node_id: turn.state.node_id.clone(),
            instructions,
            knowledge,
            awaiting_reply: turn.state.awaiting_reply,
            terminated: turn.state.terminated,
            no_branch_matched: matches!(turn.outcome, TurnOutcome::NoBranchMatched),
        }
    }
}
