//! Load-one/replace-one persistence keyed by agent id.
//!
//! The engine never talks to a store mid-traversal, only at session start.
//! A save is an atomic whole-document replace that must pass validation
//! first; rejected documents never reach the runtime.

use std::sync::{Arc, PoisonError, RwLock};

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::document::WorkflowDocument;
use crate::error::ValidationReport;
use crate::validator::validate;

/// A stored document together with its revision stamp. Sessions pin the
/// revision they started against, so an in-flight conversation always
/// finishes on the document version it began with.
#[derive(Debug, Clone)]
pub struct VersionedWorkflow {
    pub revision: u64,
    pub document: Arc<WorkflowDocument>,
}

impl VersionedWorkflow {
    /// Revision 0 with the canonical empty document: what agents without a
    /// saved workflow get.
    pub fn unsaved() -> Self {
        Self {
            revision: 0,
            document: Arc::new(WorkflowDocument::empty()),
        }
    }
}

/// The persistence seam the engine depends on. Implementations own
/// durability and concurrent-author policy (last-writer-wins is acceptable);
/// the contract here is only validate-before-persist and atomic replacement.
pub trait WorkflowStore: Send + Sync {
    /// The latest saved workflow for `agent_id`, or [`VersionedWorkflow::unsaved`]
    /// when none has ever been saved. Never errors.
    fn load(&self, agent_id: &str) -> VersionedWorkflow;

    /// Validates and replaces the whole document for `agent_id`, returning
    /// the new revision. Any validation issue rejects the save.
    fn save(&self, agent_id: &str, document: WorkflowDocument) -> Result<u64, ValidationReport>;
}

/// In-memory reference store. Revisions increase monotonically per agent;
/// concurrent saves resolve last-writer-wins.
#[derive(Debug, Default)]
pub struct MemoryStore {
    workflows: RwLock<AHashMap<String, VersionedWorkflow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorkflowStore for MemoryStore {
    fn load(&self, agent_id: &str) -> VersionedWorkflow {
        self.workflows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(agent_id)
            .cloned()
            .unwrap_or_else(VersionedWorkflow::unsaved)
    }

    fn save(&self, agent_id: &str, document: WorkflowDocument) -> Result<u64, ValidationReport> {
        if let Err(report) = validate(&document) {
            warn!(agent_id, issues = report.len(), "rejected workflow save");
            return Err(report);
        }

        let mut workflows = self
            .workflows
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let revision = workflows.get(agent_id).map(|w| w.revision + 1).unwrap_or(1);
        workflows.insert(
            agent_id.to_string(),
            VersionedWorkflow {
                revision,
                document: Arc::new(document),
            },
        );
        debug!(agent_id, revision, "workflow saved");
        Ok(revision)
    }
}
