//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types and traits from the kaiwa crate.
//! Import this module to get access to the core functionality without having
//! to import each type individually.

// Document model and conversion
pub use crate::document::{
    Action, Branch, Edge, Faq, IntoWorkflow, KnowledgeRecord, Node, NodeKind, Objection, Product,
    Service, WorkflowDocument,
};

// Validation
pub use crate::validator::validate;

// Knowledge resolution
pub use crate::resolver::{MemoizedResolver, ResolvedKnowledge, resolve};

// Traversal engine
pub use crate::engine::{
    BranchMatcher, Emission, Engine, LiteralMatcher, SessionState, Signal, Turn, TurnOutcome,
};

// Persistence and session façade
pub use crate::service::{ConversationService, SessionId, SessionReply};
pub use crate::store::{MemoryStore, VersionedWorkflow, WorkflowStore};

// Error types
pub use crate::error::{
    DocumentConversionError, ServiceError, SessionError, ValidationIssue, ValidationReport,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
