//! # Kaiwa - Conversational Workflow Graph Engine
//!
//! **Kaiwa** models the conversational workflow of an automated agent as a
//! versioned, directed graph: nodes are conversation steps (linear, terminal,
//! jump, branch), edges are the transitions between them, and every step can
//! inject knowledge (actions, FAQs, objections, products, services) resolved
//! against agent-global collections. The graph is authored visually, persisted
//! as one structured document per agent, and interpreted turn by turn at
//! conversation time.
//!
//! ## Core Workflow
//!
//! The engine is format-agnostic and operates on a canonical
//! `WorkflowDocument`. The primary workflow is:
//!
//! 1.  **Load Your Data**: Parse the editor's export (JSON) with the `wire`
//!     types, or implement the `IntoWorkflow` trait for your own format.
//! 2.  **Validate**: `validator::validate` proves the document is executable
//!     (referential integrity, a unique entry node, per-variant shape rules,
//!     reachability) and reports every issue at once.
//! 3.  **Persist**: a `WorkflowStore` keeps one document per agent,
//!     validate-before-save, whole-document replace, monotonically increasing
//!     revisions.
//! 4.  **Converse**: the `Engine` (or the `ConversationService` façade) walks
//!     the graph turn by turn, suspending at nodes that await a user reply and
//!     auto-chaining through informational steps.
//!
//! ## Quick Start
//!
//! ```rust
//! use kaiwa::prelude::*;
//!
//! fn main() -> kaiwa::prelude::Result<()> {
//!     // A two-step flow: a greeting that auto-advances into a yes/no question.
//!     let document = WorkflowDocument {
//!         name: "onboarding".to_string(),
//!         nodes: vec![
//!             Node {
//!                 id: "greet".to_string(),
//!                 instructions: "Welcome the customer".to_string(),
//!                 ..Node::default()
//!             },
//!             Node {
//!                 id: "confirm".to_string(),
//!                 kind: NodeKind::Branch,
//!                 require_user_response: true,
//!                 instructions: "Ask whether they want the offer".to_string(),
//!                 branches: vec![
//!                     Branch { id: "yes".to_string(), condition: "yes".to_string(), ..Branch::default() },
//!                     Branch { id: "no".to_string(), condition: "*".to_string(), ..Branch::default() },
//!                 ],
//!                 ..Node::default()
//!             },
//!             Node { id: "done".to_string(), kind: NodeKind::End, ..Node::default() },
//!             Node { id: "bye".to_string(), kind: NodeKind::End, ..Node::default() },
//!         ],
//!         edges: vec![
//!             Edge {
//!                 id: "e1".to_string(),
//!                 source: "greet".to_string(),
//!                 target: "confirm".to_string(),
//!                 ..Edge::default()
//!             },
//!             Edge {
//!                 id: "e2".to_string(),
//!                 source: "confirm".to_string(),
//!                 target: "done".to_string(),
//!                 source_handle: Some("yes".to_string()),
//!                 ..Edge::default()
//!             },
//!             Edge {
//!                 id: "e3".to_string(),
//!                 source: "confirm".to_string(),
//!                 target: "bye".to_string(),
//!                 source_handle: Some("no".to_string()),
//!                 ..Edge::default()
//!             },
//!         ],
//!         ..WorkflowDocument::default()
//!     };
//!
//!     let service = ConversationService::new(MemoryStore::new());
//!     service.save_workflow("agent-1", document)?;
//!
//!     // The greeting does not await a reply, so the session auto-chains
//!     // straight to the question and suspends there.
//!     let reply = service.start_session("agent-1")?;
//!     assert_eq!(reply.node_id.as_deref(), Some("confirm"));
//!     assert!(reply.awaiting_reply);
//!
//!     let reply = service.advance_session(reply.session_id, Signal::UserReply("yes".to_string()))?;
//!     assert_eq!(reply.node_id.as_deref(), Some("done"));
//!     assert!(reply.terminated);
//!     Ok(())
//! }
//! ```

pub mod document;
pub mod engine;
pub mod error;
pub mod prelude;
pub mod resolver;
pub mod service;
pub mod store;
pub mod validator;
pub mod wire;
