use super::definition::WorkflowDocument;
use crate::error::DocumentConversionError;

/// A trait for custom editor or transport formats that can be converted into a
/// canonical [`WorkflowDocument`].
///
/// This is the extension point that keeps the engine format-agnostic: whatever
/// shape a visual editor exports, implement `IntoWorkflow` on your parsed
/// structs and hand the result to the validator and the store. The crate ships
/// one implementation, [`crate::wire::EditorWorkflow`], covering the nested
/// `{ id, data: { ... } }` export of the reference editor.
pub trait IntoWorkflow {
    /// Consumes the object and converts it into a canonical workflow document.
    fn into_workflow(self) -> Result<WorkflowDocument, DocumentConversionError>;
}
