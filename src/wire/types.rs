use serde::Deserialize;

use crate::document::{
    Action, Branch, Edge, Faq, IntoWorkflow, Node, NodeKind, Objection, Product, Service,
    WorkflowDocument,
};
use crate::error::DocumentConversionError;

// These structs match the visual editor's export format, where each node wraps
// its domain payload in a `data` object and field names are camelCase. They
// are only used for conversion into the canonical model.

/// A full editor export: graph, agent framing and global knowledge.
#[derive(Debug, Deserialize)]
pub struct EditorWorkflow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default, alias = "globalActions")]
    pub global_actions: Vec<Action>,
    #[serde(default, alias = "globalFaqs")]
    pub global_faqs: Vec<Faq>,
    #[serde(default, alias = "globalObjections")]
    pub global_objections: Vec<Objection>,
    #[serde(default)]
    pub nodes: Vec<EditorNode>,
    #[serde(default)]
    pub edges: Vec<EditorEdge>,
    #[serde(default, alias = "entryPositionX")]
    pub entry_position_x: f64,
    #[serde(default, alias = "entryPositionY")]
    pub entry_position_y: f64,
}

/// An editor node: canvas metadata at the top level, domain fields in `data`.
#[derive(Debug, Deserialize)]
pub struct EditorNode {
    pub id: String,
    /// The editor's node component name; used as the variant when `data`
    /// carries none.
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,
    #[serde(default)]
    pub position: EditorPosition,
    pub data: EditorNodeData,
}

/// Canvas coordinates. Parsed so round-tripping editors keep working, then
/// discarded at conversion: only the document-level entry position survives
/// into the canonical model.
#[derive(Debug, Default, Deserialize)]
pub struct EditorPosition {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct EditorNodeData {
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default, alias = "requireUserResponse")]
    pub require_user_response: bool,
    #[serde(default)]
    pub instructions: String,
    #[serde(default, alias = "instructionsDetailed")]
    pub instructions_detailed: String,
    #[serde(default, alias = "targetNodeId")]
    pub target_node_id: Option<String>,
    #[serde(default)]
    pub branches: Vec<EditorBranch>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub faqs: Vec<Faq>,
    #[serde(default)]
    pub objections: Vec<Objection>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub services: Vec<Service>,
}

#[derive(Debug, Deserialize)]
pub struct EditorBranch {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub condition: String,
}

#[derive(Debug, Deserialize)]
pub struct EditorEdge {
    #[serde(default)]
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, alias = "sourceHandle")]
    pub source_handle: Option<String>,
    #[serde(default, alias = "targetHandle")]
    pub target_handle: Option<String>,
}

fn parse_variant(node_id: &str, raw: Option<&str>) -> Result<NodeKind, DocumentConversionError> {
    match raw {
        None => Ok(NodeKind::Default),
        Some("default") => Ok(NodeKind::Default),
        Some("end") => Ok(NodeKind::End),
        Some("jump") => Ok(NodeKind::Jump),
        Some("branch") => Ok(NodeKind::Branch),
        Some(other) => Err(DocumentConversionError::UnknownVariant {
            node_id: node_id.to_string(),
            variant: other.to_string(),
        }),
    }
}

impl IntoWorkflow for EditorWorkflow {
    fn into_workflow(self) -> Result<WorkflowDocument, DocumentConversionError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|editor_node| {
                let EditorNode {
                    id,
                    node_type,
                    position: _,
                    data,
                } = editor_node;
                let kind = parse_variant(&id, data.variant.as_deref().or(node_type.as_deref()))?;
                Ok(Node {
                    id,
                    kind,
                    label: data.label,
                    require_user_response: data.require_user_response,
                    instructions: data.instructions,
                    instructions_detailed: data.instructions_detailed,
                    target_node_id: data.target_node_id,
                    branches: data
                        .branches
                        .into_iter()
                        .map(|b| Branch {
                            id: b.id,
                            label: b.label,
                            condition: b.condition,
                        })
                        .collect(),
                    actions: data.actions,
                    faqs: data.faqs,
                    objections: data.objections,
                    products: data.products,
                    services: data.services,
                })
            })
            .collect::<Result<Vec<_>, DocumentConversionError>>()?;

        let edges = self
            .edges
            .into_iter()
            .map(|e| Edge {
                id: e.id,
                source: e.source,
                target: e.target,
                source_handle: e.source_handle,
                target_handle: e.target_handle,
            })
            .collect();

        Ok(WorkflowDocument {
            name: self.name,
            description: self.description,
            instructions: self.instructions,
            global_actions: self.global_actions,
            global_faqs: self.global_faqs,
            global_objections: self.global_objections,
            nodes,
            edges,
            entry_position_x: self.entry_position_x,
            entry_position_y: self.entry_position_y,
        })
    }
}
