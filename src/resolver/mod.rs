//! Merges per-node knowledge collections with the agent-global ones.
//!
//! Precedence rule: global entries keep their original order; a node-local
//! entry sharing an `id` with a global entry replaces it *in place*; remaining
//! node-local entries are appended after the globals. An author can therefore
//! override one global FAQ at a single node without losing the rest.

use ahash::AHashMap;

use crate::document::{Action, Faq, KnowledgeRecord, Objection, Product, Service, WorkflowDocument};

/// The knowledge visible at one node after override resolution.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ResolvedKnowledge {
    pub actions: Vec<Action>,
    pub faqs: Vec<Faq>,
    pub objections: Vec<Objection>,
    pub products: Vec<Product>,
    pub services: Vec<Service>,
}

/// Resolves the knowledge for `node_id`. Pure function of the document and
/// the node id, with no session state, so results can be memoized per node for
/// one document version.
///
/// An unknown node id yields the global collections unchanged; the engine only
/// calls this with ids taken from the document itself.
pub fn resolve(document: &WorkflowDocument, node_id: &str) -> ResolvedKnowledge {
    let node = document.node_by_id(node_id);
    ResolvedKnowledge {
        actions: merge(
            &document.global_actions,
            node.map(|n| n.actions.as_slice()).unwrap_or(&[]),
        ),
        faqs: merge(
            &document.global_faqs,
            node.map(|n| n.faqs.as_slice()).unwrap_or(&[]),
        ),
        objections: merge(
            &document.global_objections,
            node.map(|n| n.objections.as_slice()).unwrap_or(&[]),
        ),
        // Products and services have no global collections.
        products: node.map(|n| n.products.clone()).unwrap_or_default(),
        services: node.map(|n| n.services.clone()).unwrap_or_default(),
    }
}

/// Override-by-identity merge: globals in original order, node-local records
/// replacing same-id globals in place, the rest appended in node order.
fn merge<K: KnowledgeRecord + Clone>(globals: &[K], locals: &[K]) -> Vec<K> {
    let mut merged = Vec::with_capacity(globals.len() + locals.len());
    for global in globals {
        match locals.iter().find(|l| l.id() == global.id()) {
            Some(local) => merged.push(local.clone()),
            None => merged.push(global.clone()),
        }
    }
    for local in locals {
        if !globals.iter().any(|g| g.id() == local.id()) {
            merged.push(local.clone());
        }
    }
    merged
}

/// Caches [`resolve`] results per node id against one document. Useful for a
/// session that revisits nodes (loops, retries) within a single document
/// version; a new document version needs a new resolver.
pub struct MemoizedResolver<'a> {
    document: &'a WorkflowDocument,
    cache: AHashMap<String, ResolvedKnowledge>,
}

impl<'a> MemoizedResolver<'a> {
    pub fn new(document: &'a WorkflowDocument) -> Self {
        Self {
            document,
            cache: AHashMap::new(),
        }
    }

    pub fn resolve(&mut self, node_id: &str) -> &ResolvedKnowledge {
        if !self.cache.contains_key(node_id) {
            let resolved = resolve(self.document, node_id);
            self.cache.insert(node_id.to_string(), resolved);
        }
        &self.cache[node_id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Node;

    fn faq(id: &str, question: &str, answer: &str) -> Faq {
        Faq {
            id: id.to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }

    #[test]
    fn test_node_local_override_keeps_global_position() {
        let document = WorkflowDocument {
            global_faqs: vec![
                faq("f1", "Opening hours?", "9 to 5"),
                faq("f2", "Delivery time?", "Two days"),
            ],
            nodes: vec![Node {
                id: "n1".to_string(),
                faqs: vec![faq("f2", "Delivery time?", "Same day at this step")],
                ..Node::default()
            }],
            ..WorkflowDocument::default()
        };

        let resolved = resolve(&document, "n1");
        assert_eq!(resolved.faqs.len(), 2);
        assert_eq!(resolved.faqs[0].id, "f1");
        assert_eq!(resolved.faqs[1].id, "f2");
        assert_eq!(resolved.faqs[1].answer, "Same day at this step");
    }

    #[test]
    fn test_node_local_additions_append_after_globals() {
        let document = WorkflowDocument {
            global_faqs: vec![faq("f1", "Opening hours?", "9 to 5")],
            nodes: vec![Node {
                id: "n1".to_string(),
                faqs: vec![faq("f9", "Step-specific?", "Yes")],
                ..Node::default()
            }],
            ..WorkflowDocument::default()
        };

        let resolved = resolve(&document, "n1");
        assert_eq!(resolved.faqs.len(), 2);
        assert_eq!(resolved.faqs[0].id, "f1");
        assert_eq!(resolved.faqs[1].id, "f9");
    }

    #[test]
    fn test_unknown_node_yields_globals_only() {
        let document = WorkflowDocument {
            global_faqs: vec![faq("f1", "Opening hours?", "9 to 5")],
            ..WorkflowDocument::default()
        };

        let resolved = resolve(&document, "missing");
        assert_eq!(resolved.faqs.len(), 1);
        assert!(resolved.products.is_empty());
    }

    #[test]
    fn test_memoized_resolver_matches_plain_resolve() {
        let document = WorkflowDocument {
            global_faqs: vec![faq("f1", "Opening hours?", "9 to 5")],
            nodes: vec![Node {
                id: "n1".to_string(),
                ..Node::default()
            }],
            ..WorkflowDocument::default()
        };

        let mut memoized = MemoizedResolver::new(&document);
        let first = memoized.resolve("n1").clone();
        let second = memoized.resolve("n1").clone();
        assert_eq!(first, second);
        assert_eq!(first, resolve(&document, "n1"));
    }
}
