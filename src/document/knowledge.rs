use serde::{Deserialize, Serialize};

/// Flat value records injected into the conversation at each node. Identity is
/// the `id` alone; there are no relationships beyond "belongs to a node or to
/// the document globally".
///
/// All five kinds share the override-by-identity resolution rule, expressed
/// through the [`KnowledgeRecord`] trait.
pub trait KnowledgeRecord {
    fn id(&self) -> &str;
}

/// Something the agent is allowed to do at this point of the conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Action {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// A canned question/answer pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Faq {
    pub id: String,
    pub question: String,
    pub answer: String,
}

/// A known customer concern and the rebuttal the agent should use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Objection {
    pub id: String,
    pub concern: String,
    pub rebuttal: String,
}

/// A product the agent may reference. Node-local only; there is no global
/// product collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// A service the agent may reference. Node-local only, like [`Product`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: String,
}

macro_rules! impl_knowledge_record {
    ( $( $record:ty ),* $(,)? ) => {
        $(
            impl KnowledgeRecord for $record {
                fn id(&self) -> &str {
                    &self.id
                }
            }
        )*
    };
}

impl_knowledge_record!(Action, Faq, Objection, Product, Service);
