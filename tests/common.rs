//! Common test utilities for building workflow documents.
use kaiwa::prelude::*;

/// A bare node of the given kind.
#[allow(dead_code)]
pub fn node(id: &str, kind: NodeKind) -> Node {
    Node {
        id: id.to_string(),
        kind,
        ..Node::default()
    }
}

/// A non-suspending default step that just emits instructions.
#[allow(dead_code)]
pub fn say(id: &str, instructions: &str) -> Node {
    Node {
        id: id.to_string(),
        instructions: instructions.to_string(),
        ..Node::default()
    }
}

/// A suspending default step: the engine stops here and waits for a reply.
#[allow(dead_code)]
pub fn ask(id: &str, instructions: &str) -> Node {
    Node {
        id: id.to_string(),
        require_user_response: true,
        instructions: instructions.to_string(),
        ..Node::default()
    }
}

#[allow(dead_code)]
pub fn end(id: &str) -> Node {
    node(id, NodeKind::End)
}

#[allow(dead_code)]
pub fn jump(id: &str, target: &str) -> Node {
    Node {
        id: id.to_string(),
        kind: NodeKind::Jump,
        target_node_id: Some(target.to_string()),
        ..Node::default()
    }
}

/// A suspending branch node with `(branch id, condition)` pairs.
#[allow(dead_code)]
pub fn branch(id: &str, branches: &[(&str, &str)]) -> Node {
    Node {
        id: id.to_string(),
        kind: NodeKind::Branch,
        require_user_response: true,
        branches: branches
            .iter()
            .map(|(branch_id, condition)| Branch {
                id: branch_id.to_string(),
                condition: condition.to_string(),
                ..Branch::default()
            })
            .collect(),
        ..Node::default()
    }
}

#[allow(dead_code)]
pub fn edge(source: &str, target: &str) -> Edge {
    Edge {
        id: format!("{}->{}", source, target),
        source: source.to_string(),
        target: target.to_string(),
        ..Edge::default()
    }
}

/// An edge leaving a branch node through the given source handle.
#[allow(dead_code)]
pub fn branch_edge(source: &str, handle: &str, target: &str) -> Edge {
    Edge {
        id: format!("{}:{}->{}", source, handle, target),
        source: source.to_string(),
        target: target.to_string(),
        source_handle: Some(handle.to_string()),
        ..Edge::default()
    }
}

#[allow(dead_code)]
pub fn doc(nodes: Vec<Node>, edges: Vec<Edge>) -> WorkflowDocument {
    WorkflowDocument {
        name: "test".to_string(),
        nodes,
        edges,
        ..WorkflowDocument::default()
    }
}

#[allow(dead_code)]
pub fn faq(id: &str, question: &str, answer: &str) -> Faq {
    Faq {
        id: id.to_string(),
        question: question.to_string(),
        answer: answer.to_string(),
    }
}

/// The yes/no scenario: a greeting auto-chains into a suspending branch whose
/// exits are two distinct end nodes.
///
/// `entry(default) -> decision(branch y/n) -> {yes: accepted(end), no: declined(end)}`
#[allow(dead_code)]
pub fn yes_no_flow() -> WorkflowDocument {
    doc(
        vec![
            say("entry", "Greet the customer"),
            branch("decision", &[("yes", "y"), ("no", "n")]),
            end("accepted"),
            end("declined"),
        ],
        vec![
            edge("entry", "decision"),
            branch_edge("decision", "yes", "accepted"),
            branch_edge("decision", "no", "declined"),
        ],
    )
}
