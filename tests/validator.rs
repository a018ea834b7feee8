//! Tests for the graph validator: each document invariant accepted and
//! rejected, plus the legality of cycles and the empty document.
mod common;
use common::*;
use kaiwa::prelude::*;

fn issues_of(document: &WorkflowDocument) -> Vec<ValidationIssue> {
    match validate(document) {
        Ok(()) => Vec::new(),
        Err(report) => report.into_iter().collect(),
    }
}

#[test]
fn test_valid_flow_passes() {
    assert!(validate(&yes_no_flow()).is_ok());
}

#[test]
fn test_empty_document_is_clean() {
    // The canonical empty document is the well-defined degenerate case.
    assert!(validate(&WorkflowDocument::empty()).is_ok());
}

#[test]
fn test_duplicate_node_id() {
    let mut document = yes_no_flow();
    document.nodes.push(say("entry", "again"));
    // The duplicate also counts as a second entry-less node copy, so just
    // assert the uniqueness issue is present.
    assert!(issues_of(&document).iter().any(|i| matches!(
        i,
        ValidationIssue::DuplicateNodeId { node_id } if node_id == "entry"
    )));
}

#[test]
fn test_dangling_edge_endpoints() {
    let document = doc(
        vec![say("entry", ""), end("done")],
        vec![
            edge("entry", "done"),
            edge("ghost", "done"),
            edge("entry", "nowhere"),
        ],
    );
    let issues = issues_of(&document);
    assert!(issues.iter().any(|i| matches!(
        i,
        ValidationIssue::EdgeSourceUnknown { node_id, .. } if node_id == "ghost"
    )));
    assert!(issues.iter().any(|i| matches!(
        i,
        ValidationIssue::EdgeTargetUnknown { node_id, .. } if node_id == "nowhere"
    )));
}

#[test]
fn test_no_entry_node() {
    // A pure two-node cycle: every node has an incoming edge.
    let document = doc(
        vec![say("a", ""), say("b", "")],
        vec![edge("a", "b"), edge("b", "a")],
    );
    assert!(
        issues_of(&document)
            .iter()
            .any(|i| matches!(i, ValidationIssue::NoEntryNode))
    );
}

#[test]
fn test_multiple_entry_nodes() {
    let document = doc(
        vec![say("first", ""), say("second", ""), end("done")],
        vec![edge("first", "done"), edge("second", "done")],
    );
    let issues = issues_of(&document);
    assert!(issues.iter().any(|i| matches!(
        i,
        ValidationIssue::MultipleEntryNodes { node_ids }
            if node_ids.contains(&"first".to_string()) && node_ids.contains(&"second".to_string())
    )));
}

#[test]
fn test_jump_target_counts_as_incoming() {
    // `landing` is only referenced through the jump's target id, with no
    // drawn edge; it must still not qualify as a second entry.
    let document = doc(
        vec![say("entry", ""), jump("hop", "landing"), end("landing")],
        vec![edge("entry", "hop")],
    );
    assert!(validate(&document).is_ok());
}

#[test]
fn test_end_node_with_outgoing_edge() {
    let document = doc(
        vec![say("entry", ""), end("done"), end("extra")],
        vec![edge("entry", "done"), edge("done", "extra")],
    );
    assert!(issues_of(&document).iter().any(|i| matches!(
        i,
        ValidationIssue::EndNodeWithOutgoing { node_id, edge_count: 1 } if node_id == "done"
    )));
}

#[test]
fn test_jump_without_target() {
    let mut hop = node("hop", NodeKind::Jump);
    hop.target_node_id = None;
    let document = doc(vec![say("entry", ""), hop], vec![edge("entry", "hop")]);
    assert!(issues_of(&document).iter().any(|i| matches!(
        i,
        ValidationIssue::JumpWithoutTarget { node_id } if node_id == "hop"
    )));
}

#[test]
fn test_jump_target_unknown() {
    let document = doc(
        vec![say("entry", ""), jump("hop", "nowhere")],
        vec![edge("entry", "hop")],
    );
    assert!(issues_of(&document).iter().any(|i| matches!(
        i,
        ValidationIssue::JumpTargetUnknown { node_id, target_id }
            if node_id == "hop" && target_id == "nowhere"
    )));
}

#[test]
fn test_jump_with_mirroring_edge_is_legal() {
    let document = doc(
        vec![say("entry", ""), jump("hop", "landing"), end("landing")],
        vec![edge("entry", "hop"), edge("hop", "landing")],
    );
    assert!(validate(&document).is_ok());
}

#[test]
fn test_jump_with_stray_edge() {
    let document = doc(
        vec![
            say("entry", ""),
            jump("hop", "landing"),
            end("landing"),
            end("stray"),
        ],
        vec![
            edge("entry", "hop"),
            edge("hop", "stray"),
            edge("entry", "landing"),
        ],
    );
    // `entry` now has two outgoing edges as collateral; the jump issue is the
    // one under test.
    assert!(issues_of(&document).iter().any(|i| matches!(
        i,
        ValidationIssue::JumpWithOutgoingEdges { node_id, .. } if node_id == "hop"
    )));
}

#[test]
fn test_branch_with_too_few_branches() {
    let document = doc(
        vec![
            say("entry", ""),
            branch("decision", &[("only", "*")]),
            end("done"),
        ],
        vec![
            edge("entry", "decision"),
            branch_edge("decision", "only", "done"),
        ],
    );
    assert!(issues_of(&document).iter().any(|i| matches!(
        i,
        ValidationIssue::BranchesTooFew { node_id, count: 1 } if node_id == "decision"
    )));
}

#[test]
fn test_branch_without_matching_edge() {
    let mut document = yes_no_flow();
    document
        .edges
        .retain(|e| e.source_handle.as_deref() != Some("no"));
    assert!(issues_of(&document).iter().any(|i| matches!(
        i,
        ValidationIssue::BranchWithoutEdge { node_id, branch_id }
            if node_id == "decision" && branch_id == "no"
    )));
}

#[test]
fn test_edge_without_matching_branch() {
    let mut document = yes_no_flow();
    document.nodes.push(end("maybe"));
    document
        .edges
        .push(branch_edge("decision", "perhaps", "maybe"));
    assert!(issues_of(&document).iter().any(|i| matches!(
        i,
        ValidationIssue::EdgeWithoutBranch { node_id, handle, .. }
            if node_id == "decision" && handle == "perhaps"
    )));
}

#[test]
fn test_branch_edge_conflict() {
    let mut document = yes_no_flow();
    document.edges.push(branch_edge("decision", "yes", "declined"));
    assert!(issues_of(&document).iter().any(|i| matches!(
        i,
        ValidationIssue::BranchEdgeConflict { node_id, branch_id, edge_count: 2 }
            if node_id == "decision" && branch_id == "yes"
    )));
}

#[test]
fn test_duplicate_branch_id() {
    let mut document = yes_no_flow();
    document.nodes[1].branches.push(Branch {
        id: "yes".to_string(),
        condition: "si".to_string(),
        ..Branch::default()
    });
    assert!(issues_of(&document).iter().any(|i| matches!(
        i,
        ValidationIssue::DuplicateBranchId { node_id, branch_id }
            if node_id == "decision" && branch_id == "yes"
    )));
}

#[test]
fn test_default_with_multiple_edges() {
    let document = doc(
        vec![say("entry", ""), end("left"), end("right")],
        vec![edge("entry", "left"), edge("entry", "right")],
    );
    assert!(issues_of(&document).iter().any(|i| matches!(
        i,
        ValidationIssue::DefaultWithMultipleEdges { node_id, edge_count: 2 } if node_id == "entry"
    )));
}

#[test]
fn test_default_dead_end_is_legal() {
    // Zero outgoing edges on a default node behaves as an implicit end.
    let document = doc(
        vec![say("entry", ""), say("last", "")],
        vec![edge("entry", "last")],
    );
    assert!(validate(&document).is_ok());
}

#[test]
fn test_unreachable_island() {
    let mut document = yes_no_flow();
    document.nodes.push(say("island-a", ""));
    document.nodes.push(say("island-b", ""));
    document.edges.push(edge("island-a", "island-b"));
    document.edges.push(edge("island-b", "island-a"));
    let issues = issues_of(&document);
    for id in ["island-a", "island-b"] {
        assert!(issues.iter().any(|i| matches!(
            i,
            ValidationIssue::UnreachableNode { node_id } if node_id == id
        )));
    }
}

#[test]
fn test_reachable_cycle_is_legal() {
    // default -> default loops are allowed; only unreachability and dangling
    // references are defects.
    let document = doc(
        vec![say("entry", ""), say("ping", ""), ask("pong", "")],
        vec![
            edge("entry", "ping"),
            edge("ping", "pong"),
            edge("pong", "ping"),
        ],
    );
    assert!(validate(&document).is_ok());
}

mod generated {
    //! Property-style check over randomly generated graphs: a well-formed
    //! conversational backbone always validates, and seeding any single
    //! defect class always produces at least the matching issue.
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_backbone(rng: &mut StdRng) -> WorkflowDocument {
        let steps = rng.random_range(2..12);
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        for i in 0..steps {
            let id = format!("step-{}", i);
            nodes.push(if rng.random_bool(0.4) {
                ask(&id, "step")
            } else {
                say(&id, "step")
            });
            if i > 0 {
                edges.push(edge(&format!("step-{}", i - 1), &id));
            }
        }
        nodes.push(branch("decision", &[("yes", "y"), ("no", "*")]));
        edges.push(edge(&format!("step-{}", steps - 1), "decision"));
        for (handle, target) in [("yes", "accepted"), ("no", "declined")] {
            nodes.push(end(target));
            edges.push(branch_edge("decision", handle, target));
        }
        doc(nodes, edges)
    }

    #[test]
    fn test_generated_backbones_validate() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let document = random_backbone(&mut rng);
            assert!(
                validate(&document).is_ok(),
                "backbone with {} nodes failed validation",
                document.nodes.len()
            );
        }
    }

    #[test]
    fn test_seeded_defects_always_reject() {
        let mut rng = StdRng::seed_from_u64(11);
        for round in 0..50 {
            let mut document = random_backbone(&mut rng);
            let expected: fn(&ValidationIssue) -> bool = match round % 5 {
                0 => {
                    document.edges.push(edge("step-0", "nowhere"));
                    |i: &ValidationIssue| matches!(i, ValidationIssue::EdgeTargetUnknown { .. })
                }
                1 => {
                    let clone = document.nodes[0].clone();
                    document.nodes.push(clone);
                    |i: &ValidationIssue| matches!(i, ValidationIssue::DuplicateNodeId { .. })
                }
                2 => {
                    document.nodes.push(say("island-a", ""));
                    document.nodes.push(say("island-b", ""));
                    document.edges.push(edge("island-a", "island-b"));
                    document.edges.push(edge("island-b", "island-a"));
                    |i: &ValidationIssue| matches!(i, ValidationIssue::UnreachableNode { .. })
                }
                3 => {
                    document
                        .edges
                        .retain(|e| e.source_handle.as_deref() != Some("no"));
                    |i: &ValidationIssue| matches!(i, ValidationIssue::BranchWithoutEdge { .. })
                }
                _ => {
                    document.edges.push(edge("step-0", "decision"));
                    |i: &ValidationIssue| {
                        matches!(i, ValidationIssue::DefaultWithMultipleEdges { .. })
                    }
                }
            };
            let issues = issues_of(&document);
            assert!(
                issues.iter().any(expected),
                "round {} did not report the seeded defect: {:?}",
                round,
                issues
            );
        }
    }
}

#[test]
fn test_issues_accumulate() {
    let mut document = yes_no_flow();
    document.nodes.push(say("entry", "dup"));
    document.edges.push(edge("entry", "nowhere"));
    let report = validate(&document).unwrap_err();
    assert!(report.len() >= 2);
    let rendered = report.to_string();
    assert!(rendered.contains("issue(s)"));
    assert!(rendered.contains("entry"));
}
