//! Static checker that proves a document is executable before it is saved or
//! run: referential integrity, entry uniqueness, per-variant shape rules and
//! reachability. Validation is pure and total: it terminates on any input,
//! including cyclic graphs. Cycles themselves are legal; only unreachability
//! and dangling references are defects.

use ahash::AHashSet;
use itertools::Itertools;
use std::collections::VecDeque;

use crate::document::{GraphIndex, Node, NodeKind, WorkflowDocument};
use crate::error::{ValidationIssue, ValidationReport};

/// Checks every document invariant, accumulating all issues instead of
/// stopping at the first one.
///
/// The canonical empty document validates clean: it is the well-defined
/// degenerate case a store hands out for agents that never saved a workflow.
/// Any *non-empty* document must have exactly one entry node.
pub fn validate(document: &WorkflowDocument) -> Result<(), ValidationReport> {
    if document.is_empty() {
        return Ok(());
    }

    let mut issues = Vec::new();

    // Node ids are unique within a document.
    for id in document.nodes.iter().map(|n| n.id.as_str()).duplicates() {
        issues.push(ValidationIssue::DuplicateNodeId {
            node_id: id.to_string(),
        });
    }

    let known: AHashSet<&str> = document.nodes.iter().map(|n| n.id.as_str()).collect();

    // Every edge endpoint references an existing node.
    for edge in &document.edges {
        if !known.contains(edge.source.as_str()) {
            issues.push(ValidationIssue::EdgeSourceUnknown {
                edge_id: edge.id.clone(),
                node_id: edge.source.clone(),
            });
        }
        if !known.contains(edge.target.as_str()) {
            issues.push(ValidationIssue::EdgeTargetUnknown {
                edge_id: edge.id.clone(),
                node_id: edge.target.clone(),
            });
        }
    }

    let index = GraphIndex::new(document);

    // Exactly one node qualifies as the entry.
    let candidates = index.entry_candidates();
    if candidates.is_empty() {
        issues.push(ValidationIssue::NoEntryNode);
    } else if candidates.len() > 1 {
        issues.push(ValidationIssue::MultipleEntryNodes {
            node_ids: candidates.iter().map(|n| n.id.clone()).collect(),
        });
    }

    for node in &document.nodes {
        check_shape(&index, node, &known, &mut issues);
    }

    // Reachability from the entry node, when there is one to start from.
    if let Some(entry) = index.entry() {
        let mut seen: AHashSet<&str> = AHashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        seen.insert(entry.id.as_str());
        queue.push_back(entry.id.as_str());
        while let Some(id) = queue.pop_front() {
            let Some(node) = index.node(id) else {
                continue;
            };
            for successor in index.successors(node) {
                if known.contains(successor) && seen.insert(successor) {
                    queue.push_back(successor);
                }
            }
        }
        for node in &document.nodes {
            if !seen.contains(node.id.as_str()) {
                issues.push(ValidationIssue::UnreachableNode {
                    node_id: node.id.clone(),
                });
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationReport::new(issues))
    }
}

/// Per-variant structural rules, checked against the prebuilt adjacency list.
fn check_shape(
    index: &GraphIndex<'_>,
    node: &Node,
    known: &AHashSet<&str>,
    issues: &mut Vec<ValidationIssue>,
) {
    let outgoing = index.edges_from(&node.id);
    match node.kind {
        NodeKind::End => {
            if !outgoing.is_empty() {
                issues.push(ValidationIssue::EndNodeWithOutgoing {
                    node_id: node.id.clone(),
                    edge_count: outgoing.len(),
                });
            }
        }
        NodeKind::Jump => match node.target_node_id.as_deref() {
            None | Some("") => {
                issues.push(ValidationIssue::JumpWithoutTarget {
                    node_id: node.id.clone(),
                });
            }
            Some(target) if !known.contains(target) => {
                issues.push(ValidationIssue::JumpTargetUnknown {
                    node_id: node.id.clone(),
                    target_id: target.to_string(),
                });
            }
            Some(target) => {
                // The editor may draw a single edge mirroring the jump; any
                // other outgoing edge is a defect.
                let mirrors_jump = outgoing.len() == 1 && outgoing[0].target == target;
                if !outgoing.is_empty() && !mirrors_jump {
                    issues.push(ValidationIssue::JumpWithOutgoingEdges {
                        node_id: node.id.clone(),
                        edge_count: outgoing.len(),
                    });
                }
            }
        },
        NodeKind::Branch => {
            if node.branches.len() < 2 {
                issues.push(ValidationIssue::BranchesTooFew {
                    node_id: node.id.clone(),
                    count: node.branches.len(),
                });
            }
            for id in node.branches.iter().map(|b| b.id.as_str()).duplicates() {
                issues.push(ValidationIssue::DuplicateBranchId {
                    node_id: node.id.clone(),
                    branch_id: id.to_string(),
                });
            }

            let branch_ids: AHashSet<&str> = node.branches.iter().map(|b| b.id.as_str()).collect();
            for branch in &node.branches {
                let claimed = outgoing
                    .iter()
                    .filter(|e| e.source_handle.as_deref() == Some(branch.id.as_str()))
                    .count();
                if claimed == 0 {
                    issues.push(ValidationIssue::BranchWithoutEdge {
                        node_id: node.id.clone(),
                        branch_id: branch.id.clone(),
                    });
                } else if claimed > 1 {
                    issues.push(ValidationIssue::BranchEdgeConflict {
                        node_id: node.id.clone(),
                        branch_id: branch.id.clone(),
                        edge_count: claimed,
                    });
                }
            }
            for edge in outgoing {
                let handle = edge.source_handle.as_deref();
                if !handle.is_some_and(|h| branch_ids.contains(h)) {
                    issues.push(ValidationIssue::EdgeWithoutBranch {
                        node_id: node.id.clone(),
                        edge_id: edge.id.clone(),
                        handle: handle.unwrap_or("(none)").to_string(),
                    });
                }
            }
        }
        NodeKind::Default => {
            // Zero outgoing edges is legal: a dead-end default behaves as an
            // implicit end at traversal time.
            if outgoing.len() > 1 {
                issues.push(ValidationIssue::DefaultWithMultipleEdges {
                    node_id: node.id.clone(),
                    edge_count: outgoing.len(),
                });
            }
        }
    }
}
