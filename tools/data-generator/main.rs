use clap::{Parser, ValueEnum};
use kaiwa::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;

/// Generates workflow documents for exercising the validator: a valid
/// conversational backbone, optionally seeded with one structural defect.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Number of steps in the conversation backbone
    #[arg(short, long, default_value_t = 8)]
    nodes: usize,

    /// Seed one structural defect into the output
    #[arg(short, long, value_enum)]
    defect: Option<DefectKind>,

    /// RNG seed for reproducible output
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output path; stdout when omitted
    #[arg(short, long)]
    output: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DefectKind {
    /// An edge whose target id does not exist
    DanglingEdge,
    /// Two nodes sharing the same id
    DuplicateId,
    /// A node no path reaches
    Orphan,
    /// A second node with no incoming edges
    AmbiguousEntry,
    /// A branch declared without a matching edge
    MissingBranchEdge,
}

fn main() {
    let cli = Cli::parse();
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut document = generate_backbone(&mut rng, cli.nodes.max(3));
    if let Some(defect) = cli.defect {
        seed_defect(&mut document, defect);
    }

    let json = serde_json::to_string_pretty(&document).expect("document serializes");
    match cli.output {
        Some(path) => {
            fs::write(&path, json).unwrap_or_else(|e| {
                eprintln!("Failed to write '{}': {}", path, e);
                std::process::exit(1);
            });
            eprintln!(
                "Wrote {} node(s), {} edge(s) to '{}'",
                document.nodes.len(),
                document.edges.len(),
                path
            );
        }
        None => println!("{}", json),
    }
}

/// A linear chain of default steps with random suspension points, one yes/no
/// branch in the middle and end nodes on both exits.
fn generate_backbone(rng: &mut StdRng, steps: usize) -> WorkflowDocument {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for i in 0..steps {
        nodes.push(Node {
            id: format!("step-{}", i),
            require_user_response: rng.random_bool(0.4),
            instructions: format!("Talk the customer through step {}", i),
            ..Node::default()
        });
        if i > 0 {
            edges.push(Edge {
                id: format!("e-{}-{}", i - 1, i),
                source: format!("step-{}", i - 1),
                target: format!("step-{}", i),
                ..Edge::default()
            });
        }
    }

    // Branch off the last step: accept -> closing end, decline -> farewell end.
    nodes.push(Node {
        id: "decision".to_string(),
        kind: NodeKind::Branch,
        require_user_response: true,
        instructions: "Ask for a decision".to_string(),
        branches: vec![
            Branch {
                id: "accept".to_string(),
                condition: "yes".to_string(),
                ..Branch::default()
            },
            Branch {
                id: "decline".to_string(),
                condition: "*".to_string(),
                ..Branch::default()
            },
        ],
        ..Node::default()
    });
    edges.push(Edge {
        id: "e-into-decision".to_string(),
        source: format!("step-{}", steps - 1),
        target: "decision".to_string(),
        ..Edge::default()
    });
    for (handle, target) in [("accept", "closing"), ("decline", "farewell")] {
        nodes.push(Node {
            id: target.to_string(),
            kind: NodeKind::End,
            ..Node::default()
        });
        edges.push(Edge {
            id: format!("e-{}", handle),
            source: "decision".to_string(),
            target: target.to_string(),
            source_handle: Some(handle.to_string()),
            ..Edge::default()
        });
    }

    WorkflowDocument {
        name: "generated".to_string(),
        nodes,
        edges,
        ..WorkflowDocument::default()
    }
}

fn seed_defect(document: &mut WorkflowDocument, defect: DefectKind) {
    match defect {
        DefectKind::DanglingEdge => document.edges.push(Edge {
            id: "e-dangling".to_string(),
            source: "step-0".to_string(),
            target: "nowhere".to_string(),
            ..Edge::default()
        }),
        DefectKind::DuplicateId => {
            let clone = document.nodes[0].clone();
            document.nodes.push(clone);
        }
        DefectKind::Orphan => {
            // A two-node island: both have incoming edges, neither is
            // reachable from the entry, so only reachability trips.
            for (id, target) in [("orphan-a", "orphan-b"), ("orphan-b", "orphan-a")] {
                document.nodes.push(Node {
                    id: id.to_string(),
                    ..Node::default()
                });
                document.edges.push(Edge {
                    id: format!("e-{}", id),
                    source: id.to_string(),
                    target: target.to_string(),
                    ..Edge::default()
                });
            }
        }
        DefectKind::AmbiguousEntry => {
            document.nodes.push(Node {
                id: "second-entry".to_string(),
                ..Node::default()
            });
            document.edges.push(Edge {
                id: "e-second-entry".to_string(),
                source: "second-entry".to_string(),
                target: "decision".to_string(),
                ..Edge::default()
            });
        }
        DefectKind::MissingBranchEdge => {
            document
                .edges
                .retain(|e| e.source_handle.as_deref() != Some("decline"));
        }
    }
}
