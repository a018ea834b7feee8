use clap::Parser;
use kaiwa::prelude::*;
use kaiwa::wire::EditorWorkflow;
use std::fs;
use std::io::{self, Write};

/// Validate and exercise conversational workflow documents
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the workflow JSON file
    workflow_path: String,

    /// Parse the file as the visual editor's export format instead of the
    /// canonical document format
    #[arg(short, long)]
    editor: bool,

    /// Walk the conversation interactively after validation
    #[arg(short = 'i', long, help = "Run the conversation in interactive 'human' mode")]
    human: bool,
}

fn main() {
    let cli = Cli::parse();

    let workflow_json = fs::read_to_string(&cli.workflow_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read workflow file '{}': {}",
            &cli.workflow_path, e
        ))
    });

    let document = if cli.editor {
        let editor: EditorWorkflow = serde_json::from_str(&workflow_json).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to parse editor workflow JSON: {}", e))
        });
        editor.into_workflow().unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to convert editor workflow: {}", e))
        })
    } else {
        serde_json::from_str(&workflow_json)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse workflow JSON: {}", e)))
    };

    println!(
        "Loaded workflow '{}' with {} node(s) and {} edge(s)",
        document.name,
        document.nodes.len(),
        document.edges.len()
    );

    match validate(&document) {
        Ok(()) => println!("Validation passed."),
        Err(report) => {
            eprintln!("Validation failed with {} issue(s):", report.len());
            for issue in &report {
                eprintln!("  - {}", issue);
            }
            std::process::exit(1);
        }
    }

    if cli.human {
        run_conversation(&document);
    }
}

/// Walks the workflow from its entry node, printing each emission and
/// prompting on stdin whenever the session suspends.
fn run_conversation(document: &WorkflowDocument) {
    println!("\n--- Kaiwa Interactive Mode ---");

    let engine = Engine::new();
    let mut turn = engine
        .start(document, 0)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to start session: {}", e)));
    print_emissions(&turn.emissions);

    loop {
        match turn.outcome {
            TurnOutcome::Terminated => {
                println!("\nConversation finished.");
                return;
            }
            TurnOutcome::NoBranchMatched if turn.state.awaiting_reply => {
                println!("(no branch matched that reply; try again)");
            }
            TurnOutcome::NoBranchMatched => exit_with_error(
                "no branch matched during auto-advance; the workflow needs a catch-all branch",
            ),
            TurnOutcome::AwaitingReply => {}
        }

        let reply = prompt_for_input("You");
        let next = engine.advance(document, &turn.state, Signal::UserReply(reply));
        turn = match next {
            Ok(next_turn) => next_turn,
            Err(e) => exit_with_error(&format!("Session failed: {}", e)),
        };
        print_emissions(&turn.emissions);
    }
}

fn print_emissions(emissions: &[Emission]) {
    for emission in emissions {
        println!("\n[{}] {}", emission.node_id, emission.instructions);
        for faq in &emission.knowledge.faqs {
            println!("    faq: {} -> {}", faq.question, faq.answer);
        }
        for action in &emission.knowledge.actions {
            println!("    action: {}", action.name);
        }
    }
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str) -> String {
    let mut line = String::new();

    print!("> {}: ", prompt_text);
    io::stdout().flush().unwrap();

    io::stdin()
        .read_line(&mut line)
        .expect("Failed to read line");
    line.trim().to_string()
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
