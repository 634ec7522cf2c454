//! crewloop - main CLI entry point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use crewloop::agent::{ConversationGraph, NodeEvent, Route, TurnOutcome, TurnReport};
use crewloop::cli::Args;
use crewloop::config::Config;
use crewloop::llm::{OllamaClient, Oracle};
use crewloop::logging::setup_logging;
use crewloop::repl::{InputHandler, LineOutcome, ReplSession};
use crewloop::tools::{ToolDispatcher, Toolbox};
use crewloop::types::Conversation;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbosity().level());

    let config = load_config(&args)?;
    let graph = build_graph(&config).await?;

    // Ctrl-C stops the running turn between steps
    let shutdown = graph.shutdown_signal();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{}", "\nStopping after the current step...".yellow());
            shutdown.request();
        }
    });

    match &args.task {
        Some(task) => run_task(&graph, task).await,
        None => run_repl(graph).await,
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env(|key| std::env::var(key).ok());
    args.apply_to(&mut config);
    Ok(config)
}

async fn build_graph(config: &Config) -> Result<ConversationGraph> {
    let cwd = std::env::current_dir().context("Could not determine current directory")?;
    let workspace = config.workspace_dir(&cwd);
    std::fs::create_dir_all(&workspace)
        .with_context(|| format!("Failed to create workspace {}", workspace.display()))?;

    let client = OllamaClient::with_options(config.ollama_options())?;
    if !client.health_check().await? {
        eprintln!("{}", format!("Ollama is not reachable at {}", client.base_url()).red());
        eprintln!("   Start it with: ollama serve");
        anyhow::bail!("Ollama not running");
    }

    match client.has_model().await {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("{}", format!("Model '{}' is not pulled yet", client.model()).yellow());
            eprintln!("   Pull it with: ollama pull {}", client.model());
        }
        Err(e) => warn!(error = %e, "could not list models"),
    }

    info!(
        model = %client.model(),
        workspace = %workspace.display(),
        "crew ready"
    );

    let toolbox = Toolbox::for_workspace(config.tool_context(workspace))?;
    let graph = ConversationGraph::standard(
        Arc::new(client),
        ToolDispatcher::new(Arc::new(toolbox)),
        config.agent.max_iterations,
    )
    .with_max_steps(config.agent.max_graph_steps);

    Ok(graph)
}

async fn run_task(graph: &ConversationGraph, task: &str) -> Result<()> {
    let mut conversation = Conversation::new();
    let report = graph.run_turn_with(&mut conversation, task, print_event).await?;
    print_report(&report);
    Ok(())
}

async fn run_repl(graph: ConversationGraph) -> Result<()> {
    let history = dirs::home_dir().map(|home| home.join(".crewloop").join("history"));
    let mut input = match history {
        Some(path) => InputHandler::with_history(path)?,
        None => InputHandler::new()?,
    };

    println!("{}", "crewloop interactive session".bold());
    println!("Crew: {}. Type 'quit' to leave.\n", graph.members().join(", "));

    let mut session = ReplSession::new(graph);

    while let Some(line) = input.read_line()? {
        match session.handle_line(&line, print_event).await {
            LineOutcome::Skipped => continue,
            LineOutcome::Exit => break,
            LineOutcome::Turn(report) => print_report(&report),
            LineOutcome::Failed(e) => eprintln!("{}", format!("Error: {}", e).red()),
        }
    }

    input.save_history()?;
    println!("Goodbye!");
    Ok(())
}

fn print_report(report: &TurnReport) {
    match report.outcome {
        TurnOutcome::Finished => println!("{}", "✓ Task finished".green().bold()),
        TurnOutcome::StepLimit => println!(
            "{}",
            format!("Stopped after {} steps without finishing", report.visited.len()).yellow()
        ),
        TurnOutcome::Cancelled => println!("{}", "Turn cancelled".yellow()),
    }
}

fn print_event(event: &NodeEvent) {
    match event {
        NodeEvent::Routed(decision) => {
            let target = match &decision.route {
                Route::Worker(name) => name.cyan().bold(),
                Route::Finish => "FINISH".green().bold(),
            };
            println!("{} → {}", "Supervisor".magenta(), target);
        }
        NodeEvent::Answered(outcome) => {
            let header = format!("[{}]", outcome.worker).cyan().bold();
            println!("\n{} ({} iterations)", header, outcome.iterations);
            if outcome.exhausted {
                println!("{}\n", outcome.answer.yellow());
            } else {
                println!("{}\n", outcome.answer);
            }
        }
    }
}
