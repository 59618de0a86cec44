use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use taxflow_application::TaxWorkflow;
use taxflow_core::config::TaxflowConfig;
use taxflow_core::extraction::TaxRegime;
use taxflow_interaction::HttpTaxBackend;

mod commands;
mod completion;
mod display;

use commands::{Command, HELP};
use completion::CommandHelper;
use display::EventPrinter;

#[derive(Parser)]
#[command(name = "taxflow")]
#[command(about = "TaxFlow - review your salary slip, compare regimes and chat with a tax advisor", long_about = None)]
struct Cli {
    /// Backend origin, e.g. http://localhost:8001
    #[arg(long)]
    backend_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Configuration file (defaults to ~/.config/taxflow/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn load_config(&self) -> Result<TaxflowConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = TaxflowConfig::load_from(path)?;
                config.apply_overrides(|key| std::env::var(key).ok())?;
                config
            }
            None => TaxflowConfig::load()?,
        };
        if let Some(url) = &self.backend_url {
            config.backend_url = url.clone();
        }
        if let Some(secs) = self.timeout {
            config.request_timeout_secs = Some(secs);
        }
        Ok(config)
    }
}

/// Entry point for the TaxFlow REPL.
///
/// Network-bound commands run as background tasks so the prompt stays
/// responsive; their results reach the terminal through workflow events.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // ===== Backend Initialization =====
    let backend = Arc::new(HttpTaxBackend::from_config(&config));
    match backend.health_check().await {
        Ok(health) => tracing::info!("[Repl] Backend {} is {}", backend.base_url(), health.status),
        Err(err) => {
            tracing::warn!("[Repl] {} ({:?})", err, err);
            println!(
                "{}",
                format!("{} Is {} running?", err, backend.base_url()).yellow()
            );
        }
    }

    let workflow = TaxWorkflow::new(backend);
    let mut events = workflow.subscribe().await;
    let printer = tokio::spawn(async move {
        let mut printer = EventPrinter::new();
        while let Some(event) = events.recv().await {
            printer.print(&event);
        }
    });

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CommandHelper));

    println!("{}", "=== TaxFlow ===".bright_magenta().bold());
    println!(
        "{}",
        "Type '/upload <path>' to start, '/help' for commands, or 'quit' to exit.".bright_black()
    );
    println!();

    // ===== Main REPL Loop =====
    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let Some(command) = Command::parse(&line) else {
                    continue;
                };
                let _ = rl.add_history_entry(line.as_str());

                if command == Command::Quit {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                dispatch(&workflow, command).await;
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    printer.abort();
    Ok(())
}

async fn dispatch(workflow: &TaxWorkflow, command: Command) {
    match command {
        Command::Upload(path) => {
            let workflow = workflow.clone();
            tokio::spawn(async move {
                let outcome = match path {
                    Some(path) => workflow.upload_file(&path).await,
                    None => workflow.upload(None).await,
                };
                if let Err(err) = outcome {
                    tracing::debug!("[Repl] Upload ended with: {}", err);
                }
            });
        }
        Command::Fields => match workflow.view().await.review {
            Some(form) => display::print_review(&form),
            None => println!("{}", "No review form is open.".bright_black()),
        },
        Command::Set { field, value } => {
            if let Err(err) = workflow.update_field(&field, value).await {
                tracing::debug!("[Repl] Edit rejected: {}", err);
            }
        }
        Command::Regime(name) => match name.parse::<TaxRegime>() {
            Ok(regime) => {
                if let Err(err) = workflow.select_regime(regime).await {
                    tracing::debug!("[Repl] Regime change rejected: {}", err);
                }
            }
            Err(err) => eprintln!("{}", err.to_string().red()),
        },
        Command::Submit => {
            let workflow = workflow.clone();
            tokio::spawn(async move {
                if let Err(err) = workflow.submit_review().await {
                    tracing::debug!("[Repl] Submission ended with: {}", err);
                }
            });
        }
        Command::RetryChat => {
            let workflow = workflow.clone();
            tokio::spawn(async move {
                if let Err(err) = workflow.start_chat().await {
                    tracing::debug!("[Repl] Chat retry ended with: {}", err);
                }
            });
        }
        Command::Chat(text) => {
            let workflow = workflow.clone();
            tokio::spawn(async move {
                if let Err(err) = workflow.send_chat_message(&text).await {
                    tracing::debug!("[Repl] Chat turn ended with: {}", err);
                }
            });
        }
        Command::Status => print_summary(workflow).await,
        Command::Help => println!("{}", HELP.bright_black()),
        Command::Usage(usage) => println!("{}", format!("Usage: {usage}").yellow()),
        Command::Unknown(name) => {
            println!("{}", format!("Unknown command {name}. Try /help.").bright_black())
        }
        Command::Quit => {}
    }
}

async fn print_summary(workflow: &TaxWorkflow) {
    let view = workflow.view().await;
    let snapshot = workflow.snapshot().await;
    let session = match snapshot.session() {
        Some(session) => format!("{} (started {})", session.id, session.created_at),
        None => "none".to_string(),
    };

    println!("{}", format!("Stage:   {}", workflow.stage().await).bright_black());
    println!("{}", format!("Session: {}", session).bright_black());
    if let Some(status) = &view.status {
        display::print_status(status);
    }
    if let Some(comparison) = &view.comparison {
        display::print_comparison(comparison);
    }
}
