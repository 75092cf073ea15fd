//! Overseer CLI - command line interface for the orchestration server.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;

use overseer_core::TaskReport;

/// Overseer CLI - orchestration management tool
#[derive(Parser)]
#[command(name = "overseer")]
#[command(about = "CLI for the Overseer orchestration server", long_about = None)]
struct Cli {
    /// Server address
    #[arg(short, long, default_value = "http://127.0.0.1:8044")]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a project plan from a JSON file
    #[command(name = "load-plan")]
    LoadPlan {
        /// Path to the plan JSON file
        plan_file: PathBuf,
    },

    /// Run one orchestration cycle (assign the next task)
    Cycle,

    /// Show full project status
    Status,

    /// List all project tasks
    Tasks,

    /// Report a terminal outcome for a task
    Report {
        /// Task ID the report is about
        #[arg(long)]
        task_id: String,

        /// Terminal status: completed or failed
        #[arg(long)]
        status: String,

        /// Executor output
        #[arg(long)]
        output: Option<String>,

        /// Error message for failed tasks
        #[arg(long)]
        error: Option<String>,
    },

    /// Reset a failed task back to pending
    Reset {
        /// Task ID to reset
        id: String,
    },

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let base = cli.addr.trim_end_matches('/').to_owned();

    match cli.command {
        Commands::LoadPlan { plan_file } => {
            let raw = std::fs::read_to_string(&plan_file)?;
            let plan: Value = serde_json::from_str(&raw)?;

            let response = client.post(format!("{}/plan", base)).json(&plan).send().await?;
            if response.status().is_success() {
                let body: Value = response.json().await?;
                println!(
                    "Project plan loaded ({} tasks).",
                    body["tasks"].as_u64().unwrap_or(0)
                );
            } else {
                let body: Value = response.json().await?;
                return Err(format!("Plan rejected: {}", body["error"]).into());
            }
        }

        Commands::Cycle => {
            let response = client.post(format!("{}/cycle", base)).send().await?;
            let body: Value = response.error_for_status()?.json().await?;
            match &body["assigned"] {
                Value::Null => println!("No eligible task remains."),
                task => {
                    println!("Assigned task:");
                    print_task(task);
                }
            }
        }

        Commands::Status => {
            let response = client.get(format!("{}/status", base)).send().await?;
            let body: Value = response.error_for_status()?.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Tasks => {
            let response = client.get(format!("{}/tasks", base)).send().await?;
            let body: Value = response.error_for_status()?.json().await?;
            let tasks = body["tasks"].as_array().cloned().unwrap_or_default();
            println!("{} task(s):", tasks.len());
            for task in &tasks {
                print_task(task);
            }
        }

        Commands::Report {
            task_id,
            status,
            output,
            error,
        } => {
            let report = TaskReport {
                task_id: task_id.into(),
                status,
                output,
                error,
            };
            let response = client
                .post(format!("{}/report", base))
                .json(&report)
                .send()
                .await?;
            let body: Value = response.error_for_status()?.json().await?;
            println!("{}", body["message"].as_str().unwrap_or("Report sent."));
        }

        Commands::Reset { id } => {
            let response = client
                .post(format!("{}/tasks/{}/reset", base, id))
                .send()
                .await?;
            if response.status().is_success() {
                println!("Task {} reset to pending.", id);
            } else {
                let body: Value = response.json().await?;
                return Err(format!("Reset rejected: {}", body["error"]).into());
            }
        }

        Commands::Health => {
            let response = client.get(format!("{}/health", base)).send().await?;
            let body: Value = response.error_for_status()?.json().await?;
            println!("Server status: {}", body["status"].as_str().unwrap_or("unknown"));
        }
    }

    Ok(())
}

fn print_task(task: &Value) {
    println!(
        "  {}  [{}]  {}",
        task["id"].as_str().unwrap_or("?"),
        task["status"].as_str().unwrap_or("?"),
        task["description"].as_str().unwrap_or(""),
    );
    if let Some(error) = task["error"].as_str() {
        println!("      error: {}", error);
    }
}
