use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use frontand_api::WorkflowClient;
use frontand_engine::{
    ShapeError, WorkflowCatalog,
    form::{file_handle_for, read_csv_upload, render_form},
};
use frontand_types::FormValues;
use frontand_util::{FrontandConfig, csv::parse_csv};
use tracing_subscriber::EnvFilter;

mod run;

#[derive(Debug, Parser)]
#[command(name = "frontand", version, about = "Run Front& AI workflows from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List available workflows
    List,
    /// Show the inputs of a workflow
    Describe { workflow: String },
    /// Parse a CSV file and show its headers and row count
    ParseCsv { path: PathBuf },
    /// Run a workflow
    Run(run::RunArgs),
    /// Check that a workflow's backend is reachable
    Health { workflow: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = FrontandConfig::load().context("failed to load configuration")?;
    let catalog = WorkflowCatalog::load(&config)?;

    match cli.command {
        Command::List => list_workflows(&catalog),
        Command::Describe { workflow } => describe_workflow(&catalog, &workflow),
        Command::ParseCsv { path } => parse_csv_file(path).await,
        Command::Run(args) => run::run_workflow(&config, &catalog, args).await,
        Command::Health { workflow } => check_health(&config, &catalog, &workflow).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn list_workflows(catalog: &WorkflowCatalog) -> Result<()> {
    if catalog.is_empty() {
        println!("No workflows configured");
        return Ok(());
    }
    for workflow in catalog.iter() {
        println!(
            "{:<20} {:<16} {}",
            workflow.id,
            workflow.kind.name(),
            workflow.description.as_deref().unwrap_or(workflow.display_title())
        );
    }
    Ok(())
}

fn describe_workflow(catalog: &WorkflowCatalog, id: &str) -> Result<()> {
    let workflow = catalog.require(id)?;
    println!("{}", workflow.display_title());
    if let Some(description) = &workflow.description {
        println!("{}", description);
    }
    println!("endpoint: {}", workflow.endpoint);
    println!("kind:     {}", workflow.kind.name());
    println!();

    for field in render_form(&workflow.fields, &FormValues::new()) {
        let required = if field.required { " (required)" } else { "" };
        println!("{} [{}]{}", field.label, field.id, required);
        println!("  control: {}", serde_json::to_string(&field.control)?);
        if let Some(placeholder) = &field.placeholder {
            println!("  e.g.     {}", placeholder.replace('\n', "\\n"));
        }
        if let Some(help) = &field.help_text {
            println!("  {}", help);
        }
    }
    Ok(())
}

async fn parse_csv_file(path: PathBuf) -> Result<()> {
    let handle = file_handle_for(&path).await?;
    let text = read_csv_upload(&handle).await?;
    let parsed = parse_csv(&text).ok_or(ShapeError::InvalidCsv)?;

    println!("headers: {}", parsed.headers.join(", "));
    println!("rows:    {}", parsed.rows.len());
    Ok(())
}

async fn check_health(config: &FrontandConfig, catalog: &WorkflowCatalog, id: &str) -> Result<()> {
    let workflow = catalog.require(id)?;
    let client = WorkflowClient::new(config.request_timeout())?;
    let status = client
        .health(&workflow.endpoint)
        .await
        .with_context(|| format!("health check for '{}' failed", workflow.id))?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
