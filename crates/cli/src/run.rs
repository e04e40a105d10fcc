//! `frontand run`: collect inputs, submit, and print the result view.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;
use frontand_api::WorkflowClient;
use frontand_engine::{
    ExecutionSession, FormState, ProgressEstimator, ProgressTicker, ResultView, ShapeOptions, ShaperRegistry,
    WorkflowCatalog, WorkflowExecutor, render_result,
};
use frontand_types::{FieldKind, WorkflowDefinition};
use frontand_util::FrontandConfig;
use tracing::info;

/// Widest cell printed in terminal tables.
const MAX_CELL_WIDTH: usize = 48;

const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Workflow id (see `frontand list`)
    workflow: String,
    /// Field value as `id=value`; multiselect values are comma separated
    #[arg(long = "set", value_name = "ID=VALUE", value_parser = parse_assignment)]
    values: Vec<(String, String)>,
    /// File for a csv, file or image field as `id=path`
    #[arg(long = "file", value_name = "ID=PATH", value_parser = parse_assignment)]
    files: Vec<(String, String)>,
    /// Process only a small sample of the input
    #[arg(long)]
    test_mode: bool,
    /// Let the backend enrich rows with web search
    #[arg(long)]
    search: bool,
    /// Print the request body instead of sending it
    #[arg(long)]
    dry_run: bool,
    /// Write the result table as CSV; without a path a dated file name is used
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "")]
    export_csv: Option<PathBuf>,
    /// Save an image result to this path
    #[arg(long, value_name = "PATH")]
    download_image: Option<PathBuf>,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (id, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=VALUE, got '{}'", raw))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing field id in '{}'", raw));
    }
    Ok((id.to_string(), value.to_string()))
}

pub async fn run_workflow(config: &FrontandConfig, catalog: &WorkflowCatalog, args: RunArgs) -> Result<()> {
    let workflow = catalog.require(&args.workflow)?;
    let form = collect_inputs(workflow, &args).await?;
    let options = ShapeOptions {
        test_mode: args.test_mode,
        enable_search: args.search,
        batch_size: config.default_batch_size,
    };

    let client = WorkflowClient::new(config.request_timeout())?;
    let executor = WorkflowExecutor::new(Arc::new(client.clone()), ShaperRegistry::default());

    if args.dry_run {
        let body = executor.prepare(workflow, form.values(), &options)?;
        println!("POST {}", workflow.endpoint);
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    let session = ExecutionSession::new();
    let (ticker, mut progress) = ProgressTicker::start(ProgressEstimator::default(), PROGRESS_INTERVAL);
    let printer = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let estimate = *progress.borrow_and_update();
            eprint!("\rWorking… {:>3.0}% ({})", estimate.percent, estimate.label());
            let _ = std::io::stderr().flush();
            if estimate.complete {
                break;
            }
        }
        eprintln!();
    });

    let outcome = tokio::select! {
        outcome = session.submit(&executor, workflow, form.values(), &options) => outcome,
        _ = tokio::signal::ctrl_c() => {
            ticker.cancel();
            printer.abort();
            eprintln!();
            bail!("interrupted");
        }
    };
    ticker.complete();
    let _ = printer.await;

    let result = outcome?;
    info!(workflow = %workflow.id, elapsed_ms = result.elapsed_ms, "result received");

    let view = render_result(&workflow.output, &result.body);
    print_view(&view);

    if let Some(path) = args.export_csv {
        let ResultView::Table(table) = &view else {
            bail!("only table results can be exported as CSV");
        };
        let path = if path.as_os_str().is_empty() {
            PathBuf::from(table.export_file_name(chrono::Local::now().date_naive()))
        } else {
            path
        };
        tokio::fs::write(&path, table.to_csv())
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Exported {} rows to {}", table.rows.len(), path.display());
    }

    if let Some(path) = args.download_image {
        let ResultView::Image(image) = &view else {
            bail!("the result does not contain an image");
        };
        let bytes = client.download_image(&image.url, &path).await?;
        println!("Saved {} bytes to {}", bytes, path.display());
    }
    Ok(())
}

async fn collect_inputs(workflow: &WorkflowDefinition, args: &RunArgs) -> Result<FormState> {
    let mut form = FormState::new(workflow.fields.clone());
    for (id, value) in &args.values {
        form.set_raw(id, value)
            .with_context(|| format!("invalid value for '{}'", id))?;
    }
    for (id, path) in &args.files {
        let path = frontand_util::expand_tilde(path);
        let is_csv = form.field(id).is_some_and(|field| field.kind == FieldKind::Csv);
        if is_csv {
            form.attach_csv_file(id, &path).await?;
        } else {
            form.attach_file(id, &path).await?;
        }
    }
    Ok(form)
}

fn print_view(view: &ResultView) {
    match view {
        ResultView::Table(table) => {
            if let Some(title) = &table.title {
                println!("{}\n", title);
            }
            print!("{}", table.to_plain_text(MAX_CELL_WIDTH));
            println!("\n{} rows", table.rows.len());
        }
        ResultView::Empty(message) => println!("{}", message),
        ResultView::Json(text) | ResultView::Text(text) => println!("{}", text),
        ResultView::Image(image) => {
            if let Some(title) = &image.title {
                println!("{}", title);
            }
            println!("Image: {}", image.url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_split_on_first_equals() {
        assert_eq!(
            parse_assignment("prompt=a=b"),
            Ok(("prompt".to_string(), "a=b".to_string()))
        );
        assert!(parse_assignment("prompt").is_err());
        assert!(parse_assignment("=value").is_err());
    }
}
