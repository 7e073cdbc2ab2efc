use anyhow::{Context, Result};
use deployline::cli::commands::{HistoryCommand, ListCommand, RunCommand, ValidateCommand};
use deployline::cli::output::{
    create_progress_bar, format_diagnostics, format_outcome, format_run_event, format_run_record,
    style, CHECK, CROSS, INFO, WARN,
};
use deployline::cli::{Cli, Command};
use deployline::core::{DeployConfig, DeployRun, RunOutcome, StepKind};
use deployline::execution::{ExecutionEngine, RunEvent};
use deployline::history::{
    create_record, HistoryBackend, InMemoryHistory, RunRecord, SqliteRunStore,
};
use deployline::runner::system::DEFAULT_TIMEOUT_SECS;
use deployline::runner::SystemRunner;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_deploy(cmd).await?,
        Command::Validate(cmd) => validate_config(cmd)?,
        Command::History(cmd) => show_history(cmd).await?,
        Command::List(cmd) => list_pipelines(cmd).await?,
    }

    Ok(())
}

async fn run_deploy(cmd: &RunCommand) -> Result<()> {
    // Load deploy config
    let config =
        DeployConfig::from_file(&cmd.file).context("Failed to load deploy config")?;

    println!("{} Loaded pipeline: {}", INFO, style(&config.name).bold());

    let trigger = cmd.trigger().map_err(|e| anyhow::anyhow!(e))?;
    println!(
        "{} Trigger: {}",
        INFO,
        style(trigger.label()).cyan()
    );

    // Set up history
    let store: Arc<dyn HistoryBackend> = if cmd.no_history {
        Arc::new(InMemoryHistory::new())
    } else {
        Arc::new(SqliteRunStore::with_default_path().await?)
    };

    let timeout_secs = config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
    let mut run = DeployRun::new(config, trigger);

    // Create execution engine
    let runner = SystemRunner::new(timeout_secs);
    let mut engine = ExecutionEngine::new(runner);

    // Cancel at the next step boundary on Ctrl-C
    let interrupt = engine.interrupt_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.store(true, std::sync::atomic::Ordering::SeqCst);
        }
    });

    // Set up event handler for console output
    let progress = create_progress_bar(StepKind::ORDER.len());
    let bar = progress.clone();
    engine.add_event_handler(move |event| {
        bar.println(format_run_event(&event));
        match &event {
            RunEvent::StepStarted { kind } => bar.set_message(kind.label().to_string()),
            // The skipped publish slot still counts toward the bar so an
            // ineligible run finishes at 6/6 rather than stalling at 5/6.
            RunEvent::StepCompleted { .. } | RunEvent::PublishSkipped { .. } => bar.inc(1),
            _ => {}
        }
    });

    // Execute run
    println!();
    let outcome = engine.execute(&mut run).await;
    progress.finish_and_clear();

    // Save to history
    let summary = create_record(&run);
    store.save_run(&summary).await?;
    if !cmd.no_history {
        println!(
            "\n{} Run saved to history (ID: {})",
            INFO,
            style(&summary.run_id.to_string()[..8]).dim()
        );
    }

    // Print final status
    match outcome {
        RunOutcome::Published => {
            println!(
                "\n{} {} {}",
                CHECK,
                style(run.name()).bold(),
                style("published").green()
            );
        }
        RunOutcome::Skipped => {
            println!(
                "\n{} {} completed, publish {}",
                CHECK,
                style(run.name()).bold(),
                style("skipped").cyan()
            );
        }
        RunOutcome::Failed => {
            println!(
                "\n{} {} {}",
                CROSS,
                style(run.name()).bold(),
                style("failed").red()
            );
            if let Some(step) = run.state.failed_step {
                println!("  Failing step: {}", style(step.label()).red());
            }
            if let Some(failure) = &run.state.failure {
                println!("{}", format_diagnostics(failure, 20));
            }
            std::process::exit(1);
        }
    }

    Ok(())
}

fn validate_config(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating deploy configuration...", INFO);

    match DeployConfig::from_file(&cmd.file) {
        Ok(config) => {
            println!("{} Deploy configuration is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!("  Repository: {}", style(&config.repository).cyan());
            println!(
                "  Publish branch: {}",
                style(&config.publish_branch).cyan()
            );
            println!(
                "  Build: {} {}",
                style(&config.build.command).cyan(),
                style(config.build.args.join(" ")).dim()
            );
            println!(
                "  Marker: {} ({})",
                style(&config.marker.file_name).cyan(),
                style(&config.marker.content).dim()
            );
            println!(
                "  Hosting branch: {}",
                style(&config.publish.branch).cyan()
            );

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    }
}

async fn show_history(cmd: &HistoryCommand) -> Result<()> {
    let store = SqliteRunStore::with_default_path().await?;

    // If a specific run ID is requested
    if let Some(run_id_str) = &cmd.run_id {
        let run_id = uuid::Uuid::parse_str(run_id_str).context("Invalid run ID format")?;
        let record = store.load_run(run_id).await?;

        match record {
            Some(record) => {
                print_run_details(&record, cmd.verbose)?;
            }
            None => {
                println!("{} Run not found", WARN);
            }
        }
        return Ok(());
    }

    // List runs for a pipeline or all
    let runs = if let Some(pipeline) = &cmd.pipeline {
        store
            .list_runs(pipeline)
            .await?
            .into_iter()
            .take(cmd.limit)
            .collect()
    } else {
        let pipelines = store.list_pipelines().await?;
        let mut all_runs = Vec::new();
        for pipeline in &pipelines {
            all_runs.extend(store.list_runs(pipeline).await?);
        }
        all_runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        all_runs.into_iter().take(cmd.limit).collect::<Vec<_>>()
    };

    if runs.is_empty() {
        println!("{} No runs found", INFO);
        return Ok(());
    }

    println!("{} Run history (showing latest {}):", INFO, cmd.limit);

    if cmd.json {
        let data = serde_json::json!({ "runs": runs });
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        for record in &runs {
            println!("  {}", format_run_record(record));
        }
    }

    Ok(())
}

async fn list_pipelines(cmd: &ListCommand) -> Result<()> {
    let store = SqliteRunStore::with_default_path().await?;
    let pipelines = store.list_pipelines().await?;

    if pipelines.is_empty() {
        println!("{} No pipelines found in history", INFO);
        return Ok(());
    }

    println!("{} Pipelines in history:", INFO);

    for pipeline in &pipelines {
        let runs = store.list_runs(pipeline).await?;

        if cmd.with_counts {
            let published = runs
                .iter()
                .filter(|r| r.outcome == RunOutcome::Published)
                .count();
            let skipped = runs
                .iter()
                .filter(|r| r.outcome == RunOutcome::Skipped)
                .count();
            let failed = runs
                .iter()
                .filter(|r| r.outcome == RunOutcome::Failed)
                .count();
            println!(
                "  {} ({} runs: {} published, {} skipped, {} failed)",
                style(pipeline).bold(),
                style(runs.len()).cyan(),
                style(published).green(),
                style(skipped).cyan(),
                style(failed).red()
            );
        } else {
            println!("  {}", style(pipeline).bold());
        }
    }

    if cmd.json {
        let mut json_data = Vec::new();
        for pipeline in &pipelines {
            let runs = store.list_runs(pipeline).await.ok();
            json_data.push(serde_json::json!({
                "name": pipeline,
                "run_count": runs.as_ref().map(|r| r.len()).unwrap_or(0)
            }));
        }
        let data = serde_json::json!({ "pipelines": json_data });
        println!("\n{}", serde_json::to_string_pretty(&data)?);
    }

    Ok(())
}

fn print_run_details(record: &RunRecord, verbose: bool) -> Result<()> {
    println!("{} Run Details", INFO);
    println!("  ID: {}", style(record.run_id).cyan());
    println!("  Pipeline: {}", style(&record.pipeline).bold());
    println!("  Trigger: {}", style(&record.trigger).cyan());
    println!("  Outcome: {}", format_outcome(record.outcome));
    println!(
        "  Started: {}",
        style(record.started_at.to_rfc3339()).dim()
    );
    if let Some(completed) = record.completed_at {
        println!("  Completed: {}", style(completed.to_rfc3339()).dim());
        if let Ok(duration) = completed.signed_duration_since(record.started_at).to_std() {
            println!("  Duration: {}", style(format_duration(duration)).dim());
        }
    }
    if let Some(failure) = &record.failure {
        println!("  Failure:");
        for line in format_diagnostics(failure, 10).lines() {
            println!("    {}", line);
        }
    }

    if verbose {
        println!("\n  {}", style("Full details:").bold());
        let json = serde_json::to_string_pretty(record)?;
        for line in json.lines() {
            println!("    {}", line);
        }
    }

    Ok(())
}

fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
