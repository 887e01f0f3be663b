//! SeriesQueue - CLI entry point for replaying and inspecting fetch queues

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::info;

use seriesqueue::cli::{Cli, Command};
use seriesqueue::config::Config;
use seriesqueue::queue::{QueueEntry, SeriesQueue, SlotResult};
use seriesqueue::scenario::{Scenario, StepOutcome};
use seriesqueue::strategy::Strategy;

fn setup_logging(verbose: bool) -> Result<()> {
    // Logs go to stderr so stdout stays clean for outcomes
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(strategy = %config.queue.strategy, slot_size = config.slot_size, "sq loaded config");

    match cli.command {
        Command::Run {
            scenario,
            strategy,
            json,
        } => cmd_run(&config, &scenario, strategy, json).await,
        Command::Demo {
            strategy,
            series,
            items,
            slot,
            active,
            index,
        } => cmd_demo(&config, strategy, series, items, slot, active, index).await,
        Command::Strategies => cmd_strategies(&config),
    }
}

/// Replay a scenario file
async fn cmd_run(config: &Config, path: &std::path::Path, strategy: Option<Strategy>, json: bool) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let mut queue_config = scenario.queue_config(&config.queue);
    if let Some(strategy) = strategy {
        queue_config.strategy = strategy;
    }

    let queue = SeriesQueue::new(queue_config.clone());
    let outcomes = scenario.replay(&queue, config.slot_size).await;

    if json {
        for outcome in &outcomes {
            println!("{}", serde_json::to_string(outcome)?);
        }
        return Ok(());
    }

    println!("{} {}", "Strategy:".bold(), queue_config.strategy.to_string().cyan());
    for (step, outcome) in outcomes.iter().enumerate() {
        println!("{:>3} {}", (step + 1).to_string().dimmed(), describe(outcome));
    }
    Ok(())
}

/// Add synthetic series and drain the queue
async fn cmd_demo(
    config: &Config,
    strategy: Option<Strategy>,
    series: usize,
    items: usize,
    slot: Option<usize>,
    active: Option<String>,
    index: Option<usize>,
) -> Result<()> {
    let mut queue_config = config.queue.clone();
    if let Some(strategy) = strategy {
        queue_config.strategy = strategy;
    }
    let slot_size = slot.unwrap_or(config.slot_size).max(1);

    let queue = SeriesQueue::new(queue_config.clone());
    for n in 1..=series {
        let item_ids: Vec<String> = (0..items).map(|i| format!("s{n}-{i}")).collect();
        queue
            .add(&format!("k{n}"), &format!("series-{n}"), "study-1", item_ids.as_slice())
            .await;
    }
    if let Some(active) = active.as_deref() {
        queue.set_active_key(Some(active)).await;
        if index.is_some() {
            queue.set_active_index(index).await;
        }
    }

    println!(
        "{} {} ({} series x {} items, slot {})",
        "Strategy:".bold(),
        queue_config.strategy.to_string().cyan(),
        series,
        items,
        slot_size
    );

    let mut round = 1;
    loop {
        let entries = match queue.pop_slot(slot_size) {
            SlotResult::Ready(entries) => entries,
            SlotResult::NotReady => {
                tokio::task::yield_now().await;
                continue;
            }
        };
        if entries.is_empty() {
            break;
        }
        println!("{:>3} {}", round.to_string().dimmed(), render_slot(&entries));
        round += 1;
    }
    println!("{} Queue drained", "✓".green());
    Ok(())
}

/// List strategies, marking the configured default
fn cmd_strategies(config: &Config) -> Result<()> {
    for strategy in Strategy::ALL {
        let marker = if strategy == config.queue.strategy { "*" } else { " " };
        println!("{} {:<22} {}", marker.green(), strategy.to_string().cyan(), strategy.describe());
    }
    Ok(())
}

fn render_slot(slot: &[QueueEntry]) -> String {
    slot.iter()
        .map(|entry| match entry.original_index() {
            Some(index) => format!("{}#{}", entry.item_id(), index),
            None => entry.item_id().to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn describe(outcome: &StepOutcome) -> String {
    match outcome {
        StepOutcome::Added { key, added: true } => format!("{} {}", "add".green(), key),
        StepOutcome::Added { key, added: false } => {
            format!("{} {} (ignored: key already tracked or no items)", "add".yellow(), key)
        }
        StepOutcome::Removed { key } => format!("{} {}", "remove".red(), key),
        StepOutcome::ActiveKey { key } => format!("{} {}", "active-key".blue(), key.as_deref().unwrap_or("-")),
        StepOutcome::ActiveIndex { index } => format!(
            "{} {}",
            "active-index".blue(),
            index.map(|i| i.to_string()).unwrap_or_else(|| "-".to_string())
        ),
        StepOutcome::Popped { slot } => format!("{} [{}]", "pop".magenta(), render_slot(slot)),
        StepOutcome::NotReady { requested } => format!("{} {} (queue busy)", "pop".yellow(), requested),
        StepOutcome::Status { key, status } => match status {
            Some(progress) => format!("{} {} {}/{}", "status".cyan(), key, progress.remaining, progress.initial),
            None => format!("{} {} done", "status".cyan(), key),
        },
        StepOutcome::Overall { status } => {
            let parts: Vec<String> = status
                .iter()
                .map(|(key, progress)| match progress {
                    Some(progress) => format!("{}={}/{}", key, progress.remaining, progress.initial),
                    None => format!("{}=done", key),
                })
                .collect();
            format!("{} {}", "overall".cyan(), parts.join(" "))
        }
    }
}
