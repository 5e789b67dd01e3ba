use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::assistant::InsightEngine;
use crate::completion::ChatClient;
use crate::config::{Config, get_config_dir};
use crate::embeddings::OllamaClient;
use crate::stats::{correlations, detailed_describe, overview, quality_metrics};
use crate::table::{Table, load_path};

const CHAT_HELP: &str = "Ask any question about the data, or use:
  /summary         general insights about the dataset
  /column <name>   analysis of a single column
  exit             leave the session";

/// Print descriptive statistics for a CSV file
#[inline]
pub fn show_stats(path: &Path) -> Result<()> {
    let table = load_table(path)?;
    println!("{}", render_stats(&table));
    Ok(())
}

/// Answer a single question about a CSV file
#[inline]
pub fn ask_question(path: &Path, question: &str) -> Result<()> {
    let engine = load_engine(path)?;
    println!("{}", engine.ask(question));
    Ok(())
}

/// Print model-generated insights about a CSV file
#[inline]
pub fn summarize_file(path: &Path) -> Result<()> {
    let engine = load_engine(path)?;
    println!("{}", engine.summarize());
    Ok(())
}

/// Print a model-generated analysis of one column
#[inline]
pub fn analyze_column(path: &Path, column: &str) -> Result<()> {
    let engine = load_engine(path)?;
    println!("{}", engine.analyze_column(column));
    Ok(())
}

/// Interactive question loop over one CSV file
#[inline]
pub fn chat(path: &Path) -> Result<()> {
    let engine = load_engine(path)?;

    eprintln!("{}", style("💬 Ask questions about your data").bold().cyan());
    eprintln!("{}", CHAT_HELP);
    eprintln!();

    loop {
        let input: String = Input::new()
            .with_prompt("Question")
            .allow_empty(true)
            .interact_text()?;

        let Some(reply) = chat_reply(&engine, &input) else {
            break;
        };
        println!("{}", reply);
        println!();
    }

    Ok(())
}

/// Reply to one line of chat input, `None` when the session should end
fn chat_reply(engine: &InsightEngine, input: &str) -> Option<String> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
        return None;
    }

    let reply = if input == "/help" {
        CHAT_HELP.to_string()
    } else if input == "/summary" {
        engine.summarize()
    } else if let Some(column) = input.strip_prefix("/column") {
        let column = column.trim();
        if column.is_empty() {
            "Usage: /column <name>".to_string()
        } else {
            engine.analyze_column(column)
        }
    } else {
        engine.ask(input)
    };
    Some(reply)
}

fn load_table(path: &Path) -> Result<Table> {
    load_path(path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Load config and data, connect both backends and index the table
fn load_engine(path: &Path) -> Result<InsightEngine> {
    let config = Config::load(get_config_dir()?).context("Failed to load configuration")?;

    // fail before any work when the credential is missing
    let api_key = config.completion.api_key()?;

    let table = load_table(path)?;

    let embedder =
        OllamaClient::new(&config.embedding).context("Failed to create embedding client")?;
    if let Err(e) = embedder.clone().with_retry_attempts(1).health_check() {
        warn!("Embedding server health check failed: {:#}", e);
        eprintln!(
            "{}",
            style(format!("⚠ Warning: embedding server not ready: {:#}", e)).yellow()
        );
    }
    let completer = ChatClient::new(&config.completion, api_key)
        .context("Failed to create chat completion client")?;

    let mut engine = InsightEngine::new(Box::new(embedder), Box::new(completer), &config);

    let spinner = if console::user_attended_stderr() {
        let bar = ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner} Indexing {msg}")
                .expect("style template is valid"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    } else {
        ProgressBar::hidden()
    };
    spinner.set_message(path.display().to_string());

    let status = engine.build_index(table);
    spinner.finish_and_clear();

    info!("{}", status);
    if status.starts_with("Error") {
        eprintln!("{}", style(&status).red());
    } else {
        eprintln!("{}", style(&status).green());
    }

    Ok(engine)
}

/// Overview, column quality, numeric summaries and correlations as text
#[inline]
pub fn render_stats(table: &Table) -> String {
    StatsReport(table).to_string()
}

struct StatsReport<'a>(&'a Table);

impl fmt::Display for StatsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.0;

        let overview = overview(table);
        writeln!(f, "Dataset Overview")?;
        writeln!(f, "  Rows: {}", overview.rows)?;
        writeln!(f, "  Columns: {}", overview.columns)?;
        writeln!(f, "  Missing Values: {}", overview.missing_values)?;
        writeln!(f, "  Duplicate Rows: {}", overview.duplicate_rows)?;
        for (kind, count) in &overview.column_types {
            writeln!(f, "  {} columns: {}", kind, count)?;
        }

        writeln!(f, "\nColumn Quality")?;
        for metrics in quality_metrics(table) {
            writeln!(f, "  {} ({})", metrics.name, metrics.kind)?;
            writeln!(
                f,
                "    Missing: {} ({:.2}%)",
                metrics.missing, metrics.missing_percentage
            )?;
            writeln!(f, "    Unique Values: {}", metrics.unique_values)?;
            writeln!(f, "    Samples: {}", metrics.sample_values.join(", "))?;
            if let Some(numeric) = metrics.numeric {
                writeln!(
                    f,
                    "    Mean: {:.2}  Std: {:.2}  Min: {}  Max: {}",
                    numeric.mean, numeric.std, numeric.min, numeric.max
                )?;
            }
        }

        writeln!(f, "\nNumeric Statistics")?;
        let mut any_numeric = false;
        for column in table.numeric_columns() {
            let Some(detailed) = detailed_describe(column) else {
                continue;
            };
            any_numeric = true;
            writeln!(f, "  {}", column.name())?;
            for line in detailed.to_string().lines() {
                writeln!(f, "    {}", line)?;
            }
        }
        if !any_numeric {
            writeln!(f, "  No numeric columns found in the dataset")?;
        }

        writeln!(f, "\nCorrelations")?;
        match correlations(table) {
            Some(matrix) => {
                let text = matrix.to_string();
                for (position, line) in text.lines().enumerate() {
                    if position > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "  {}", line)?;
                }
                Ok(())
            }
            None => write!(f, "  No numeric columns found for correlation analysis"),
        }
    }
}
