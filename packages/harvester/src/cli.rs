//! Command-line interface for the harvester.
//!
//! Envelopes are written to stdout as JSON lines; progress and the final
//! summary go to stderr.

use std::io::{self, BufWriter, Write};

use chrono::{DateTime, Utc};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{parse_from_date, validate_max_items, DEFAULT_MAX_ITEMS};
use crate::error::Result;
use crate::harvester::Pontoon;
use crate::types::Category;

/// Pontoon Harvester - Fetch localization entities and locales from a Pontoon server.
#[derive(Parser)]
#[command(name = "pontoon-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Pontoon server URL (e.g., https://pontoon.mozilla.org)
    pub uri: String,

    /// Locale to fetch entities for (e.g., es)
    pub locale: Option<String>,

    /// Category of records to fetch: entity or locale
    #[arg(long, default_value = "entity")]
    pub category: Category,

    /// Tag attached to every record (default: origin)
    #[arg(long)]
    pub tag: Option<String>,

    /// Only fetch entities changed since this ISO-8601 date
    #[arg(long, value_parser = parse_from_date_arg)]
    pub from_date: Option<DateTime<Utc>>,

    /// Number of entities requested per page
    #[arg(long, default_value_t = DEFAULT_MAX_ITEMS, value_parser = parse_max_items_arg)]
    pub max_items: usize,
}

fn parse_from_date_arg(value: &str) -> std::result::Result<DateTime<Utc>, String> {
    parse_from_date(value).map_err(|e| e.to_string())
}

fn parse_max_items_arg(value: &str) -> std::result::Result<usize, String> {
    let max_items: usize = value.parse().map_err(|e| format!("{e}"))?;
    validate_max_items(max_items).map_err(|e| e.to_string())
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    harvest_command(&cli)
}

/// Build a harvester from the arguments.
pub fn build_harvester(cli: &Cli) -> Result<Pontoon> {
    let mut builder = Pontoon::builder(&cli.uri).max_items(cli.max_items);
    if let Some(locale) = &cli.locale {
        builder = builder.locale(locale);
    }
    if let Some(tag) = &cli.tag {
        builder = builder.tag(tag);
    }
    if let Some(from_date) = cli.from_date {
        builder = builder.from_date(from_date);
    }
    builder.build()
}

/// Execute the harvest and stream envelopes to stdout.
fn harvest_command(cli: &Cli) -> Result<()> {
    let pontoon = build_harvester(cli)?;
    let source = match cli.category {
        Category::Entity => pontoon.origin(),
        Category::Locale => pontoon.uri(),
    };

    eprintln!(
        "{} {} from {}",
        style("Fetching").bold(),
        style(cli.category).cyan(),
        style(source).green()
    );

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let items = match pontoon.fetch(cli.category, None) {
        Ok(items) => items,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    let mut out = BufWriter::new(io::stdout().lock());
    let mut count = 0usize;
    for item in items {
        let envelope = match item {
            Ok(envelope) => envelope,
            Err(e) => {
                pb.finish_and_clear();
                out.flush()?;
                return Err(e);
            }
        };
        serde_json::to_writer(&mut out, &envelope)?;
        writeln!(out)?;
        count += 1;
        pb.set_message(format!("{count} {} records fetched", cli.category));
    }
    out.flush()?;
    pb.finish_and_clear();

    tracing::info!(count, category = %cli.category, "Fetch completed");
    eprintln!(
        "{} {} {} records",
        style("Fetched").green().bold(),
        count,
        cli.category
    );

    Ok(())
}
