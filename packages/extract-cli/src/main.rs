mod config;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use knowledge_extraction::fetchers::HttpFetcher;
use knowledge_extraction::refiners::GeminiRefiner;
use knowledge_extraction::searchers::GoogleSearcher;
use knowledge_extraction::{Identity, ResearchReport, Researcher};

use crate::config::{Config, Settings};

/// Research a person on the web and print what can be attributed to them.
#[derive(Parser, Debug)]
#[command(name = "extract", version, about)]
struct Cli {
    /// Person's name
    #[arg(long)]
    name: Option<String>,

    /// University or organization
    #[arg(long)]
    organization: Option<String>,

    /// Department or other sub-unit
    #[arg(long)]
    sub_unit: Option<String>,

    /// Search results to fetch and process
    #[arg(long)]
    max_results: Option<usize>,

    /// JSON file with extraction and research settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Refine the facts with Gemini (needs GEMINI_API_KEY)
    #[arg(long)]
    refine: bool,

    /// Never prompt for missing fields
    #[arg(long)]
    no_prompt: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so --json output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,knowledge_extraction=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let interactive = !cli.no_prompt && std::io::stdin().is_terminal();

    let identity = Identity::new(
        field(cli.name.clone(), "Enter name", interactive)?,
        field(cli.organization.clone(), "Enter university/organization", interactive)?,
        field(cli.sub_unit.clone(), "Enter department/sub-unit", interactive)?,
    );
    if identity.is_empty() {
        println!("No input provided");
        return Ok(());
    }

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(max) = cli.max_results {
        settings.research.max_results = max;
    }
    let config = Config::from_env()?;

    let fetcher = HttpFetcher::new(&settings.research).context("failed to build HTTP client")?;
    let researcher = Researcher::new(GoogleSearcher::new(config.search.clone()), fetcher)
        .with_extraction_config(settings.extraction)
        .with_research_config(settings.research);

    tracing::info!(query = %identity.search_query(), "starting research");
    let mut report = researcher
        .run(&identity)
        .await
        .context("research failed")?;

    if cli.refine {
        match &config.gemini_api_key {
            Some(key) => {
                let mut refiner = GeminiRefiner::new(key.clone());
                if let Some(model) = &config.gemini_model {
                    refiner = refiner.with_model(model.clone());
                }
                report.refine_with(&refiner).await;
            }
            None => tracing::warn!("--refine given but GEMINI_API_KEY is not set"),
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Use the flag value, else prompt (blank allowed), else empty.
fn field(value: Option<String>, prompt: &str, interactive: bool) -> Result<String> {
    if let Some(v) = value {
        return Ok(v.trim().to_string());
    }
    if !interactive {
        return Ok(String::new());
    }
    let input: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(input.trim().to_string())
}

fn heading(title: &str) {
    println!();
    println!("{}", title.bright_cyan().bold());
    println!("{}", "─".repeat(title.chars().count()).bright_cyan());
}

fn print_report(report: &ResearchReport) {
    println!(
        "{} {} processed, {} failed",
        "Pages:".bold(),
        report.pages_processed.to_string().green(),
        report.pages_failed.to_string().red()
    );

    if report.is_empty() {
        println!();
        println!("{}", "No relevant facts found.".yellow());
        return;
    }

    heading("Knowledge base");
    for (category, values) in report.grouped() {
        println!("{}", category.bold());
        for value in values {
            println!("  • {value}");
        }
    }

    heading("Unified facts");
    for fact in &report.unified {
        println!(
            "[{}] {} {}",
            fact.category.bold(),
            fact.value,
            format!(
                "(confidence {}, relevance {}, {} source{})",
                fact.confidence.as_u8(),
                fact.relevance_score,
                fact.source_count(),
                if fact.source_count() == 1 { "" } else { "s" }
            )
            .dimmed()
        );
    }

    heading("Summary");
    println!("{}", report.narrative);

    if let Some(profile) = &report.refined {
        heading("Refined profile");
        match serde_json::to_string_pretty(profile) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::warn!(error = %e, "could not render refined profile"),
        }
    } else if let Some(raw) = &report.raw_refinement {
        heading("Refiner reply (unparsed)");
        println!("{}", raw.dimmed());
    }
}
