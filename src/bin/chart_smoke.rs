//! Developer smoke tool for the chart inference flows against the live API.
//!
//! Usage:
//!   cargo run --bin chart_smoke -- data "monthly revenue for 6 months"
//!   cargo run --bin chart_smoke -- data "visitors per weekday" --apply
//!   cargo run --bin chart_smoke -- insight
//!   cargo run --bin chart_smoke -- show

use std::sync::Arc;

use anyhow::{Context, Result};
use chart_studio::chart_view::ChartView;
use chart_studio::clients::{GeminiClient, InferenceClient};
use chart_studio::config::Config;
use chart_studio::export::{ExportFormat, export_file_name};
use chart_studio::messages::Operation;
use chart_studio::prompts::PromptRegistry;
use chart_studio::session::Outcome;
use chart_studio::storage::FileStorage;
use chart_studio::store::StateStore;
use chart_studio::synthesis::DataSynthesisService;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chart_smoke")]
#[command(about = "Chart Studio inference smoke checks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a dataset from a description
    Data {
        prompt: String,
        /// Replace the stored chart data with the result
        #[arg(long)]
        apply: bool,
    },
    /// Summarize the stored chart
    Insight,
    /// Print the stored chart state
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("loading chart_studio configuration")?;
    chart_studio::logging::init_tracing(&config.runtime);

    let cli = Cli::parse();
    match cli.command {
        Commands::Data { prompt, apply } => data(&config, &prompt, apply).await,
        Commands::Insight => insight(&config).await,
        Commands::Show => show(&config),
    }
}

async fn data(config: &Config, prompt: &str, apply: bool) -> Result<()> {
    if apply {
        let session = chart_studio::build_gemini_session(config)?;
        match session.generate_data(prompt).await {
            Ok(Outcome::Applied) => {
                let state = session.state().await;
                println!("Applied {} data points", state.data_items.len());
                print_items(&state.data_items);
            }
            Ok(outcome) => println!("Nothing applied ({outcome:?})"),
            Err(e) => {
                eprintln!("{}", e.user_message(config.locale, Operation::GenerateData));
                return Err(e.into());
            }
        }
        return Ok(());
    }

    let client: Arc<dyn InferenceClient> = Arc::new(GeminiClient::from_config(config)?);
    let service = DataSynthesisService::new(client, &config.inference, &PromptRegistry::new())?;
    let items = service.synthesize(prompt).await?;
    println!("Synthesized {} data points (not applied)", items.len());
    print_items(&items);
    Ok(())
}

async fn insight(config: &Config) -> Result<()> {
    let session = chart_studio::build_gemini_session(config)?;
    if let Err(e) = session.generate_insights().await {
        eprintln!("{}", e.user_message(config.locale, Operation::GenerateInsights));
        return Err(e.into());
    }
    println!("{}", session.insight().await.unwrap_or_default());
    Ok(())
}

fn show(config: &Config) -> Result<()> {
    let state = StateStore::open(Box::new(FileStorage::new(&config.storage.dir))).snapshot();
    let options = &state.chart_options;
    println!("Storage: {}", config.storage.dir.display());
    println!(
        "Title: {} | Kind: {} | Color: {}",
        options.title,
        options.chart_type.label(config.locale),
        options.color
    );
    match ChartView::build(&state.data_items, options) {
        ChartView::Empty => println!("{}", ChartView::empty_message(config.locale)),
        ChartView::Ready { points, .. } => print_items(&points),
    }
    println!(
        "Exports: {} / {}",
        export_file_name(&options.title, ExportFormat::Png),
        export_file_name(&options.title, ExportFormat::Pdf)
    );
    Ok(())
}

fn print_items(items: &[chart_studio::model::DataItem]) {
    for item in items {
        println!("  {:<24} {:>14} ({})", item.name, item.value, item.id);
    }
}
