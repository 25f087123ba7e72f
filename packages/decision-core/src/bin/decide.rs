//! CLI over the decision services.
//!
//! Prints each result as pretty JSON. Without `OPENAI_API_KEY` every
//! command runs its deterministic fallback.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use decision_core::{
    Category, DecisionConfig, DecisionEngine, EntityAttributes, Ngo, OpenAIOracle, Oracle,
    PriorityTier, ScoreResult, UnavailableOracle,
};

#[derive(Parser)]
#[command(name = "decide")]
#[command(about = "Classify, score, match and draft outreach for maternal health partners")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify an organization description
    Classify { description: String },

    /// Score relevance and priority for an entity
    Score {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long, default_value = "")]
        district: String,
        #[arg(long, default_value = "")]
        state: String,
        /// Population reach signal, 0-100
        #[arg(long)]
        population: Option<f64>,
        /// Partnership signal, 0-100
        #[arg(long)]
        partnership: Option<f64>,
    },

    /// Rank NGOs from a JSON corpus against a program description
    Match {
        #[arg(long)]
        program: String,
        /// JSON array of NGOs
        #[arg(long)]
        corpus: PathBuf,
    },

    /// Draft an outreach email
    Outreach {
        #[arg(long)]
        org: String,
        #[arg(long)]
        category: Category,
        #[arg(long, default_value = "")]
        district: String,
    },
}

#[derive(Serialize)]
struct ScoreOutput {
    relevance: ScoreResult,
    priority: ScoreResult,
    tier: PriorityTier,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,decision_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = DecisionConfig::from_env().context("Failed to load configuration")?;

    if config.is_offline() {
        tracing::info!("No OPENAI_API_KEY, running with deterministic fallbacks only");
        run(DecisionEngine::new(UnavailableOracle, config), cli.command).await
    } else {
        let oracle = OpenAIOracle::from_config(&config).context("Failed to configure OpenAI oracle")?;
        run(DecisionEngine::new(oracle, config), cli.command).await
    }
}

async fn run<O: Oracle>(engine: DecisionEngine<O>, command: Commands) -> Result<()> {
    match command {
        Commands::Classify { description } => {
            let result = engine.classify(&description).await?;
            if let Some(reason) = &result.degraded_reason {
                tracing::warn!(reason = %reason, "Classification used fallback");
            }
            print_json(&result)
        }
        Commands::Score {
            name,
            description,
            category,
            district,
            state,
            population,
            partnership,
        } => {
            let mut attributes = EntityAttributes::new(name.unwrap_or_default())
                .with_location(district, state)
                .with_description(description);
            attributes.category = category;
            attributes.population_signal = population;
            attributes.partnership_signal = partnership;

            let scores = engine.score_entity(&attributes).await;
            let tier = PriorityTier::for_score(scores.priority.score);
            print_json(&ScoreOutput {
                relevance: scores.relevance,
                priority: scores.priority,
                tier,
            })
        }
        Commands::Match { program, corpus } => {
            let raw = std::fs::read_to_string(&corpus)
                .with_context(|| format!("Failed to read corpus {}", corpus.display()))?;
            let ngos: Vec<Ngo> = serde_json::from_str(&raw).context("Corpus must be a JSON array of NGOs")?;
            let result = engine.match_ngos(&program, &ngos).await?;
            print_json(&result)
        }
        Commands::Outreach {
            org,
            category,
            district,
        } => {
            let draft = engine.generate_outreach(&org, category, &district).await?;
            print_json(&draft)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{}", json);
    Ok(())
}
