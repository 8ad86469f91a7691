//! Drover CLI - drive a remote computer with an LLM agent
//!
//! Usage:
//!   drover launch <cmd>             Run a free-form instruction
//!   drover scrape --schema <file>   Extract JSON matching a schema file
//!   drover config init              Write the default config file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use drover_agent::{launch, scrape_value, ModelClient, RunOptions, PASSIVE_EXTRACTION_FALLBACK};
use drover_core::{DroverConfig, InstanceSize};
use drover_instance::InstanceClient;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "drover")]
#[command(author, version, about = "Computer-use agent for remote instances")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a free-form instruction and print the agent's final answer
    Launch {
        /// The instruction for the agent to execute
        cmd: String,

        /// URL to open in the instance browser before the agent starts
        #[arg(long)]
        url: Option<String>,

        /// Instance size class (small, medium, large)
        #[arg(long)]
        size: Option<String>,

        /// Iteration cap for the loop; 0 means unbounded
        #[arg(long)]
        max_iterations: Option<usize>,
    },

    /// Run a structured extraction and print the resulting JSON object
    Scrape {
        /// Path to a JSON schema file describing the expected object
        #[arg(long, value_name = "FILE")]
        schema: PathBuf,

        /// Instruction override; defaults to the schema's description
        #[arg(long)]
        cmd: Option<String>,

        /// URL to open in the instance browser before the agent starts
        #[arg(long)]
        url: Option<String>,

        /// Instance size class (small, medium, large)
        #[arg(long)]
        size: Option<String>,

        /// Iteration cap for the loop; 0 means unbounded
        #[arg(long)]
        max_iterations: Option<usize>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write the default configuration to .drover/config.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = DroverConfig::load_or_default(Path::new("."))?;

    match cli.command {
        Commands::Launch {
            cmd,
            url,
            size,
            max_iterations,
        } => cmd_launch(&config, cmd, url, size, max_iterations).await,
        Commands::Scrape {
            schema,
            cmd,
            url,
            size,
            max_iterations,
        } => cmd_scrape(&config, schema, cmd, url, size, max_iterations).await,
        Commands::Config { action } => match action {
            ConfigCommands::Init => cmd_config_init(),
        },
    }
}

async fn cmd_launch(
    config: &DroverConfig,
    cmd: String,
    url: Option<String>,
    size: Option<String>,
    max_iterations: Option<usize>,
) -> Result<()> {
    let (model, instances) = build_clients(config)?;
    let options = build_options(config, url, size, max_iterations)?;

    let answer = launch(&model, &instances, &cmd, options).await?;
    println!("{}", answer);
    Ok(())
}

async fn cmd_scrape(
    config: &DroverConfig,
    schema_path: PathBuf,
    cmd: Option<String>,
    url: Option<String>,
    size: Option<String>,
    max_iterations: Option<usize>,
) -> Result<()> {
    let schema_text = std::fs::read_to_string(&schema_path)
        .with_context(|| format!("Failed to read schema file {}", schema_path.display()))?;
    let schema: serde_json::Value = serde_json::from_str(&schema_text)
        .with_context(|| format!("Schema file {} is not valid JSON", schema_path.display()))?;

    // Same fallback ladder as the typed API: explicit command, then the
    // schema's own description, then passive extraction.
    let command = cmd
        .or_else(|| {
            schema
                .get("description")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| PASSIVE_EXTRACTION_FALLBACK.to_string());

    let (model, instances) = build_clients(config)?;
    let options = build_options(config, url, size, max_iterations)?;

    let value = scrape_value(&model, &instances, &schema, &command, options).await?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    DroverConfig::write_default(Path::new("."))?;
    println!("Wrote .drover/config.toml");
    Ok(())
}

fn build_clients(config: &DroverConfig) -> Result<(ModelClient, InstanceClient)> {
    let api_key = drover_agent::get_api_key(&config.model.api_key_env)?;
    let model = ModelClient::new(config.model.id.clone(), config.model.max_tokens, api_key);
    let instances = InstanceClient::from_config(&config.instance)?;
    Ok((model, instances))
}

fn build_options(
    config: &DroverConfig,
    url: Option<String>,
    size: Option<String>,
    max_iterations: Option<usize>,
) -> Result<RunOptions> {
    let size = match size {
        Some(s) => s
            .parse::<InstanceSize>()
            .map_err(anyhow::Error::msg)?,
        None => InstanceSize::default(),
    };

    Ok(RunOptions {
        url,
        size,
        max_iterations: max_iterations.unwrap_or(config.loop_defaults.max_iterations),
        tools: None,
    })
}
