mod config;
mod error;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use runtime::{
    Agent, OpenAiBackend, StopSignal, StopTool, Tool, ToolExecution, ToolRegistry, discover_tools,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use config::{API_KEY_ENV, Config};
use error::{Error, Result};

const CONFIG_FILE: &str = "parley.toml";

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "A conversational agent that acts through MCP tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file [default: ./parley.toml]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat,
    /// Run a single turn and print the response
    Ask {
        /// The instruction to carry out
        text: String,
    },
    /// Discover and list available tools
    Tools,
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    match cli.command {
        Some(Commands::Chat) | None => cmd_chat(&config).await,
        Some(Commands::Ask { text }) => cmd_ask(&config, &text).await,
        Some(Commands::Tools) => cmd_tools(&config).await,
    }
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(CONFIG_FILE)?,
    };
    Ok(config.with_env_api_key(std::env::var(API_KEY_ENV).ok()))
}

/// The stop tool plus everything the configured servers offer.
async fn build_registry(config: &Config, stop: &StopSignal) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(StopTool::new(stop.clone())))?;

    let discovered =
        discover_tools(&config.mcp_servers, config.agent.discovery_concurrency).await;
    for tool in discovered {
        let name = tool.name().to_string();
        if let Err(error) = registry.register(tool) {
            tracing::warn!(tool = %name, %error, "skipping tool");
        }
    }
    Ok(registry)
}

async fn build_agent(config: &Config, stop: &StopSignal) -> Result<Agent<OpenAiBackend>> {
    let backend = config.backend()?;
    let registry = build_registry(config, stop).await?;
    Ok(Agent::new(backend, registry).with_config(config.agent.agent_config()))
}

fn print_execution(execution: &ToolExecution) {
    let mark = if execution.success { "ok" } else { "failed" };
    println!("  [{}: {mark}]", execution.display_name);
}

async fn cmd_chat(config: &Config) -> Result<()> {
    println!("parley v{}", env!("CARGO_PKG_VERSION"));

    let stop = StopSignal::new();
    let mut agent = build_agent(config, &stop).await?;

    println!("Model: {}", config.backend.model);
    println!("Tools: {}", agent.tools().names().join(", "));
    println!("Type 'quit' or Ctrl+D to exit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "exit" {
            break;
        }

        let result = agent.run_with(input, &mut print_execution).await;
        if result.is_error {
            eprintln!("\nError: {}\n", result.response);
        } else {
            println!("\n{}\n", result.response);
        }

        if stop.is_requested() {
            break;
        }
    }

    println!("\nSession ended.");
    Ok(())
}

async fn cmd_ask(config: &Config, text: &str) -> Result<()> {
    let stop = StopSignal::new();
    let mut agent = build_agent(config, &stop).await?;

    let result = agent.run_with(text, &mut print_execution).await;
    if result.is_error {
        return Err(Error::Agent(result.response));
    }
    println!("{}", result.response);
    Ok(())
}

async fn cmd_tools(config: &Config) -> Result<()> {
    let registry = build_registry(config, &StopSignal::new()).await?;

    for tool in registry.iter() {
        println!("{} ({})", tool.name(), tool.display_name());
        println!("  {}", tool.description());
        let schema = serde_json::to_string_pretty(&tool.input_json_schema())?;
        for line in schema.lines() {
            println!("    {line}");
        }
        println!();
    }
    Ok(())
}
