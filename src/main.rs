use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use weatherchat::{
    ChatController, OpenMeteoClient, Outcome, WeatherChatConfig, logging, terminal, web,
};

#[derive(Parser)]
#[command(name = "weatherchat", version, about = "Chat-style current weather lookup for any city")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat in the terminal (default)
    Chat,
    /// Ask a single question and print the answer
    Ask {
        /// The question, e.g. "weather in Paris"
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Serve the web chat
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = WeatherChatConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    logging::init(&config.logging, cli.verbose)?;
    tracing::debug!(
        "Using config from {}",
        cli.config
            .clone()
            .or_else(WeatherChatConfig::get_config_path)
            .map_or_else(|| "defaults".to_string(), |p| p.display().to_string())
    );

    let client = OpenMeteoClient::new(&config)?;
    let controller = ChatController::new(client.clone(), client, &config.chat);

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => {
            terminal::run(controller).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Ask { text } => ask(controller, &text.join(" ")).await,
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            web::run(&config.server, controller).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn ask(
    mut controller: ChatController<OpenMeteoClient, OpenMeteoClient>,
    text: &str,
) -> Result<ExitCode> {
    let outcome = controller.submit(text).await;
    controller.settle().await;

    for line in controller
        .log()
        .messages()
        .iter()
        .filter_map(terminal::render)
    {
        println!("{line}");
    }

    Ok(match outcome {
        Outcome::Failed => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}
