use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;

use quip_bot::application::errors::BotError;
use quip_bot::application::messaging::ResponseSender;
use quip_bot::application::services::{CommandService, MessageService};
use quip_bot::domain::traits::Platform;
use quip_bot::infrastructure::adapters::console::{ConsoleAdapter, CONSOLE_CHANNEL};
use quip_bot::infrastructure::clock::{SystemClock, TokioSleeper};
use quip_bot::infrastructure::config::Config;
use quip_bot::infrastructure::database::SqliteStore;
use quip_bot::infrastructure::resources::FileResources;

#[derive(Parser)]
#[command(name = "quip-bot")]
#[command(about = "A chat bot for quotes, definitions and emotes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
    /// React to one message until the platform refuses, pruning unknown emoji
    PurgeEmoji {
        /// Channel of the target message
        #[arg(long, default_value = CONSOLE_CHANNEL)]
        channel: String,
        /// Timestamp of the target message
        #[arg(long)]
        timestamp: String,
    },
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => run_bot(&cli.config),
        Commands::Version => {
            println!("quip-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(&cli.config),
        Commands::PurgeEmoji { channel, timestamp } => purge_emoji(&cli.config, &channel, &timestamp),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(config_path: &str) -> Config {
    if std::path::Path::new(config_path).exists() {
        match Config::load(config_path) {
            Ok(mut config) => {
                config.apply_env();
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Config::load_env()
            }
        }
    } else {
        Config::load_env()
    }
}

fn init_config(config_path: &str) -> Result<(), BotError> {
    if std::path::Path::new(config_path).exists() {
        println!("{} already exists, leaving it alone", config_path);
        return Ok(());
    }
    Config::default().save(config_path)?;
    println!("Wrote default config to {}", config_path);
    Ok(())
}

/// Collaborators shared by every subcommand that talks to the platform
struct Wiring {
    platform: Arc<ConsoleAdapter>,
    commands: CommandService,
    outbound: tokio::sync::mpsc::UnboundedReceiver<quip_bot::domain::entities::OutboundMessage>,
}

fn wire(config: &Config) -> Result<Wiring, BotError> {
    let platform = Arc::new(ConsoleAdapter::new(&config.bot.name));
    let store = Arc::new(SqliteStore::new(&config.storage.database)?);
    tracing::info!("Database initialized at {}", config.storage.database.display());
    let resources = Arc::new(FileResources::new(&config.resources.emotes, &config.resources.emoji));
    let (sender, outbound) = ResponseSender::channel();

    let commands = CommandService::new(
        platform.clone(),
        store,
        resources,
        sender,
        Arc::new(SystemClock),
    );
    Ok(Wiring {
        platform,
        commands,
        outbound,
    })
}

fn run_bot(config_path: &str) -> Result<(), BotError> {
    let config = load_config(config_path);
    tracing::info!("Starting {}", config.bot.name);

    let rt = tokio::runtime::Runtime::new().map_err(|e| BotError::Internal(e.to_string()))?;
    rt.block_on(async {
        let Wiring {
            platform,
            commands,
            outbound,
        } = wire(&config)?;
        tracing::info!("Bot started: {}", platform.bot_info().name);

        let dispatcher = Arc::new(commands.build_dispatcher(&config.dispatch).await?);
        tracing::info!(
            "Rules: {}",
            dispatcher.rule_names().collect::<Vec<_>>().join(", ")
        );
        // The sender inside the handlers keeps the outbound channel open, so
        // drop the service to let the worker finish once dispatch is done.
        drop(commands);

        let worker = tokio::spawn(MessageService::run_outbound(platform.clone(), outbound));

        let (tx, inbound) = tokio::sync::mpsc::unbounded_channel();
        let reader = platform.clone();
        tokio::spawn(async move { reader.read_lines(tx).await });

        let service = MessageService::new(dispatcher);
        let handled = service.run_inbound(inbound).await;
        drop(service);

        let delivered = worker.await.map_err(|e| BotError::Internal(e.to_string()))?;
        tracing::info!("Input closed: {} messages handled, {} responses sent", handled, delivered);
        Ok::<(), BotError>(())
    })
}

fn purge_emoji(config_path: &str, channel: &str, timestamp: &str) -> Result<(), BotError> {
    let config = load_config(config_path);

    let rt = tokio::runtime::Runtime::new().map_err(|e| BotError::Internal(e.to_string()))?;
    rt.block_on(async {
        let Wiring {
            platform,
            commands,
            outbound,
        } = wire(&config)?;
        let worker = tokio::spawn(MessageService::run_outbound(platform, outbound));

        let purge = commands.emoji_purge(
            Arc::new(TokioSleeper),
            Duration::from_millis(config.purge.backoff_ms),
        );
        let report = purge.run(channel, timestamp).await?;
        drop(purge);
        drop(commands);

        worker.await.map_err(|e| BotError::Internal(e.to_string()))?;
        println!(
            "Purge stopped ({:?}) after {} attempts; removed: {}",
            report.stop,
            report.attempts,
            if report.removed.is_empty() {
                "nothing".to_string()
            } else {
                report.removed.join(", ")
            }
        );
        Ok::<(), BotError>(())
    })
}
