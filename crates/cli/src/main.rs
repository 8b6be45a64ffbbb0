use clap::{Parser, Subcommand};
use paintbot::config::{load_config, Settings};
use paintbot::telegram::TelegramClient;

#[derive(Parser)]
#[command(name = "paintbot")]
#[command(about = "Paintbot: Telegram webhook bot that answers names with avatars", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the webhook server. Bot settings come from the config file and BOT_* environment variables (a .env file is loaded first).
    Serve {
        /// Config file path (default: PAINTBOT_CONFIG_PATH or ~/.paintbot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 5000)
        #[arg(long, short)]
        port: Option<u16>,

        /// Bind address (default from config or 127.0.0.1)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Register the webhook (<BOT_URL>/webhook) with Telegram once and exit.
    SetWebhook {
        /// Config file path (default: PAINTBOT_CONFIG_PATH or ~/.paintbot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("failed to load .env: {}", e);
        }
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("paintbot {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve { config, port, bind }) => {
            if let Err(e) = run_serve(config, port, bind).await {
                log::error!("server failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::SetWebhook { config }) => {
            if let Err(e) = run_set_webhook(config).await {
                log::error!("set-webhook failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
    bind: Option<String>,
) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(p) = port {
        config.server.port = p;
    }
    if let Some(b) = bind {
        config.server.bind = b;
    }
    log::info!("starting server on {}:{}", config.server.bind, config.server.port);
    paintbot::server::run_server(config).await
}

async fn run_set_webhook(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let settings = Settings::resolve(&config)?;
    let client = TelegramClient::new(settings.api_base.clone(), settings.token.clone());
    if !paintbot::server::register_webhook(&client, &settings).await {
        anyhow::bail!("webhook setup failed");
    }
    println!("webhook setup ok");
    Ok(())
}
