//! Room Relay command-line tool.
//!
//! Talks to the application server that issues room credentials and manages
//! the persisted preferences the relay joins with.
//!
//! # Commands
//!
//! - `config` - show local configuration and the server's `/api/config`
//! - `get <room>` - look up credentials for an existing room
//! - `create <room>` - create a room and print its credentials
//! - `settings show` / `settings set <key> <value>` - inspect or change preferences

#![warn(clippy::pedantic)]

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use common::config::LoggingConfig;
use room_relay::config::Config;
use room_relay::settings::{
    FileSettingsStore, MemorySettingsStore, SettingKey, Settings, SettingsStore, TextDefaults,
};
use room_relay::token_client::{RoomCredentials, RoomTokenClient, TokenClientError};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Room session relay tools", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show configuration and the application server's settings
    Config,

    /// Look up credentials for an existing room
    Get {
        /// Room name
        room: String,
    },

    /// Create a room and print its credentials
    Create {
        /// Room name
        room: String,
    },

    /// Inspect or change persisted preferences
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// List every preference and its current value
    Show,

    /// Change a preference
    Set {
        /// Preference name (e.g. hd_video, preferred_codec, server_address)
        key: String,

        /// New value
        value: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    let settings = open_settings(&config)?;

    init_tracing(&config.logging(settings.is_set(SettingKey::DebugLogging)));
    debug!(target: "relay.cli", ?config, "Configuration loaded");

    match args.command {
        Command::Config => show_config(&config, &settings).await,
        Command::Get { room } => {
            let client = token_client(&config, &settings)?;
            let credentials = client.get_token(&room).await.map_err(explain)?;
            print_credentials(&room, &credentials);
            Ok(())
        }
        Command::Create { room } => {
            let client = token_client(&config, &settings)?;
            if let Err(e) = client.get_config().await {
                warn!(target: "relay.cli", error = %e, "Could not fetch server config, creating without authorization");
            }
            let credentials = client.create_token(&room).await.map_err(explain)?;
            print_credentials(&room, &credentials);
            Ok(())
        }
        Command::Settings { action } => match action {
            SettingsAction::Show => {
                for (key, value) in settings.describe() {
                    println!("{:<22} {:<30} {value}", key.name(), key.label());
                }
                Ok(())
            }
            SettingsAction::Set { key, value } => {
                if config.settings_path.is_none() {
                    warn!(target: "relay.cli", "ROOM_RELAY_SETTINGS_PATH is not set, change will not persist");
                }
                let key: SettingKey = key.parse()?;
                settings.set_from_str(key, &value)?;
                info!(target: "relay.cli", setting = %key, "Setting updated");
                Ok(())
            }
        },
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter.clone().into());
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn open_settings(config: &Config) -> anyhow::Result<Settings> {
    let store: Arc<dyn SettingsStore> = match &config.settings_path {
        Some(path) => Arc::new(
            FileSettingsStore::open(path)
                .with_context(|| format!("Failed to open settings at {}", path.display()))?,
        ),
        None => Arc::new(MemorySettingsStore::new()),
    };

    Ok(Settings::new(
        store,
        TextDefaults {
            server_address: config.app_server_url.clone(),
            user_name: config.server_username.clone(),
            password: config.server_password.clone(),
        },
    ))
}

/// Client for the server chosen in settings, using the stored credentials.
fn token_client(config: &Config, settings: &Settings) -> anyhow::Result<RoomTokenClient> {
    let client = RoomTokenClient::new(
        &settings.text(SettingKey::ServerAddress),
        settings.text(SettingKey::UserName),
        settings.password(),
        config.http_timeout,
    )?;
    debug!(target: "relay.cli", base_url = client.base_url(), "Token client ready");
    Ok(client)
}

async fn show_config(config: &Config, settings: &Settings) -> anyhow::Result<()> {
    println!("{config:#?}");

    let client = token_client(config, settings)?;
    let server = client.get_config().await.map_err(explain)?;
    println!("Application server: {}", client.base_url());
    println!("Realtime host:      {}", server.vcs_host);
    println!("Auth type:          {}", server.auth_type);
    Ok(())
}

fn print_credentials(room: &str, credentials: &RoomCredentials) {
    use common::secret::ExposeSecret;

    println!("Room:   {room}");
    println!("Domain: {}", credentials.domain);
    println!("Token:  {}", credentials.token.expose_secret());
}

fn explain(e: TokenClientError) -> anyhow::Error {
    match e {
        TokenClientError::NotFound => anyhow::anyhow!("Room not found"),
        other => anyhow::Error::new(other).context("Application server request failed"),
    }
}
