use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use latchkey::{
    build_router, verify_setup, LatchkeyConfig, ReceiverState, RootError, SetupError,
};
use latchkey_client::{HttpBridgeTransport, LockClient, StatusClient};
use latchkey_core::LockTransition;
use latchkey_webhook::{
    ensure_webhook, remove_webhook, EventFlags, MessageVerifier, WebhookRegistry,
};

/// Latchkey: secure client for a local smart-lock bridge
///
/// Lock actions travel as HMAC-signed binary commands; events arrive on
/// an authenticated webhook the tool registers idempotently.
#[derive(Parser, Debug)]
#[command(name = "latchkey", version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a fresh configuration file
    Init {
        /// Bridge host (and optional port) on the local network
        #[arg(long)]
        bridge_address: String,

        /// Base64 webhook API key from the bridge setup flow
        #[arg(long)]
        api_key: String,

        /// Pre-shared key slot on the lock (0-255)
        #[arg(long)]
        local_key_id: u64,

        /// Base64 HMAC secret for the key slot
        #[arg(long)]
        lock_secret: String,

        /// Externally reachable base URL for webhook callbacks
        #[arg(long)]
        callback_base_url: Option<String>,
    },

    /// Check connectivity and credentials against the bridge
    Verify,

    /// Print the current lock/bridge status
    Status,

    /// Open the latch fully
    Open,

    /// Release the night lock
    Unlock,

    /// Engage the night lock
    Lock,

    /// Inspect or clean up webhook registrations on the bridge
    Webhooks {
        #[command(subcommand)]
        action: WebhookCommands,
    },

    /// Register the webhook and receive events until interrupted
    Listen,
}

#[derive(Subcommand, Debug)]
enum WebhookCommands {
    /// List registrations currently on the bridge
    List,
    /// Remove a registration by bridge-assigned id
    Remove {
        id: u64,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("latchkey=debug,latchkey_webhook=debug,latchkey_client=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("latchkey=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn config_path(cli_path: Option<&PathBuf>) -> PathBuf {
    cli_path
        .cloned()
        .unwrap_or_else(LatchkeyConfig::default_config_path)
}

fn load_config(cli_path: Option<&PathBuf>) -> Result<LatchkeyConfig, RootError> {
    LatchkeyConfig::load(&config_path(cli_path))
}

fn transport_for(config: &LatchkeyConfig) -> HttpBridgeTransport {
    HttpBridgeTransport::new(&config.bridge_address)
        .with_timeout(Duration::from_secs(config.command_timeout_secs))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), RootError> {
    match cli.command {
        Commands::Init {
            bridge_address,
            api_key,
            local_key_id,
            lock_secret,
            callback_base_url,
        } => {
            cmd_init(
                cli.config.as_ref(),
                bridge_address,
                api_key,
                local_key_id,
                lock_secret,
                callback_base_url,
            )
            .await
        }
        Commands::Verify => cmd_verify(cli.config.as_ref()).await,
        Commands::Status => cmd_status(cli.config.as_ref()).await,
        Commands::Open => cmd_action(cli.config.as_ref(), Action::Open).await,
        Commands::Unlock => cmd_action(cli.config.as_ref(), Action::Unlock).await,
        Commands::Lock => cmd_action(cli.config.as_ref(), Action::Lock).await,
        Commands::Webhooks { action } => cmd_webhooks(cli.config.as_ref(), action).await,
        Commands::Listen => cmd_listen(cli.config.as_ref()).await,
    }
}

async fn cmd_init(
    cli_path: Option<&PathBuf>,
    bridge_address: String,
    api_key: String,
    local_key_id: u64,
    lock_secret: String,
    callback_base_url: Option<String>,
) -> Result<(), RootError> {
    let config = LatchkeyConfig {
        bridge_address,
        api_key,
        local_key_id,
        lock_secret,
        callback_base_url: callback_base_url.unwrap_or_default(),
        webhook_token: LatchkeyConfig::generate_webhook_token(),
        command_timeout_secs: 300,
        receiver: Default::default(),
    };
    config.validate()?;

    let save_path = config_path(cli_path);
    config.save(&save_path)?;

    println!("Latchkey initialized.");
    println!("  Bridge:  {}", config.bridge_address);
    println!("  Config:  {}", save_path.display());
    if !config.callback_base_url.is_empty() {
        println!("  Webhook: {}", config.callback_url());
    }
    Ok(())
}

async fn cmd_verify(cli_path: Option<&PathBuf>) -> Result<(), RootError> {
    let config = load_config(cli_path)?;
    let transport = transport_for(&config);

    match verify_setup(&transport, &config.api_key()?).await {
        Ok(info) => {
            println!("Bridge reachable, credentials accepted.");
            if let Some(mac) = info.mac {
                println!("  Bridge MAC: {}", mac);
            }
            println!("  Bolt state: {}", info.status.bolt_state());
            Ok(())
        }
        Err(e @ SetupError::CannotConnect(_)) => {
            println!("Cannot connect to the bridge. Check the address and network.");
            Err(e.into())
        }
        Err(e @ SetupError::InvalidAuth) => {
            println!("Connected, but the bridge rejected the API key.");
            Err(e.into())
        }
    }
}

async fn cmd_status(cli_path: Option<&PathBuf>) -> Result<(), RootError> {
    let config = load_config(cli_path)?;
    let transport = transport_for(&config);

    let status = StatusClient::new(&transport).get_status().await?;
    println!("Lock status:");
    println!("  Bolt state: {}", status.bolt_state());
    if let Some(battery) = status.battery_percentage {
        println!("  Battery:    {}%", battery);
    }
    if let Some(wifi) = status.wifi_strength {
        println!("  WiFi:       {} dB", wifi);
    }
    if let Some(ble) = status.ble_strength {
        println!("  BLE:        {} dB", ble);
    }
    Ok(())
}

enum Action {
    Open,
    Unlock,
    Lock,
}

async fn cmd_action(cli_path: Option<&PathBuf>, action: Action) -> Result<(), RootError> {
    let config = load_config(cli_path)?;
    let transport = transport_for(&config);
    let credentials = config.credentials()?;
    let client = LockClient::new(&transport, &credentials);

    match action {
        Action::Open => {
            client.open().await?;
            println!("Latch opened.");
        }
        Action::Unlock => {
            client.unlock().await?;
            println!("Night lock released.");
        }
        Action::Lock => {
            client.lock().await?;
            println!("Night lock engaged.");
        }
    }
    Ok(())
}

async fn cmd_webhooks(
    cli_path: Option<&PathBuf>,
    action: WebhookCommands,
) -> Result<(), RootError> {
    let config = load_config(cli_path)?;
    let transport = transport_for(&config);
    let api_key = config.api_key()?;
    let registry = WebhookRegistry::new(&transport, &api_key);

    match action {
        WebhookCommands::List => {
            let entries = registry.list().await?;
            if entries.is_empty() {
                println!("No webhooks registered.");
            } else {
                println!("Registered webhooks:");
                for entry in entries {
                    println!("  {:>4}  {}", entry.id, entry.url);
                }
            }
        }
        WebhookCommands::Remove { id } => {
            if remove_webhook(&registry, id).await {
                println!("Webhook {} removed.", id);
            } else {
                println!("Webhook {} could not be removed (see logs).", id);
            }
        }
    }
    Ok(())
}

async fn cmd_listen(cli_path: Option<&PathBuf>) -> Result<(), RootError> {
    let config = load_config(cli_path)?;
    if config.callback_base_url.is_empty() || config.webhook_token.is_empty() {
        return Err(RootError::Config(
            "callback_base_url and webhook_token must be set to listen".into(),
        ));
    }

    let transport = transport_for(&config);
    let api_key = config.api_key()?;
    let registry = WebhookRegistry::new(&transport, &api_key);
    let callback_url = config.callback_url();

    // Reconciliation must complete before any delivery is trusted;
    // stale registrations would mean duplicate events.
    let webhook_id = ensure_webhook(&registry, &callback_url, EventFlags::ALL).await?;
    info!(webhook_id, %callback_url, "webhook ready");

    let (tx, mut rx) = tokio::sync::mpsc::channel(64);
    let state = Arc::new(ReceiverState {
        verifier: MessageVerifier::new(api_key.clone())
            .allow_any_timestamp(config.receiver.allow_any_timestamp),
        token: config.webhook_token.clone(),
        events: tx,
    });

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event.lock_transition() {
                Some(LockTransition::Settled(state)) => info!(%state, "lock settled"),
                Some(LockTransition::Moving(target)) => info!(%target, "lock moving"),
                None => info!(
                    battery = ?event.battery_percentage,
                    wifi = ?event.wifi_strength,
                    "telemetry event"
                ),
            }
        }
    });

    let addr = format!("{}:{}", config.receiver.bind, config.receiver.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(RootError::Io)?;
    println!("Receiving events on {} (ctrl-c to stop)", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .map_err(RootError::Io)?;

    // Cleanup is best-effort; the bridge keeps working without it.
    remove_webhook(&registry, webhook_id).await;
    Ok(())
}
