use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use storefront_session::config::ConfigError;
use storefront_session::supervisor::LogNavigator;
use storefront_session::{
    ApiClient, ApiError, ClientConfig, FileStore, KeyValueStore, Navigator, SessionError, SessionEvent, SessionEvents,
    SessionStore,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_STORE_PATH: &str = ".storefront-session.json";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "storefront-session", about = "Storefront session and API CLI")]
struct Cli {
    #[arg(long, env = "STOREFRONT_API_URL", default_value = "http://127.0.0.1:5000/api")]
    base_url: String,

    /// Session file; defaults to `STOREFRONT_STORAGE_PATH` or `.storefront-session.json`.
    #[arg(long)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: String,
    },
    Logout,
    Whoami,
    /// Authenticated GET against the API, printing the JSON reply.
    Get {
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let base_url = cli.base_url.clone();
    let config = ClientConfig::from_lookup(|key| match key {
        "STOREFRONT_API_URL" => Some(base_url.clone()),
        _ => std::env::var(key).ok(),
    })?;

    let store_path = cli
        .store
        .or_else(|| config.storage_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));
    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(store_path));
    let events = SessionEvents::new();
    let mut rx = events.subscribe();
    let api = ApiClient::new(&config, storage, events)?;
    let session = SessionStore::new(api.clone());
    session.restore();

    let outcome = run(&cli.command, &session, &api).await;

    // Invalidation is announced, not acted on, by the client.
    while let Ok(event) = rx.try_recv() {
        if let SessionEvent::Invalidated { .. } = event {
            LogNavigator.navigate(&config.login_path);
            eprintln!("session expired; sign in again with `storefront-session login`");
            break;
        }
    }

    outcome
}

async fn run(command: &Command, session: &SessionStore, api: &ApiClient) -> Result<(), CliError> {
    match command {
        Command::Login { email, password } => {
            let identity = session.login(email, password).await?;
            print_json(&serde_json::to_value(identity)?)
        }
        Command::Signup { email, password, name } => {
            let identity = session.signup(email, password, name).await?;
            print_json(&serde_json::to_value(identity)?)
        }
        Command::Logout => {
            session.logout();
            println!("ok");
            Ok(())
        }
        Command::Whoami => {
            let snapshot = session.snapshot();
            print_json(&json!({
                "status": format!("{:?}", snapshot.status).to_ascii_lowercase(),
                "identity": snapshot.identity,
            }))
        }
        Command::Get { path } => {
            let body: Value = api.get_json(path).await?;
            print_json(&body)
        }
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
