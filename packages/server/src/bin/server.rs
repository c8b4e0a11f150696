//! Tsudoi chat relay server.
//!
//! Authenticated clients connect over WebSocket, and every chat message is
//! persisted (when the channel asks for it) and fanned out to everyone online.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tsudoi-server
//! cargo run --bin tsudoi-server -- --host 0.0.0.0 --port 3000 --seed seed.json
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use tsudoi_server::{
    config::{SeedData, ServerConfig},
    infrastructure::{
        hub::Hub,
        repository::{
            InMemoryChannelRepository, InMemoryFileRepository, InMemoryMessageRepository,
            InMemorySessionRepository,
        },
    },
    ui::{HandlerSettings, Server},
    usecase::{AuthenticateUseCase, GetFileUseCase, SendMessageUseCase, UploadFileUseCase},
};
use tsudoi_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "tsudoi-server")]
#[command(about = "Real-time chat relay with live fan-out over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// JSON file with the channels and session tokens to load at startup
    #[arg(short = 's', long)]
    seed: Option<PathBuf>,

    /// Frames queued per connection before it is treated as stalled
    #[arg(long, default_value = "64")]
    outbound_buffer: usize,

    /// How long a direct reply may wait for room in a connection's queue
    #[arg(long, default_value = "1000")]
    reply_timeout_ms: u64,

    /// Upper bound on a single message persistence call
    #[arg(long, default_value = "5000")]
    persistence_timeout_ms: u64,

    /// Largest accepted upload body in bytes
    #[arg(long, default_value = "10485760")]
    max_upload_bytes: usize,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    log_level: String,
}

impl From<&Args> for ServerConfig {
    fn from(args: &Args) -> Self {
        Self {
            host: args.host.clone(),
            port: args.port,
            outbound_buffer: args.outbound_buffer,
            reply_timeout: Duration::from_millis(args.reply_timeout_ms),
            persistence_timeout: Duration::from_millis(args.persistence_timeout_ms),
            max_upload_bytes: args.max_upload_bytes,
            ..Self::default()
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ServerConfig::from(&args);
    let seed = match &args.seed {
        Some(path) => match SeedData::load(path) {
            Ok(seed) => seed,
            Err(e) => {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("No seed file given; no channels or sessions are available");
            SeedData::default()
        }
    };

    // Initialize dependencies in order:
    // 1. Repositories
    // 2. Hub
    // 3. UseCases
    // 4. Server

    // 1. Create Repositories (in-memory)
    let channel_repository = Arc::new(InMemoryChannelRepository::with_channels(seed.channels()));
    let session_repository = Arc::new(InMemorySessionRepository::with_sessions(seed.sessions()));
    let message_repository = Arc::new(InMemoryMessageRepository::new());
    let file_repository = Arc::new(InMemoryFileRepository::new());
    tracing::info!(
        "Loaded {} channel(s) and {} session(s)",
        seed.channels.len(),
        seed.sessions.len()
    );

    // 2. Start the Hub
    let (hub, _hub_task) = Hub::spawn(config.hub_command_buffer);

    // 3. Create UseCases
    let authenticate_usecase = Arc::new(AuthenticateUseCase::new(session_repository));
    let send_message_usecase = Arc::new(
        SendMessageUseCase::new(
            channel_repository,
            message_repository,
            Arc::new(hub.clone()),
            Arc::new(SystemClock),
        )
        .with_persistence_timeout(config.persistence_timeout),
    );
    let upload_file_usecase = Arc::new(UploadFileUseCase::new(file_repository.clone()));
    let get_file_usecase = Arc::new(GetFileUseCase::new(file_repository));

    // 4. Create and run the server
    let server = Server::new(
        hub,
        authenticate_usecase,
        send_message_usecase,
        upload_file_usecase,
        get_file_usecase,
        HandlerSettings::from(&config),
    );
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
