use clap::{Parser, Subcommand};
use std::sync::Arc;

use kanban_sync::{
    config::Config, create_router, state::AppState, BoardStore, HttpStore, SyncConfig,
};
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "kanban-sync")]
#[command(version, about = "Kanban board backend and board mirror")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the board backend (the default)
    Serve,
    /// Mirror a running backend and log every board change
    Watch {
        /// Backend base URL, defaults to the local bind address
        base_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kanban_sync=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::Watch { base_url } => {
            let base_url = base_url.unwrap_or_else(|| format!("http://{}", config.bind_addr));
            watch(&config, &base_url).await
        }
    }
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let state = AppState::new(pool);

    if config.seed_default_columns {
        state.columns.seed_defaults().await?;
    }

    let app = create_router(state);

    tracing::info!("Server listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}

/// Mirrors a remote board and logs every change until Ctrl-C.
async fn watch(config: &Config, base_url: &str) -> anyhow::Result<()> {
    let remote = HttpStore::new(base_url, config.remote_timeout)?;
    let (store, sync) = BoardStore::open(Arc::new(remote), SyncConfig::from(config)).await;

    tracing::info!("Watching board at {}", base_url);

    let mut changes = store.subscribe();
    log_board(&store.snapshot());

    loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let board = changes.borrow_and_update().clone();
                log_board(&board);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    sync.shutdown().await;
    Ok(())
}

fn log_board(board: &kanban_sync::BoardState) {
    if let Some(e) = &board.last_error {
        tracing::warn!("Board data may be stale: {}", e);
    }

    for column in &board.columns {
        let cards = board.cards_in_column(column.id);
        tracing::info!("{} ({}): {} cards", column.name, column.color, cards.len());
        for card in cards {
            tracing::info!("  - {} [{}]", card.title, card.labels.join(", "));
        }
    }

    tracing::info!("{} archived cards", board.archived_cards.len());
}
