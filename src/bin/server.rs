use std::{
    fs::OpenOptions,
    net::SocketAddr,
    path::{Path, PathBuf},
    process::exit,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use money_tracker::{
    AppState, CardDeletion, CategoryDeletion, ReferentialPolicy, build_router, get_local_offset,
    graceful_shutdown,
};

/// The web server for money_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: PathBuf,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The local timezone as a canonical timezone name, e.g. "Europe/Moscow".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// What happens to a card's purchases when the card is deleted: orphan, cascade or restrict.
    #[arg(long, default_value_t = CardDeletion::default())]
    card_deletion: CardDeletion,

    /// What happens to tagged purchases when a category is deleted: detach, orphan, cascade or
    /// restrict.
    #[arg(long, default_value_t = CategoryDeletion::default())]
    category_deletion: CategoryDeletion,

    /// File path to write the debug log to.
    #[arg(long, default_value = "debug.log")]
    log_path: PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(&args.log_path);

    if get_local_offset(&args.timezone).is_none() {
        tracing::error!("Invalid timezone {}", args.timezone);
        eprintln!(
            "\"{}\" is not a canonical timezone name, e.g. \"Europe/Moscow\".",
            args.timezone
        );
        exit(1);
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let connection = match Connection::open(&args.db_path) {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not open the database at {:?}: {error}", args.db_path);
            exit(1);
        }
    };

    let policy = ReferentialPolicy {
        card: args.card_deletion,
        category: args.category_deletion,
    };
    tracing::info!(
        "Deleting a card will {} its purchases, deleting a category will {} its purchases",
        policy.card,
        policy.category
    );

    let app_state = match AppState::new(connection, &args.timezone, policy) {
        Ok(app_state) => app_state,
        Err(error) => {
            tracing::error!("Could not initialize the database: {error}");
            exit(1);
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!("HTTP server listening on http://{}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        exit(1);
    }
}

fn setup_logging(log_path: &Path) {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(file) => file,
        Err(error) => {
            eprintln!("Could not create log file {log_path:?}: {error}");
            exit(1);
        }
    };

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged by the route handlers.
        .on_failure(());

    router.layer(tracing_layer)
}
