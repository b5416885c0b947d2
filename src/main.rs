use std::sync::Arc;

use anyhow::Context;

use wallet_api::config::AppConfig;
use wallet_api::db::Database;
use wallet_api::gateway::{self, state::AppState};
use wallet_api::wallet::{BalanceService, PgWalletRepository, RetryCoordinator};

/// Config environment from `--env` / `-e`, default `dev`
fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config =
        AppConfig::load(&env).with_context(|| format!("loading config for env '{}'", env))?;
    if let Some(port) = get_port_override() {
        app_config.server.port = port;
    }
    let _log_guard = wallet_api::logging::init_logging(&app_config);

    tracing::info!(
        "Starting {} {} in {} mode",
        app_config.app,
        env!("BUILD_VERSION"),
        env
    );

    let db = Database::connect(&app_config.database, &app_config.app)
        .await
        .context("connecting to PostgreSQL")?;
    let db = Arc::new(db);

    if app_config.database.run_migrations {
        db.migrate().await.context("running migrations")?;
    }

    let retry = RetryCoordinator::new(app_config.retry.policy());
    let repository = PgWalletRepository::new(db.clone(), retry);
    let service = BalanceService::new(Arc::new(repository), app_config.server.request_timeout());
    let state = Arc::new(AppState::new(Arc::new(service), Some(db.clone())));

    let served = gateway::run_server(&app_config.server, state).await;

    db.close().await;

    served.context("HTTP server failed")
}
