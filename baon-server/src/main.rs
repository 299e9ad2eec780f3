use baon_server::core::{self, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment (dotenv, logging)
    dotenv::dotenv().ok();
    core::init_tracing();

    tracing::info!("Baon server starting...");

    let config = Config::from_env();
    let state = AppState::initialize(&config)?;

    core::server::run(config, state).await
}
