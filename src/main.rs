use std::sync::Arc;

use chat_relay::auth::DevIdentityVerifier;
use chat_relay::config::AppConfig;
use chat_relay::llm::{ModelRegistry, ProviderRegistry};
use chat_relay::relay::Relay;
use chat_relay::routes::configure_routes;
use chat_relay::state::AppState;
use chat_relay::store::{ChatStore, PgChatStore};
use chat_relay::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    let config = AppConfig::from_env()?;

    let store = PgChatStore::new(config.store.clone()).await?;
    store.init_schema().await?;
    let store: Arc<dyn ChatStore> = Arc::new(store);

    let providers = ProviderRegistry::from_settings(&config.providers)?;
    let relay = Relay::new(ModelRegistry::builtin(), providers, store.clone());
    let verifier = Arc::new(DevIdentityVerifier::new(config.is_development()));

    let routes = configure_routes(AppState::new(relay, store, verifier));

    let addr = config.socket_addr();
    tracing::info!(%addr, environment = %config.environment, "starting server");
    warp::serve(routes).run(addr).await;

    Ok(())
}
