use room_allocation::config::Config;
use room_allocation::server;
use room_allocation::store::InMemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let store = match &config.data_file {
        Some(path) => InMemoryStore::from_json_file(path)?,
        None => {
            log::warn!("ROOM_ALLOC_DATA_FILE not set, starting with an empty store");
            InMemoryStore::new()
        }
    };

    server::run_server(&config, store).await
}
