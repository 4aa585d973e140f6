use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::clients::{MetadataGateway, TmdbClient};
use crate::config::Config;
use crate::db::Store;
use crate::services::{GenreService, MovieService, PersonService, TmdbMovieService};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reused across provider clients to enable connection pooling.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Filmarr/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Arc<Store>,

    pub gateway: Arc<dyn MetadataGateway>,

    pub movie_service: Arc<dyn MovieService>,

    pub genre_service: Arc<GenreService>,

    pub person_service: Arc<PersonService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.tmdb.request_timeout_seconds)?;
        let gateway = Arc::new(TmdbClient::with_shared_client(http_client, &config.tmdb));
        Self::with_gateway(config, gateway).await
    }

    /// Wires the state around an explicit gateway; tests inject an
    /// in-process fake here.
    pub async fn with_gateway(
        config: Config,
        gateway: Arc<dyn MetadataGateway>,
    ) -> anyhow::Result<Self> {
        let store = Arc::new(
            Store::with_pool_options(
                &config.general.database_path,
                config.general.max_db_connections,
                config.general.min_db_connections,
            )
            .await?,
        );

        let movie_service = Arc::new(TmdbMovieService::new(store.clone(), gateway.clone()))
            as Arc<dyn MovieService + Send + Sync + 'static>;
        let genre_service = Arc::new(GenreService::new(store.clone()));
        let person_service = Arc::new(PersonService::new(store.clone()));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            gateway,
            movie_service,
            genre_service,
            person_service,
        })
    }

    /// Refreshes the local genre reference set from the provider taxonomy.
    /// The catalog write path never creates genres, so a failure here only
    /// means newly imported movies may miss genre links until the next run.
    pub async fn sync_genres(&self) {
        match self.gateway.fetch_genres().await {
            Ok(entries) => {
                if let Err(e) = self.store.seed_genres(&entries).await {
                    warn!("Failed to seed genres: {e}");
                }
            }
            Err(e) => warn!("Failed to fetch genre taxonomy: {e}"),
        }
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
