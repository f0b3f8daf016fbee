use crate::test_helpers::{DetectorLoader, DetectorProbe};
use api::api_state::ApiContext;
use api::serve_on;
use app_state::{
    ApiSettings, AppSettings, DatabaseSettings, HistorySettings, LoggingSettings, ModelSettings,
    ThumbnailSettings, UploadSettings,
};
use color_eyre::eyre::Result;
use common_services::database::get_db_pool;
use ml_analysis::ModelLifecycle;
use reqwest::Client;
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// A running server on an ephemeral port with its own database and thumbnail folder.
#[allow(dead_code)]
pub struct TestContext {
    pub pool: SqlitePool,
    pub settings: AppSettings,
    pub http_client: Client,
    pub base_url: String,
    pub models: Arc<ModelLifecycle>,
    pub probe: Arc<DetectorProbe>,
    // Private fields for cleanup on Drop
    data_dir: TempDir,
    shutdown: Option<oneshot::Sender<()>>,
    api_handle: JoinHandle<()>,
}

impl TestContext {
    /// Loads the model through `loader`, then starts the API.
    pub async fn new(loader: DetectorLoader, probe: Arc<DetectorProbe>) -> Result<Self> {
        info!("Setting up test environment...");
        let data_dir = tempfile::tempdir()?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let base_url = format!("http://{addr}");
        let settings = test_settings(&data_dir, addr.port());

        let pool = get_db_pool(&settings.database).await?;

        let models = Arc::new(ModelLifecycle::new());
        let state = models.load(loader).await?;
        info!("Test model finished loading in state {state}");

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let api_state = ApiContext::new(pool.clone(), settings.clone(), Arc::clone(&models));
        let api_handle = tokio::spawn(async move {
            let shutdown_signal = async move {
                shutdown_rx.await.ok();
            };
            if let Err(e) = serve_on(listener, api_state, shutdown_signal).await {
                error!("Test API server failed: {e:?}");
            }
        });

        Ok(Self {
            pool,
            settings,
            http_client: Client::new(),
            base_url,
            models,
            probe,
            data_dir,
            shutdown: Some(shutdown),
            api_handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }
        self.api_handle.abort();
    }
}

fn test_settings(data_dir: &TempDir, port: u16) -> AppSettings {
    AppSettings {
        api: ApiSettings {
            host: "127.0.0.1".to_string(),
            port,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            tls: None,
        },
        database: DatabaseSettings {
            url: format!("sqlite://{}", data_dir.path().join("detections.db").display()),
            max_connections: 8,
            min_connections: 1,
            acquire_timeout: 10,
            busy_timeout: 5,
        },
        upload: UploadSettings::default(),
        thumbnails: ThumbnailSettings {
            folder: data_dir.path().join("thumbnails"),
            ..ThumbnailSettings::default()
        },
        model: ModelSettings::default(),
        history: HistorySettings::default(),
        logging: LoggingSettings {
            level: "debug".to_string(),
        },
    }
}
