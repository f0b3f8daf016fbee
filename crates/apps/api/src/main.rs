use api::api_state::ApiContext;
use api::serve;
use app_state::load_app_settings;
use color_eyre::Result;
use common_services::database::get_db_pool;
use ml_analysis::{ModelLifecycle, ObjectDetector, YoloDetector};
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let settings = load_app_settings()?;

    let level = &settings.logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "api={level},common_services={level},ml_analysis={level},\
                     generate_thumbnails={level},tower_http=debug"
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = get_db_pool(&settings.database).await?;

    // The server comes up right away and reports 503 until the model is ready.
    let models = Arc::new(ModelLifecycle::new());
    let model_settings = settings.model.clone();
    let loader = Arc::clone(&models);
    tokio::spawn(async move {
        let result = loader
            .load(move || {
                YoloDetector::load(&model_settings)
                    .map(|detector| Box::new(detector) as Box<dyn ObjectDetector>)
            })
            .await;
        if let Err(e) = result {
            error!("Model loading did not run: {e}");
        }
    });

    serve(ApiContext::new(pool, settings, models)).await?;

    Ok(())
}
