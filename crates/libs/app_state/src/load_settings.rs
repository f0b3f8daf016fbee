use crate::{AppSettings, RawSettings};
use color_eyre::eyre::Result;
use std::env;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Loads settings from `config/settings.yaml`, overlaid with the environment.
pub fn load_app_settings() -> Result<AppSettings> {
    load_app_settings_from(Path::new("config/settings.yaml"))
}

/// Loads settings from the given YAML file.
///
/// Precedence, lowest first: the file, `APP__SECTION__KEY` variables, then the bare
/// `DATABASE_URL` and `PORT` variables.
pub fn load_app_settings_from(config_path: &Path) -> Result<AppSettings> {
    // Need to load from dotenv so DATABASE_URL and PORT can come from the .env file.
    dotenv::from_path(".env").ok();
    let config_path = config_path.canonicalize()?;
    debug!("Loading settings from {}", config_path.display());

    let builder = config::Config::builder()
        .add_source(config::File::from(config_path))
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("database.url", env::var("DATABASE_URL").ok())?
        .set_override_option("api.port", env::var("PORT").ok())?;

    let raw_settings = builder.build()?.try_deserialize::<RawSettings>()?;
    let settings = AppSettings::try_from(raw_settings)?;

    fs::create_dir_all(&settings.thumbnails.folder)?;

    Ok(settings)
}
