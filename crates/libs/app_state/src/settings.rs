use crate::{
    ApiSettings, DatabaseSettings, HistorySettings, LoggingSettings, ModelSettings, RawSettings,
    ThumbnailSettings, UploadSettings,
};
use serde::Deserialize;
use std::path::{Path, absolute};

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub api: ApiSettings,
    pub database: DatabaseSettings,
    pub upload: UploadSettings,
    pub thumbnails: ThumbnailSettings,
    pub model: ModelSettings,
    pub history: HistorySettings,
    pub logging: LoggingSettings,
}

impl TryFrom<RawSettings> for AppSettings {
    type Error = std::io::Error;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        let thumbnails = ThumbnailSettings {
            folder: absolute(&raw.thumbnails.folder)?,
            ..raw.thumbnails
        };

        Ok(Self {
            api: raw.api,
            database: raw.database,
            upload: raw.upload,
            thumbnails,
            model: raw.model,
            history: raw.history,
            logging: raw.logging,
        })
    }
}

impl ThumbnailSettings {
    /// Full path of a thumbnail file name inside the thumbnail folder.
    ///
    /// Returns `None` for anything that is not a bare file name, so stored references can never
    /// point outside the folder.
    #[must_use]
    pub fn resolve(&self, file_name: &str) -> Option<std::path::PathBuf> {
        let candidate = Path::new(file_name);
        let is_bare = candidate.file_name().is_some_and(|name| name == candidate.as_os_str());
        is_bare.then(|| self.folder.join(candidate))
    }
}

impl HistorySettings {
    /// Effective page size for a requested limit.
    #[must_use]
    pub fn clamp_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_rejects_nested_paths() {
        let settings = ThumbnailSettings::default();
        assert!(settings.resolve("thumb_1.jpg").is_some());
        assert!(settings.resolve("../secret.txt").is_none());
        assert!(settings.resolve("a/b.jpg").is_none());
        assert!(settings.resolve("").is_none());
    }

    #[test]
    fn limit_is_clamped() {
        let history = HistorySettings::default();
        assert_eq!(history.clamp_limit(None), 20);
        assert_eq!(history.clamp_limit(Some(0)), 1);
        assert_eq!(history.clamp_limit(Some(50)), 50);
        assert_eq!(history.clamp_limit(Some(5000)), 100);
    }
}
