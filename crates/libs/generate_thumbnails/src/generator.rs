use crate::photo::{encode_jpeg, resize_to_fit};
use crate::utils::{unique_thumbnail_name, write_atomically};
use app_state::ThumbnailSettings;
use color_eyre::eyre::Result;
use image::DynamicImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A thumbnail that was written to the thumbnail folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedThumbnail {
    pub file_name: String,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Writes bounded JPEG previews into the configured thumbnail folder.
#[derive(Debug, Clone)]
pub struct ThumbnailGenerator {
    settings: ThumbnailSettings,
}

impl ThumbnailGenerator {
    #[must_use]
    pub const fn new(settings: ThumbnailSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.settings.folder
    }

    #[must_use]
    pub const fn settings(&self) -> &ThumbnailSettings {
        &self.settings
    }

    /// Generates a thumbnail, logging and swallowing any failure.
    #[must_use]
    pub fn generate(&self, image: &DynamicImage, original_filename: &str) -> Option<GeneratedThumbnail> {
        match self.try_generate(image, original_filename) {
            Ok(thumbnail) => {
                debug!(
                    "Wrote {}x{} thumbnail {}",
                    thumbnail.width, thumbnail.height, thumbnail.file_name
                );
                Some(thumbnail)
            }
            Err(e) => {
                warn!("Thumbnail generation failed for {original_filename:?}: {e:?}");
                None
            }
        }
    }

    /// Generates a thumbnail and reports why it failed, if it did.
    pub fn try_generate(
        &self,
        image: &DynamicImage,
        original_filename: &str,
    ) -> Result<GeneratedThumbnail> {
        let resized = resize_to_fit(image, self.settings.max_width, self.settings.max_height)?;
        let jpeg = encode_jpeg(&resized, self.settings.jpeg_quality)?;

        fs::create_dir_all(&self.settings.folder)?;
        let file_name = unique_thumbnail_name(original_filename);
        let path = self.settings.folder.join(&file_name);
        write_atomically(&path, &jpeg)?;

        Ok(GeneratedThumbnail {
            file_name,
            path,
            width: resized.width(),
            height: resized.height(),
        })
    }

    /// Deletes a thumbnail whose record never made it to the store.
    pub fn discard(&self, thumbnail: &GeneratedThumbnail) {
        if let Err(e) = fs::remove_file(&thumbnail.path) {
            warn!("Could not remove orphaned thumbnail {}: {e}", thumbnail.path.display());
        }
    }
}
