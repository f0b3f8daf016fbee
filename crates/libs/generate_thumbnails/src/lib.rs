#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]

//! # Thumbnail Generation Crate
//!
//! Creates small JPEG previews of uploaded images.
//!
//! - **Bounded**: thumbnails fit inside the configured box (200×200 by default) and keep the
//!   aspect ratio of the source.
//! - **Never upscaled**: images that already fit are re-encoded at their own size.
//! - **Collision free**: every call writes a new file named from a timestamp and a random
//!   suffix, so concurrent uploads never overwrite each other.
//! - **Best effort**: [`ThumbnailGenerator::generate`] logs a failure and returns `None`.

mod generator;
mod photo;
mod utils;

pub use generator::{GeneratedThumbnail, ThumbnailGenerator};
pub use photo::{encode_jpeg, resize_to_fit, thumbnail_dimensions};
pub use utils::unique_thumbnail_name;
