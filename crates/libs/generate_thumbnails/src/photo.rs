use color_eyre::eyre::{Result, eyre};
use fast_image_resize::images::Image;
use fast_image_resize::{PixelType, Resizer};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbImage};

/// Computes the thumbnail size for a `width`×`height` source.
///
/// Equivalent to scaling by `min(max_width / width, max_height / height, 1.0)` and flooring,
/// done in integers so the limiting side lands exactly on its bound. Both sides are at least 1.
#[must_use]
pub fn thumbnail_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let (max_width, max_height) = (max_width.max(1), max_height.max(1));
    if width == 0 || height == 0 {
        return (width.max(1).min(max_width), height.max(1).min(max_height));
    }
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let (w, h) = (u64::from(width), u64::from(height));
    let (mw, mh) = (u64::from(max_width), u64::from(max_height));
    if w * mh >= h * mw {
        // Width is the limiting side.
        (max_width, ((h * mw) / w).max(1) as u32)
    } else {
        (((w * mh) / h).max(1) as u32, max_height)
    }
}

/// Resizes `img` to fit inside `max_width`×`max_height` as RGB, without upscaling.
pub fn resize_to_fit(img: &DynamicImage, max_width: u32, max_height: u32) -> Result<RgbImage> {
    let src_img = img.to_rgb8();
    let (orig_w, orig_h) = src_img.dimensions();
    let (target_w, target_h) = thumbnail_dimensions(orig_w, orig_h, max_width, max_height);

    if (target_w, target_h) == (orig_w, orig_h) {
        return Ok(src_img);
    }

    let src_image = Image::from_vec_u8(orig_w, orig_h, src_img.into_raw(), PixelType::U8x3)
        .map_err(|e| eyre!("Resize source error: {e}"))?;
    let mut dst_image = Image::new(target_w, target_h, PixelType::U8x3);

    let mut resizer = Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, None)
        .map_err(|e| eyre!("Resizing failed: {e}"))?;

    RgbImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| eyre!("Failed to construct resized image"))
}

/// Encodes an RGB image as JPEG.
pub fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100)).write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(buffer)
}
