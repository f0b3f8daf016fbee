use crate::api::detect::error::DetectError;
use app_state::UploadSettings;
use image::DynamicImage;

/// An upload that passed every check, decoded.
#[derive(Debug)]
pub struct ValidatedImage {
    pub image: DynamicImage,
    pub width: u32,
    pub height: u32,
}

/// Checks an uploaded part before it reaches the expensive path.
///
/// In order: content type whitelisted, size within the cap, not empty, decodes as an image.
/// Content types compare case-insensitively with parameters ignored.
pub fn validate_upload(
    settings: &UploadSettings,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<ValidatedImage, DetectError> {
    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty());
    let Some(essence) = essence else {
        return Err(DetectError::bad_input("Missing content type."));
    };
    if !settings
        .allowed_content_types
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&essence))
    {
        return Err(DetectError::bad_input(format!(
            "Unsupported content type '{essence}', expected one of: {}.",
            settings.allowed_content_types.join(", ")
        )));
    }

    if bytes.len() > settings.max_bytes {
        return Err(DetectError::bad_input(format!(
            "File too large: {} bytes, the maximum is {} bytes.",
            bytes.len(),
            settings.max_bytes
        )));
    }
    if bytes.is_empty() {
        return Err(DetectError::bad_input("Uploaded file is empty."));
    }

    let image = image::load_from_memory(bytes)
        .map_err(|e| DetectError::bad_input(format!("Could not decode image: {e}")))?;

    Ok(ValidatedImage {
        width: image.width(),
        height: image.height(),
        image,
    })
}
