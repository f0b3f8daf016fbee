use color_eyre::eyre::Result;
use std::fs;
use std::path::Path;

const MAX_STEM_LEN: usize = 32;

/// Builds a thumbnail file name that is unique per call:
/// `thumb_<utc timestamp>_<random>_<stem>.jpg`.
#[must_use]
pub fn unique_thumbnail_name(original_filename: &str) -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d%H%M%S%6f");
    let suffix: String = std::iter::repeat_with(fastrand::alphanumeric)
        .take(8)
        .collect();
    let stem = sanitize_stem(original_filename);
    if stem.is_empty() {
        format!("thumb_{timestamp}_{suffix}.jpg")
    } else {
        format!("thumb_{timestamp}_{suffix}_{stem}.jpg")
    }
}

/// Keeps only `[A-Za-z0-9_-]` from the file stem of an uploaded name.
fn sanitize_stem(original_filename: &str) -> String {
    // Uploaded names may carry client paths with either separator.
    let base = original_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let stem = Path::new(base)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .take(MAX_STEM_LEN)
        .collect()
}

/// Writes `bytes` next to `path` first and renames into place, so readers never see a
/// half-written thumbnail.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = Path::new(&part);

    fs::write(part, bytes)?;
    if let Err(e) = fs::rename(part, path) {
        let _ = fs::remove_file(part);
        return Err(e.into());
    }
    Ok(())
}
