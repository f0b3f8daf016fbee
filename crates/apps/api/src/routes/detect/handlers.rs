use crate::api_state::ApiContext;
use axum::Json;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use common_services::api::detect::error::DetectError;
use common_services::api::detect::interfaces::{DetectRequest, DetectResponse, UploadedFile};
use common_services::api::detect::service::run_detection;
use tracing::instrument;

/// Detect objects in an uploaded image and store the result.
///
/// The image goes in a multipart part named `file`.
#[utoipa::path(
    post,
    path = "/detect",
    tag = "Detection",
    request_body(content = DetectRequest, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Objects detected and record stored", body = DetectResponse),
        (status = 400, description = "Missing, unsupported, oversized or undecodable upload"),
        (status = 503, description = "The model or the database is not available"),
        (status = 500, description = "Detection or storage failed"),
    )
)]
#[instrument(skip(context, multipart), err(Debug))]
pub async fn detect_handler(
    State(context): State<ApiContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectResponse>, DetectError> {
    // Refuse before reading the body when there is nothing to run it through.
    let engine = context.models.engine()?;
    let multipart = multipart.map_err(|e| DetectError::bad_input(e.body_text()))?;
    let upload = read_file_part(multipart).await?;

    let record = run_detection(
        &context.pool,
        &engine,
        &context.thumbnails,
        &context.settings.upload,
        upload,
    )
    .await?;

    Ok(Json(record.into()))
}

async fn read_file_part(mut multipart: Multipart) -> Result<UploadedFile, DetectError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or("upload")
            .to_string();
        let content_type = field.content_type().map(ToString::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(UploadedFile {
            filename,
            content_type,
            bytes,
        });
    }
    Err(DetectError::bad_input("Missing multipart part 'file'."))
}

fn multipart_error(err: MultipartError) -> DetectError {
    DetectError::bad_input(format!("Invalid upload: {}", err.body_text()))
}
