//! Multipart image upload.

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    routing::post,
};

use super::{ApiPath, ApiResult, ok};
use crate::error::ApiError;
use crate::middleware::RequireAdmin;
use crate::services::{Destination, IncomingImage, StoredImage, UploadService};
use crate::state::AppState;

/// Multipart field carrying the file.
pub const FILE_FIELD: &str = "image";

/// Build the upload router. The route has its own body limit, larger than
/// the JSON one.
pub fn router(max_bytes: usize) -> Router<AppState> {
    Router::new().route(
        "/upload/{destination}",
        post(upload).layer(DefaultBodyLimit::max(max_bytes)),
    )
}

/// Store one image under `pengurus`, `kegiatan` or `hero`.
///
/// Fields other than `image` are ignored.
///
/// # Errors
///
/// `404` for an unknown destination, `400` when no image is attached or it
/// is not an image, `413` above the upload limit.
pub async fn upload(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(segment): ApiPath<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<StoredImage> {
    let destination = Destination::from_segment(&segment)
        .ok_or_else(|| ApiError::NotFound(format!("/api/upload/{segment}")))?;
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await?;

        if bytes.is_empty() && file_name.as_deref().is_none_or(str::is_empty) {
            // Browsers send an empty part when no file was picked
            break;
        }

        let config = state.config();
        let service = UploadService::new(&config.upload_dir, state.public_base_url());
        let stored = service
            .save(
                destination,
                IncomingImage {
                    file_name: file_name.as_deref(),
                    content_type: content_type.as_deref(),
                    bytes: &bytes,
                },
            )
            .await?;
        return Ok(ok(stored));
    }

    Err(ApiError::BadRequest(format!(
        "no file in field \"{FILE_FIELD}\""
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };

    use crate::routes::test_support::TestApp;

    const BOUNDARY: &str = "portal-test-boundary";

    fn multipart_body(parts: &[(&str, Option<&str>, &str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file_name, content_type, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n".as_slice());
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn post_upload(
        app: &TestApp,
        destination: &str,
        body: Vec<u8>,
        authed: bool,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::post(format!("/api/upload/{destination}")).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if authed {
            let token = app.token().await;
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        app.send(builder.body(Body::from(body)).unwrap()).await
    }

    fn files_under(app: &TestApp) -> usize {
        walk(app.upload_dir.path())
    }

    fn walk(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .map(|e| e.unwrap().path())
                    .map(|p| if p.is_dir() { walk(&p) } else { 1 })
                    .sum()
            })
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_upload_roster_photo() {
        let app = TestApp::new().await;
        let body = multipart_body(&[
            ("caption", None, "", b"ignored".as_slice()),
            ("image", Some("Pak RT.jpg"), "image/jpeg", b"\xff\xd8\xff".as_slice()),
        ]);

        let (status, json) = post_upload(&app, "pengurus", body, true).await;
        assert_eq!(status, StatusCode::OK, "{json}");

        let path = json["data"]["imagePath"].as_str().unwrap();
        assert!(path.starts_with("/uploads/pengurus/"));
        assert!(path.ends_with("-pak-rt.jpg"));
        assert_eq!(
            json["data"]["imageUrl"],
            format!("https://desa.example{path}")
        );

        // Served back from the static mount
        let response = tower::ServiceExt::oneshot(
            app.router.clone(),
            Request::get(path).body(Body::empty()).unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    }

    #[tokio::test]
    async fn test_upload_without_file_is_400_and_writes_nothing() {
        let app = TestApp::new().await;
        let body = multipart_body(&[("caption", None, "", b"no file here".as_slice())]);

        let (status, json) = post_upload(&app, "kegiatan", body, true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(files_under(&app), 0);
    }

    #[tokio::test]
    async fn test_upload_empty_file_part_is_400() {
        let app = TestApp::new().await;
        let body = multipart_body(&[("image", Some(""), "application/octet-stream", b"".as_slice())]);

        let (status, _) = post_upload(&app, "hero", body, true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(files_under(&app), 0);
    }

    #[tokio::test]
    async fn test_upload_non_image_is_400() {
        let app = TestApp::new().await;
        let body = multipart_body(&[("image", Some("notes.txt"), "text/plain", b"hello".as_slice())]);

        let (status, json) = post_upload(&app, "hero", body, true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("not an image"));
        assert_eq!(files_under(&app), 0);
    }

    #[tokio::test]
    async fn test_unknown_destination_is_404() {
        let app = TestApp::new().await;
        let body = multipart_body(&[("image", Some("a.png"), "image/png", b"png".as_slice())]);

        let (status, json) = post_upload(&app, "dokumen", body, true).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Not found: /api/upload/dokumen");
    }

    #[tokio::test]
    async fn test_upload_requires_token() {
        let app = TestApp::new().await;
        let body = multipart_body(&[("image", Some("a.png"), "image/png", b"png".as_slice())]);

        let (status, _) = post_upload(&app, "hero", body, false).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(files_under(&app), 0);
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_413() {
        let app = TestApp::new().await;
        let big = vec![0_u8; 512 * 1024];
        let body = multipart_body(&[("image", Some("big.png"), "image/png", big.as_slice())]);

        let (status, json) = post_upload(&app, "hero", body, true).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["success"], false);
    }
}
