//! Image upload endpoint.

use std::io;
use std::path::Path;

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use storefront_api_models::{ApiError, ApiResult};
use tracing::warn;

use crate::client::ApiClient;

const UPLOAD_FAILED: &str = "Failed to upload images";
const FILES_FIELD: &str = "files";

/// In-memory file ready to be sent as one multipart part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    /// File name reported to the backend.
    pub file_name: String,
    /// MIME type, when known.
    pub content_type: Option<String>,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Read `path` from disk, guessing the MIME type from its extension.
    ///
    /// # Errors
    ///
    /// Returns the IO error when the file cannot be read.
    pub async fn from_path(path: &Path) -> io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |name| name.to_string_lossy().into_owned());
        Ok(Self {
            content_type: image_mime(path).map(str::to_string),
            file_name,
            bytes,
        })
    }

    fn into_part(self) -> reqwest::Result<Part> {
        let part = Part::bytes(self.bytes).file_name(self.file_name);
        match self.content_type {
            Some(content_type) => part.mime_str(&content_type),
            None => Ok(part),
        }
    }
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// `/files/upload` operations.
#[derive(Clone, Copy, Debug)]
pub struct Uploads<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    /// File upload operations.
    #[must_use]
    pub const fn uploads(&self) -> Uploads<'_> {
        Uploads { client: self }
    }
}

impl Uploads<'_> {
    /// Upload images as one multipart request, one `files` part per image.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure (fallback `Failed to upload images`).
    pub async fn images(&self, files: Vec<UploadFile>) -> ApiResult<Value> {
        let mut form = Form::new();
        for file in files {
            let file_name = file.file_name.clone();
            let part = file.into_part().map_err(|err| {
                warn!(error = %err, file = %file_name, "rejected upload part");
                ApiError::new(UPLOAD_FAILED)
            })?;
            form = form.part(FILES_FIELD, part);
        }

        let request = self
            .client
            .request(Method::POST, &["files", "upload", "images"], UPLOAD_FAILED)?
            .multipart(form);
        self.client.send(request, UPLOAD_FAILED).await
    }
}
