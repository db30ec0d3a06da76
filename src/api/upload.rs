use std::collections::HashMap;
use std::path::Path;

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;

use crate::error::AppError;
use crate::storage::client::StorageClient;

/// URL prefix under which uploaded files are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

const MB: usize = 1024 * 1024;

/// Room left in the request body limit for the text fields and multipart
/// framing around the file.
const FORM_OVERHEAD: usize = 256 * 1024;

/// Where and how a resource accepts its single uploaded file.
#[derive(Debug)]
pub struct UploadPolicy {
    /// Multipart field carrying the file.
    pub field: &'static str,
    /// Folder below the upload root.
    pub folder: &'static str,
    pub file_prefix: &'static str,
    pub max_bytes: usize,
    /// Exact MIME type required, if any.
    pub allowed_mime: Option<&'static str>,
    pub mime_rejection: &'static str,
}

impl UploadPolicy {
    /// Request body limit for routes using this policy.
    pub fn body_limit(&self) -> usize {
        self.max_bytes + FORM_OVERHEAD
    }

    fn accepts(&self, content_type: Option<&str>) -> bool {
        let Some(allowed) = self.allowed_mime else {
            return true;
        };
        content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().eq_ignore_ascii_case(allowed))
            .unwrap_or(false)
    }

    fn generate_name(&self, original_name: &str) -> String {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default();

        format!(
            "{}{}_{}{}",
            self.file_prefix,
            chrono::Utc::now().timestamp_millis(),
            uuid::Uuid::new_v4().simple(),
            extension
        )
    }
}

pub const BLOG_IMAGE: UploadPolicy = UploadPolicy {
    field: "image",
    folder: "blogs",
    file_prefix: "",
    max_bytes: 5 * MB,
    allowed_mime: None,
    mime_rejection: "",
};

pub const CV_DOCUMENT: UploadPolicy = UploadPolicy {
    field: "cv",
    folder: "cvs",
    file_prefix: "CV_",
    max_bytes: 10 * MB,
    allowed_mime: Some("application/pdf"),
    mime_rejection: "Only PDF files allowed",
};

pub const HOBBY_IMAGE: UploadPolicy = UploadPolicy {
    field: "image",
    folder: "hobbies",
    file_prefix: "",
    max_bytes: 5 * MB,
    allowed_mime: None,
    mime_rejection: "",
};

pub const QUOTE_PROFILE_IMAGE: UploadPolicy = UploadPolicy {
    field: "profileImage",
    folder: "quotes",
    file_prefix: "",
    max_bytes: 2 * MB,
    allowed_mime: None,
    mime_rejection: "",
};

/// A file that was received and validated but not yet written.
#[derive(Debug)]
struct PendingFile {
    original_name: String,
    content: Vec<u8>,
}

/// A file written to the upload store.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub original_name: String,
    /// Path the file is served from, e.g. `/uploads/cvs/CV_...pdf`.
    pub public_path: String,
}

/// A parsed multipart form: text fields plus at most one file.
///
/// The file is buffered so handlers can validate the text fields before
/// anything touches the upload store.
#[derive(Debug)]
pub struct UploadForm {
    policy: &'static UploadPolicy,
    fields: HashMap<String, String>,
    file: Option<PendingFile>,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body too large".into())
    } else {
        AppError::BadRequest(format!("Multipart error: {e}"))
    }
}

impl UploadForm {
    /// Read every field of `multipart`, enforcing `policy` on the file.
    pub async fn read(
        mut multipart: Multipart,
        policy: &'static UploadPolicy,
    ) -> Result<Self, AppError> {
        let mut fields = HashMap::new();
        let mut file = None;

        while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or("").to_string();

            let Some(original_name) = field.file_name().map(str::to_string) else {
                let value = field.text().await.map_err(multipart_error)?;
                fields.insert(name, value);
                continue;
            };

            if name != policy.field {
                return Err(AppError::BadRequest(format!("Unexpected file field '{name}'")));
            }
            if file.is_some() {
                return Err(AppError::BadRequest(format!(
                    "Only one file allowed in '{name}'"
                )));
            }
            if !policy.accepts(field.content_type()) {
                return Err(AppError::BadRequest(policy.mime_rejection.into()));
            }

            let mut content = Vec::new();
            while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                if content.len() + chunk.len() > policy.max_bytes {
                    return Err(AppError::PayloadTooLarge(format!(
                        "File too large (limit {} MB)",
                        policy.max_bytes / MB
                    )));
                }
                content.extend_from_slice(&chunk);
            }

            file = Some(PendingFile {
                original_name,
                content,
            });
        }

        Ok(Self {
            policy,
            fields,
            file,
        })
    }

    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    /// A text field, if present.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    /// A text field that must be present and non-blank.
    pub fn required_text(&self, name: &str) -> Result<String, AppError> {
        self.text(name)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest(format!("Field '{name}' is required")))
    }

    /// A boolean field (`true`/`false`, `1`/`0`, `on`/`off`). Blank means absent.
    pub fn bool(&self, name: &str) -> Result<Option<bool>, AppError> {
        let Some(raw) = self.fields.get(name).map(|v| v.trim().to_ascii_lowercase()) else {
            return Ok(None);
        };
        match raw.as_str() {
            "" => Ok(None),
            "true" | "1" | "on" => Ok(Some(true)),
            "false" | "0" | "off" => Ok(Some(false)),
            other => Err(AppError::BadRequest(format!(
                "Field '{name}' must be a boolean, got '{other}'"
            ))),
        }
    }

    /// An integer field. Blank means absent.
    pub fn int(&self, name: &str) -> Result<Option<i32>, AppError> {
        match self.fields.get(name).map(|v| v.trim()) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                AppError::BadRequest(format!("Field '{name}' must be an integer, got '{raw}'"))
            }),
        }
    }

    /// A JSON-encoded array of strings, e.g. `["rust","k8s"]`.
    pub fn string_list(&self, name: &str) -> Result<Option<Vec<String>>, AppError> {
        match self.fields.get(name).map(|v| v.trim()) {
            None | Some("") => Ok(None),
            Some(raw) => serde_json::from_str(raw).map(Some).map_err(|e| {
                AppError::BadRequest(format!("Field '{name}' must be a JSON array of strings: {e}"))
            }),
        }
    }

    /// Write the buffered file, if any, to the upload store.
    pub async fn store_file(
        &mut self,
        storage: &dyn StorageClient,
    ) -> Result<Option<StoredFile>, AppError> {
        let Some(file) = self.file.take() else {
            return Ok(None);
        };

        let name = self.policy.generate_name(&file.original_name);
        let key = format!("{}/{}", self.policy.folder, name);
        storage.put_object(&key, file.content).await?;

        Ok(Some(StoredFile {
            original_name: file.original_name,
            public_path: format!("{}/{}", PUBLIC_PREFIX, key),
        }))
    }
}
