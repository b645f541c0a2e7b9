use std::collections::HashMap;
use std::path::{Component, Path};

use axum::body::Bytes;
use axum::extract::Multipart;
use uuid::Uuid;

use crate::database::models::StoredFile;
use crate::error::ApiError;

/// A file part held in memory until it is stored
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Text fields and file parts of a multipart body, keyed by field name
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    /// Drain a multipart body. Parts with a filename are files, the rest text.
    pub async fn collect(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = MultipartForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(original_name) => {
                    let content_type = field
                        .content_type()
                        .map(str::to_string)
                        .unwrap_or_else(|| mime_guess::from_path(&original_name).first_or_octet_stream().to_string());
                    let bytes = field.bytes().await?;
                    form.files.insert(
                        name,
                        UploadedFile {
                            original_name,
                            content_type,
                            bytes,
                        },
                    );
                }
                None => {
                    let text = field.text().await?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// Trimmed text value; blank counts as absent
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn require(&self, name: &str) -> Result<String, ApiError> {
        self.text(name)
            .ok_or_else(|| ApiError::field_error(name, format!("{} is required", name)))
    }

    /// Non-empty file part
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name).filter(|f| !f.is_empty())
    }
}

/// Write an upload under `dir` with a generated name like `archivo-<uuid>.pdf`
pub async fn store_upload(dir: &Path, field: &str, file: &UploadedFile) -> Result<StoredFile, ApiError> {
    let extension = Path::new(&file.original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    let filename = format!("{}-{}{}", field, Uuid::new_v4().simple(), extension);
    let path = dir.join(&filename);

    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        tracing::error!("Cannot create upload directory {}: {}", dir.display(), e);
        ApiError::internal_server_error("could not store the uploaded file")
    })?;
    tokio::fs::write(&path, &file.bytes).await.map_err(|e| {
        tracing::error!("Cannot write upload {}: {}", path.display(), e);
        ApiError::internal_server_error("could not store the uploaded file")
    })?;

    tracing::info!("Stored upload {} ({} bytes)", filename, file.bytes.len());

    Ok(StoredFile {
        filename,
        originalname: file.original_name.clone(),
        path: path.to_string_lossy().into_owned(),
        size: file.bytes.len() as u64,
        mimetype: file.content_type.clone(),
    })
}

/// Public URL path of a stored upload
pub fn public_path(filename: &str) -> String {
    format!("/uploads/{}", filename)
}

/// Remove a file referenced by a public `/uploads/...` path. Failures are only logged.
pub async fn remove_public_file(uploads_dir: &Path, public: &str) {
    let Some(name) = public.strip_prefix("/uploads/").and_then(sanitize_download_name) else {
        tracing::warn!("Not removing file outside the upload directory: {}", public);
        return;
    };
    let path = uploads_dir.join(name);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => tracing::info!("Removed {}", path.display()),
        Err(e) => tracing::warn!("Could not remove {}: {}", path.display(), e),
    }
}

/// A bare file name with no directory parts, or `None`
pub fn sanitize_download_name(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    if raw.is_empty() || raw.contains('\\') {
        return None;
    }
    let mut components = Path::new(raw).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(raw),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_names_cannot_escape() {
        assert_eq!(sanitize_download_name("archivo-1.pdf"), Some("archivo-1.pdf"));
        assert_eq!(sanitize_download_name("../etc/passwd"), None);
        assert_eq!(sanitize_download_name("sub/file.pdf"), None);
        assert_eq!(sanitize_download_name(".."), None);
        assert_eq!(sanitize_download_name("/etc/passwd"), None);
        assert_eq!(sanitize_download_name("..\\secret"), None);
        assert_eq!(sanitize_download_name(""), None);
    }

    #[test]
    fn text_fields_treat_blank_as_missing() {
        let mut form = MultipartForm::default();
        form.fields.insert("titulo".into(), "  Verano 2025 ".into());
        form.fields.insert("descripcion".into(), "   ".into());
        assert_eq!(form.text("titulo").as_deref(), Some("Verano 2025"));
        assert_eq!(form.text("descripcion"), None);
        assert_eq!(form.require("descripcion").unwrap_err().status_code(), 400);
    }

    #[tokio::test]
    async fn stored_uploads_keep_extension_and_metadata() {
        let dir = std::env::temp_dir().join(format!("movilidad-upload-{}", Uuid::new_v4()));
        let file = UploadedFile {
            original_name: "Carta Motivos.PDF".into(),
            content_type: "application/pdf".into(),
            bytes: Bytes::from_static(b"%PDF-1.4"),
        };

        let stored = store_upload(&dir, "archivo", &file).await.unwrap();
        assert!(stored.filename.starts_with("archivo-"));
        assert!(stored.filename.ends_with(".pdf"));
        assert_eq!(stored.originalname, "Carta Motivos.PDF");
        assert_eq!(stored.size, 8);
        assert_eq!(tokio::fs::read(&stored.path).await.unwrap(), b"%PDF-1.4");

        remove_public_file(&dir, &public_path(&stored.filename)).await;
        assert!(tokio::fs::metadata(&stored.path).await.is_err());
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
