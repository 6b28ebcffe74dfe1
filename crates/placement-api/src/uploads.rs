use std::path::{Component, Path, PathBuf};

use axum::body::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;

/// 5 MB limit for logos and resumes
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Request body cap on upload routes: the file limit plus multipart framing.
pub const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

/// Public URL prefix the server mounts the upload root under.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Logo,
    Resume,
}

impl UploadKind {
    fn dir(self) -> &'static str {
        match self {
            UploadKind::Logo => "logos",
            UploadKind::Resume => "resumes",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            UploadKind::Logo => "logo",
            UploadKind::Resume => "resume",
        }
    }

    fn extensions(self) -> &'static [&'static str] {
        match self {
            UploadKind::Logo => &["jpeg", "jpg", "png", "gif"],
            UploadKind::Resume => &["pdf"],
        }
    }

    fn mime_types(self) -> &'static [&'static str] {
        match self {
            UploadKind::Logo => &["image/jpeg", "image/jpg", "image/png", "image/gif"],
            UploadKind::Resume => &["application/pdf"],
        }
    }

    fn type_error(self) -> &'static str {
        match self {
            UploadKind::Logo => "Only image files (jpeg, jpg, png, gif) are allowed",
            UploadKind::Resume => "Only PDF files are allowed",
        }
    }
}

#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Check size, extension and MIME type. Returns the lowercase extension.
    pub fn validate(&self, kind: UploadKind) -> Result<String, ApiError> {
        if self.bytes.is_empty() {
            return Err(ApiError::validation("No file uploaded"));
        }
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::PayloadTooLarge);
        }

        let ext = self
            .file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .filter(|ext| kind.extensions().contains(&ext.as_str()));

        let mime_ok = self
            .content_type
            .as_deref()
            .map(|ct| ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
            .is_some_and(|ct| kind.mime_types().contains(&ct.as_str()));

        match ext {
            Some(ext) if mime_ok => Ok(ext),
            _ => Err(ApiError::UnsupportedMediaType(kind.type_error().into())),
        }
    }
}

/// On-disk store for logos and resumes, served back under `/uploads`.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate and write the file. Returns its public path, e.g.
    /// `/uploads/resumes/resume-<uuid>.pdf`.
    pub async fn save(&self, kind: UploadKind, file: &UploadedFile) -> Result<String, ApiError> {
        let ext = file.validate(kind)?;

        let dir = self.root.join(kind.dir());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", dir.display(), e))?;

        let name = format!("{}-{}.{}", kind.prefix(), Uuid::new_v4(), ext);
        let path = dir.join(&name);
        tokio::fs::write(&path, &file.bytes)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;

        info!("Stored {} ({} bytes)", path.display(), file.bytes.len());
        Ok(format!("{}/{}/{}", PUBLIC_PREFIX, kind.dir(), name))
    }

    /// Best-effort removal of a previously stored file.
    pub async fn remove(&self, public_path: &str) {
        let Some(path) = self.resolve(public_path) else {
            warn!("Refusing to remove unexpected upload path {}", public_path);
            return;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => info!("Removed {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }

    /// Map a public `/uploads/...` path to a file under the root.
    fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let rel = Path::new(public_path.strip_prefix(PUBLIC_PREFIX)?.trim_start_matches('/'));
        let plain = rel.components().all(|c| matches!(c, Component::Normal(_)));
        if rel.as_os_str().is_empty() || !plain {
            return None;
        }
        Some(self.root.join(rel))
    }
}
