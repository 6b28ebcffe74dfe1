//! Extractors whose rejections render as `{success:false,message}`.

use axum::extract::{FromRequest, FromRequestParts};
use axum::{Json, extract::Multipart, extract::Request, http::header};
use uuid::Uuid;

use placement_types::api::ApplyRequest;

use crate::error::ApiError;
use crate::uploads::UploadedFile;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Body of `POST /api/student/apply`: JSON or multipart with an optional resume.
#[derive(Debug)]
pub struct ApplyForm {
    pub role_id: Uuid,
    pub use_existing_resume: bool,
    pub resume: Option<UploadedFile>,
}

impl<S> FromRequest<S> for ApplyForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(body) = Json::<ApplyRequest>::from_request(req, state).await?;
            return Ok(ApplyForm {
                role_id: body.role_id,
                use_existing_resume: body.use_existing_resume,
                resume: None,
            });
        }

        let mut multipart = Multipart::from_request(req, state).await?;
        let mut role_id = None;
        let mut use_existing_resume = false;
        let mut resume = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "roleId" => {
                    let raw = field.text().await?;
                    let id = raw
                        .trim()
                        .parse::<Uuid>()
                        .map_err(|_| ApiError::validation("Invalid roleId"))?;
                    role_id = Some(id);
                }
                "useExistingResume" => {
                    let raw = field.text().await?;
                    use_existing_resume = matches!(raw.trim(), "true" | "1" | "on");
                }
                "resume" => {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;
                    if !bytes.is_empty() {
                        resume = Some(UploadedFile {
                            file_name,
                            content_type,
                            bytes,
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(ApplyForm {
            role_id: role_id.ok_or_else(|| ApiError::validation("roleId is required"))?,
            use_existing_resume,
            resume,
        })
    }
}

/// A single file field from a multipart upload.
pub async fn single_file(
    mut multipart: Multipart,
    field_name: &str,
) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        return Ok(UploadedFile {
            file_name,
            content_type,
            bytes,
        });
    }
    Err(ApiError::validation("No file uploaded"))
}
