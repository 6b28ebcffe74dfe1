//! Read-only listings shared by the admin and faculty portals.

use axum::{Json, extract::State};

use placement_db::models::ApplicationScope;
use placement_types::api::{CompanyWithOwner, DataResponse, PlatformStats, StudentWithUser};
use placement_types::models::ApplicationDetail;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::run_db;

pub async fn list_students(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<StudentWithUser>>>, ApiError> {
    let students = run_db(&state, |db| db.list_students()).await?;
    Ok(Json(DataResponse::new(students)))
}

pub async fn list_companies(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<CompanyWithOwner>>>, ApiError> {
    let companies = run_db(&state, |db| db.list_companies(false)).await?;
    Ok(Json(DataResponse::new(companies)))
}

pub async fn list_applications(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<ApplicationDetail>>>, ApiError> {
    let applications =
        run_db(&state, |db| db.list_application_details(ApplicationScope::All, None)).await?;
    Ok(Json(DataResponse::new(applications)))
}

pub async fn stats(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<PlatformStats>>, ApiError> {
    let stats = run_db(&state, |db| db.platform_stats()).await?;
    Ok(Json(DataResponse::new(stats)))
}
