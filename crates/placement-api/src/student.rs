use axum::{
    Extension, Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};
use uuid::Uuid;

use placement_db::models::{ApplicationScope, Insert, NewApplication};
use placement_types::api::{
    CompanyWithRoles, DataResponse, RoleQuery, StudentProfileUpdate, StudentWithUser,
    UploadResponse,
};
use placement_types::models::{
    Application, ApplicationDetail, CompanyProfile, RolePosting, StudentProfile,
};
use placement_types::status::ApplicationStatus;

use crate::auth::{AppState, validate_cgpa};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, ApplyForm, single_file};
use crate::middleware::AuthUser;
use crate::run_db;
use crate::uploads::UploadKind;
use crate::workflow::{self, Actor};

async fn own_profile(state: &AppState, user: &AuthUser) -> Result<StudentProfile, ApiError> {
    let user_id = user.id;
    run_db(state, move |db| db.get_student_by_user(user_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Student profile not found"))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DataResponse<StudentWithUser>>, ApiError> {
    let user_id = user.id;
    let profile = run_db(&state, move |db| db.get_student_with_user(user_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Student profile not found"))?;
    Ok(Json(DataResponse::new(profile)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(update): ApiJson<StudentProfileUpdate>,
) -> Result<Json<DataResponse<StudentWithUser>>, ApiError> {
    if let Some(cgpa) = update.cgpa {
        validate_cgpa(cgpa)?;
    }
    if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::validation("Name cannot be empty"));
    }

    let user_id = user.id;
    let profile = run_db(&state, move |db| db.update_student(user_id, &update))
        .await?
        .ok_or_else(|| ApiError::not_found("Student profile not found"))?;
    Ok(Json(DataResponse::new(profile)))
}

/// Replace the stored resume. The previous file is left on disk.
pub async fn upload_resume(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let student = own_profile(&state, &user).await?;
    let file = single_file(multipart, "resume").await?;
    let file_path = state.uploads.save(UploadKind::Resume, &file).await?;

    let stored = file_path.clone();
    run_db(&state, move |db| db.set_student_resume(student.id, &stored)).await?;

    Ok(Json(UploadResponse {
        success: true,
        file_path,
    }))
}

pub async fn list_applications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DataResponse<Vec<ApplicationDetail>>>, ApiError> {
    let student = own_profile(&state, &user).await?;
    let applications = run_db(&state, move |db| {
        db.list_application_details(ApplicationScope::Student(student.id), None)
    })
    .await?;
    Ok(Json(DataResponse::new(applications)))
}

/// Apply to a role. An uploaded resume wins over the one on the profile.
pub async fn apply(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    form: ApplyForm,
) -> Result<impl IntoResponse, ApiError> {
    let student = own_profile(&state, &user).await?;

    let role_id = form.role_id;
    let role = run_db(&state, move |db| db.get_role(role_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Role not found"))?;

    let (resume_url, uploaded) = match (&form.resume, &student.resume_url) {
        (Some(file), _) => (state.uploads.save(UploadKind::Resume, file).await?, true),
        (None, Some(existing)) => (existing.clone(), false),
        (None, None) => {
            let (student_id, role_id) = (student.id, role.id);
            if run_db(&state, move |db| db.has_applied(student_id, role_id)).await? {
                return Err(already_applied());
            }
            return Err(ApiError::validation("Please upload a resume"));
        }
    };

    let new = NewApplication {
        student_id: student.id,
        role_id: role.id,
        company_id: role.company_id,
        resume_url: resume_url.clone(),
    };
    match run_db(&state, move |db| db.create_application(&new)).await? {
        Insert::Inserted(application) => {
            info!(
                "Student {} applied to role {} ({})",
                student.id, role.id, application.id
            );
            Ok((StatusCode::CREATED, Json(DataResponse::new(application))))
        }
        Insert::Duplicate(_) => {
            if uploaded {
                state.uploads.remove(&resume_url).await;
            }
            warn!("Student {} re-applied to role {}", student.id, role.id);
            Err(already_applied())
        }
    }
}

fn already_applied() -> ApiError {
    ApiError::Conflict("You have already applied for this role".into())
}

pub async fn accept_offer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(application_id): ApiPath<Uuid>,
) -> Result<Json<DataResponse<Application>>, ApiError> {
    respond_to_offer(&state, &user, application_id, ApplicationStatus::Accepted).await
}

pub async fn reject_offer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(application_id): ApiPath<Uuid>,
) -> Result<Json<DataResponse<Application>>, ApiError> {
    respond_to_offer(&state, &user, application_id, ApplicationStatus::Rejected).await
}

async fn respond_to_offer(
    state: &AppState,
    user: &AuthUser,
    application_id: Uuid,
    to: ApplicationStatus,
) -> Result<Json<DataResponse<Application>>, ApiError> {
    let student = own_profile(state, user).await?;
    let application =
        workflow::transition(state, application_id, to, Actor::Student(student.id)).await?;
    Ok(Json(DataResponse::new(application)))
}

pub async fn list_companies(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<CompanyProfile>>>, ApiError> {
    let companies = run_db(&state, |db| db.list_companies(true)).await?;
    let companies = companies.into_iter().map(|c| c.company).collect();
    Ok(Json(DataResponse::new(companies)))
}

pub async fn get_company(
    State(state): State<AppState>,
    ApiPath(company_id): ApiPath<Uuid>,
) -> Result<Json<DataResponse<CompanyWithRoles>>, ApiError> {
    let found = run_db(&state, move |db| {
        let Some(company) = db.get_company(company_id)? else {
            return Ok(None);
        };
        let roles = db.list_roles(Some(company_id))?;
        Ok(Some(CompanyWithRoles { company, roles }))
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Company not found"))?;
    Ok(Json(DataResponse::new(found)))
}

pub async fn list_roles(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RoleQuery>,
) -> Result<Json<DataResponse<Vec<RolePosting>>>, ApiError> {
    let roles = run_db(&state, move |db| db.list_roles(query.company_id)).await?;
    Ok(Json(DataResponse::new(roles)))
}
