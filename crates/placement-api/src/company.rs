use axum::{
    Extension, Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Datelike;
use tracing::info;
use uuid::Uuid;

use placement_db::models::ApplicationScope;
use placement_types::api::{
    CompanyDashboard, CompanyProfileUpdate, CreateRoleRequest, DataResponse, MessageResponse,
    UpdateRoleRequest, UpdateStatusRequest, UploadResponse,
};
use placement_types::models::{Application, ApplicationDetail, CompanyProfile, RolePosting};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, single_file};
use crate::middleware::AuthUser;
use crate::run_db;
use crate::uploads::UploadKind;
use crate::workflow::{self, Actor};

const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 2000;
const RECENT_APPLICATIONS: u32 = 5;

async fn own_company(state: &AppState, user: &AuthUser) -> Result<CompanyProfile, ApiError> {
    let user_id = user.id;
    run_db(state, move |db| db.get_company_by_user(user_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Company profile not found"))
}

/// Load a role and check it belongs to `company`.
async fn own_role(
    state: &AppState,
    company: &CompanyProfile,
    role_id: Uuid,
) -> Result<RolePosting, ApiError> {
    let role = run_db(state, move |db| db.get_role(role_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Role not found"))?;
    if role.company_id != company.id {
        return Err(ApiError::forbidden("Not authorized to modify this role"));
    }
    Ok(role)
}

// -- Profile --

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DataResponse<CompanyProfile>>, ApiError> {
    let company = own_company(&state, &user).await?;
    Ok(Json(DataResponse::new(company)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(update): ApiJson<CompanyProfileUpdate>,
) -> Result<Json<DataResponse<CompanyProfile>>, ApiError> {
    validate_profile_update(&update)?;
    let company = own_company(&state, &user).await?;

    let company_id = company.id;
    let updated = run_db(&state, move |db| db.update_company(company_id, &update))
        .await?
        .ok_or_else(|| ApiError::not_found("Company profile not found"))?;

    info!("Company {} updated its profile", company_id);
    Ok(Json(DataResponse::new(updated)))
}

pub async fn upload_logo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let company = own_company(&state, &user).await?;
    let file = single_file(multipart, "logo").await?;
    let file_path = state.uploads.save(UploadKind::Logo, &file).await?;

    let stored = file_path.clone();
    run_db(&state, move |db| db.set_company_logo(company.id, Some(&stored))).await?;

    if let Some(previous) = &company.logo {
        state.uploads.remove(previous).await;
    }

    Ok(Json(UploadResponse {
        success: true,
        file_path,
    }))
}

pub async fn delete_logo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MessageResponse>, ApiError> {
    let company = own_company(&state, &user).await?;
    let Some(logo) = company.logo else {
        return Err(ApiError::not_found("No logo to delete"));
    };

    run_db(&state, move |db| db.set_company_logo(company.id, None)).await?;
    state.uploads.remove(&logo).await;

    Ok(Json(MessageResponse::ok("Logo deleted")))
}

// -- Jobs --

pub async fn list_jobs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DataResponse<Vec<RolePosting>>>, ApiError> {
    let company = own_company(&state, &user).await?;
    let roles = run_db(&state, move |db| db.list_roles(Some(company.id))).await?;
    Ok(Json(DataResponse::new(roles)))
}

pub async fn create_job(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(req): ApiJson<CreateRoleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    for (field, value) in [
        ("title", &req.title),
        ("description", &req.description),
        ("stipend", &req.stipend),
        ("eligibility", &req.eligibility),
    ] {
        if value.trim().is_empty() {
            return Err(ApiError::validation(format!("{} is required", field)));
        }
    }

    let company = own_company(&state, &user).await?;
    let role = run_db(&state, move |db| db.create_role(company.id, &req)).await?;

    info!("Company {} posted role {} ({})", role.company_id, role.id, role.title);
    Ok((StatusCode::CREATED, Json(DataResponse::new(role))))
}

pub async fn update_job(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(role_id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<UpdateRoleRequest>,
) -> Result<Json<DataResponse<RolePosting>>, ApiError> {
    let blank = [&update.title, &update.description, &update.stipend, &update.eligibility]
        .into_iter()
        .flatten()
        .any(|v| v.trim().is_empty());
    if blank {
        return Err(ApiError::validation("Role fields cannot be empty"));
    }

    let company = own_company(&state, &user).await?;
    own_role(&state, &company, role_id).await?;

    let role = run_db(&state, move |db| db.update_role(role_id, &update))
        .await?
        .ok_or_else(|| ApiError::not_found("Role not found"))?;
    Ok(Json(DataResponse::new(role)))
}

pub async fn delete_job(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(role_id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let company = own_company(&state, &user).await?;
    own_role(&state, &company, role_id).await?;

    if !run_db(&state, move |db| db.delete_role(role_id)).await? {
        return Err(ApiError::not_found("Role not found"));
    }

    info!("Company {} deleted role {}", company.id, role_id);
    Ok(Json(MessageResponse::ok("Role deleted")))
}

// -- Applicants --

pub async fn list_applicants(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DataResponse<Vec<ApplicationDetail>>>, ApiError> {
    let company = own_company(&state, &user).await?;
    let applicants = run_db(&state, move |db| {
        db.list_application_details(ApplicationScope::Company(company.id), None)
    })
    .await?;
    Ok(Json(DataResponse::new(applicants)))
}

pub async fn update_applicant_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(application_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> Result<Json<DataResponse<Application>>, ApiError> {
    let company = own_company(&state, &user).await?;
    let application =
        workflow::transition(&state, application_id, req.status, Actor::Company(company.id))
            .await?;
    Ok(Json(DataResponse::new(application)))
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DataResponse<CompanyDashboard>>, ApiError> {
    let company = own_company(&state, &user).await?;
    let company_id = company.id;

    let dashboard = run_db(&state, move |db| {
        let applications_by_status = db.status_counts(Some(company_id))?;
        Ok(CompanyDashboard {
            total_roles: db.count_roles(Some(company_id))?,
            total_applications: applications_by_status.total(),
            applications_by_status,
            recent_applications: db.list_application_details(
                ApplicationScope::Company(company_id),
                Some(RECENT_APPLICATIONS),
            )?,
        })
    })
    .await?;

    Ok(Json(DataResponse::new(dashboard)))
}

// -- Validation --

fn validate_profile_update(update: &CompanyProfileUpdate) -> Result<(), ApiError> {
    if let Some(name) = &update.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::validation("Company name cannot be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ApiError::validation("Company name must be at most 100 characters"));
        }
    }
    if [&update.description, &update.about]
        .into_iter()
        .flatten()
        .any(|d| d.chars().count() > MAX_DESCRIPTION_LEN)
    {
        return Err(ApiError::validation("Description must be at most 2000 characters"));
    }
    if let Some(email) = update.contact_email.as_deref().filter(|e| !e.is_empty()) {
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid {
            return Err(ApiError::validation("Invalid contact email"));
        }
    }
    if let Some(phone) = &update.contact_phone {
        let valid = phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'));
        if !valid {
            return Err(ApiError::validation("Invalid contact phone"));
        }
    }
    if let Some(postal) = update.address.as_ref().and_then(|a| a.postal_code.as_deref()) {
        if !postal.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-')) {
            return Err(ApiError::validation("Invalid postal code"));
        }
    }
    if let Some(year) = update.founded_year {
        let current = chrono::Utc::now().year();
        if !(1800..=current).contains(&year) {
            return Err(ApiError::validation(format!(
                "Founded year must be between 1800 and {}",
                current
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use placement_types::models::Address;

    #[test]
    fn empty_update_is_valid() {
        assert!(validate_profile_update(&CompanyProfileUpdate::default()).is_ok());
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let long_name = CompanyProfileUpdate {
            name: Some("x".repeat(101)),
            ..Default::default()
        };
        assert!(validate_profile_update(&long_name).is_err());

        let future = CompanyProfileUpdate {
            founded_year: Some(chrono::Utc::now().year() + 1),
            ..Default::default()
        };
        assert!(validate_profile_update(&future).is_err());

        let phone = CompanyProfileUpdate {
            contact_phone: Some("call me".into()),
            ..Default::default()
        };
        assert!(validate_profile_update(&phone).is_err());

        let postal = CompanyProfileUpdate {
            address: Some(Address {
                postal_code: Some("56<script>".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(validate_profile_update(&postal).is_err());
    }

    #[test]
    fn accepts_plausible_contact_details() {
        let update = CompanyProfileUpdate {
            contact_email: Some("hr@acme.io".into()),
            contact_phone: Some("+91 (80) 1234-5678".into()),
            founded_year: Some(1998),
            ..Default::default()
        };
        assert!(validate_profile_update(&update).is_ok());
    }
}
