use anyhow::bail;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{info, warn};
use uuid::Uuid;

use placement_db::Database;
use placement_db::models::{Insert, NewCompany, NewProfile, NewStudent, NewUser};
use placement_types::api::{
    AddCompanyRequest, BulkCreated, BulkFailure, BulkStudentEntry, BulkUploadResponse,
    DataResponse, MessageResponse, VerifyCompanyRequest,
};
use placement_types::models::{CompanyProfile, UserRole};

use crate::auth::{
    AppState, duplicate_message, hash_password, normalize_email, validate_cgpa, validate_password,
};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::run_db;

/// Seed the operator's admin account at startup. Returns `false` when an
/// admin with this email already exists. An email held by any other role is
/// an error so a student or company is never silently promoted.
pub fn ensure_admin(db: &Database, email: &str, password: &str) -> anyhow::Result<bool> {
    let email = normalize_email(email)?;
    validate_password(password)?;

    if let Some(existing) = db.get_user_by_email(&email)? {
        if existing.role != UserRole::Admin {
            bail!("{email} is already registered as {}", existing.role);
        }
        info!("Admin account {email} already present");
        return Ok(false);
    }

    let user = NewUser {
        email: email.clone(),
        password_hash: hash_password(password)?,
        name: "Administrator".into(),
        role: UserRole::Admin,
    };
    match db.create_account(&user, &NewProfile::None)? {
        Insert::Inserted(row) => {
            info!("Seeded admin account {} ({})", row.email, row.id);
            Ok(true)
        }
        Insert::Duplicate(_) => Ok(false),
    }
}

/// Create a company account. Admin-created companies start verified.
pub async fn add_company(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AddCompanyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::validation("Company name is required"));
    }
    let email = normalize_email(&req.email)?;
    validate_password(&req.password)?;

    let user = NewUser {
        email,
        password_hash: hash_password(&req.password)?,
        name: name.clone(),
        role: UserRole::Company,
    };
    let profile = NewProfile::Company(NewCompany {
        name,
        description: req.description,
        website: req.website,
        industry: None,
        verified: true,
    });

    let company = run_db(&state, move |db| match db.create_account(&user, &profile)? {
        Insert::Inserted(row) => Ok(Insert::Inserted(db.get_company_by_user(row.id)?)),
        Insert::Duplicate(columns) => Ok(Insert::Duplicate(columns)),
    })
    .await?;

    match company {
        Insert::Inserted(Some(company)) => {
            info!("Admin created company {} ({})", company.name, company.id);
            Ok((StatusCode::CREATED, Json(DataResponse::new(company))))
        }
        Insert::Inserted(None) => {
            Err(anyhow::anyhow!("Company profile missing right after creation").into())
        }
        Insert::Duplicate(columns) => Err(ApiError::Conflict(duplicate_message(&columns))),
    }
}

/// Delete a company together with its user, roles and applications.
pub async fn delete_company(
    State(state): State<AppState>,
    ApiPath(company_id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let company = run_db(&state, move |db| db.get_company(company_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;

    if !run_db(&state, move |db| db.delete_company(company_id)).await? {
        return Err(ApiError::not_found("Company not found"));
    }
    if let Some(logo) = &company.logo {
        state.uploads.remove(logo).await;
    }

    warn!("Admin deleted company {} ({})", company.name, company.id);
    Ok(Json(MessageResponse::ok("Company deleted")))
}

pub async fn verify_company(
    State(state): State<AppState>,
    ApiPath(company_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<VerifyCompanyRequest>,
) -> Result<Json<DataResponse<CompanyProfile>>, ApiError> {
    let company = run_db(&state, move |db| db.set_company_verified(company_id, req.verified))
        .await?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;

    info!("Company {} verified={}", company.id, company.verified);
    Ok(Json(DataResponse::new(company)))
}

/// Create students row by row. One bad row never blocks the others.
pub async fn bulk_students(
    State(state): State<AppState>,
    ApiJson(entries): ApiJson<Vec<BulkStudentEntry>>,
) -> Result<Json<DataResponse<BulkUploadResponse>>, ApiError> {
    if entries.is_empty() {
        return Err(ApiError::validation("No students provided"));
    }

    let mut report = BulkUploadResponse::default();
    for entry in entries {
        let email = entry.email.clone();
        match create_student(&state, entry).await {
            Ok(()) => report.results.push(BulkCreated {
                email,
                status: "created".into(),
            }),
            Err(ApiError::Internal(e)) => return Err(ApiError::Internal(e)),
            Err(e) => report.errors.push(BulkFailure {
                email,
                message: e.to_string(),
            }),
        }
    }

    info!(
        "Bulk student upload: {} created, {} failed",
        report.results.len(),
        report.errors.len()
    );
    Ok(Json(DataResponse::new(report)))
}

async fn create_student(state: &AppState, entry: BulkStudentEntry) -> Result<(), ApiError> {
    let name = entry.name.trim().to_string();
    let roll_no = entry.roll_no.trim().to_string();
    if name.is_empty() || roll_no.is_empty() {
        return Err(ApiError::validation("Name and roll number are required"));
    }
    let email = normalize_email(&entry.email)?;
    validate_password(&entry.password)?;
    validate_cgpa(entry.cgpa)?;

    let user = NewUser {
        email,
        password_hash: hash_password(&entry.password)?,
        name,
        role: UserRole::Student,
    };
    let profile = NewProfile::Student(NewStudent {
        roll_no,
        branch: entry.branch.trim().to_string(),
        year: entry.year.trim().to_string(),
        cgpa: entry.cgpa,
    });

    match run_db(state, move |db| db.create_account(&user, &profile)).await? {
        Insert::Inserted(_) => Ok(()),
        Insert::Duplicate(columns) => Err(ApiError::Conflict(duplicate_message(&columns))),
    }
}
