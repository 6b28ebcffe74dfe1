use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{debug, info};
use uuid::Uuid;

use placement_db::Database;
use placement_db::models::{Insert, NewCompany, NewProfile, NewStudent, NewUser, UserRow};
use placement_types::api::{
    AuthResponse, Claims, LoginRequest, MessageResponse, OtpRequest, OtpVerifyRequest, Profile,
    RegisterRequest,
};
use placement_types::models::UserRole;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::notifier::{Notifier, Recipient};
use crate::otp::OtpStore;
use crate::run_db;
use crate::uploads::UploadStore;

/// Token lifetime.
const TOKEN_TTL_DAYS: i64 = 30;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub uploads: UploadStore,
    pub otp: OtpStore,
    pub notifier: Arc<dyn Notifier>,
}

impl AppStateInner {
    pub fn new(
        db: Database,
        jwt_secret: String,
        uploads: UploadStore,
        notifier: Arc<dyn Notifier>,
    ) -> AppState {
        Arc::new(Self {
            db,
            jwt_secret,
            uploads,
            otp: OtpStore::new(),
            notifier,
        })
    }
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::validation("Name is required"));
    }
    let email = normalize_email(&req.email)?;
    validate_password(&req.password)?;

    let profile = match req.role {
        UserRole::Admin => {
            return Err(ApiError::forbidden("Admin accounts cannot be self-registered"));
        }
        UserRole::Student => {
            let cgpa = req.cgpa.unwrap_or(0.0);
            validate_cgpa(cgpa)?;
            NewProfile::Student(NewStudent {
                roll_no: non_empty(req.roll_no).unwrap_or_else(placeholder_roll_no),
                branch: non_empty(req.branch).unwrap_or_else(|| "N/A".into()),
                year: non_empty(req.year).unwrap_or_else(|| "N/A".into()),
                cgpa,
            })
        }
        UserRole::Company => NewProfile::Company(NewCompany {
            name: non_empty(req.company_name).unwrap_or_else(|| name.clone()),
            description: non_empty(req.description),
            website: non_empty(req.website),
            industry: req.industry,
            verified: false,
        }),
        UserRole::Faculty => NewProfile::None,
    };

    let user = NewUser {
        email,
        password_hash: hash_password(&req.password)?,
        name,
        role: req.role,
    };

    let row = match run_db(&state, move |db| db.create_account(&user, &profile)).await? {
        Insert::Inserted(row) => row,
        Insert::Duplicate(columns) => return Err(ApiError::Conflict(duplicate_message(&columns))),
    };

    info!("Registered {} account {}", row.role, row.email);
    let response = auth_response(&state, row).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = req.email.trim().to_lowercase();
    let invalid = || ApiError::Unauthorized("Invalid credentials".into());

    let user = run_db(&state, move |db| db.get_user_by_email(&email))
        .await?
        .ok_or_else(invalid)?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| anyhow::anyhow!("Stored password hash for {} is unreadable: {}", user.id, e))?;

    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        debug!("Password mismatch for {}", user.email);
        return Err(invalid());
    }

    Ok(Json(auth_response(&state, user).await?))
}

pub async fn request_otp(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<OtpRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let to = Recipient::from_parts(req.email.as_deref(), req.phone_number.as_deref())
        .ok_or_else(|| ApiError::validation("Email or phone number is required"))?;

    let code = state.otp.issue(to.as_str())?;
    if let Err(e) = state.notifier.send_otp(&to, &code).await {
        state.otp.discard(to.as_str(), &code);
        return Err(ApiError::Delivery(e));
    }

    Ok(Json(MessageResponse::ok("OTP sent")))
}

pub async fn verify_otp(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<OtpVerifyRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let to = Recipient::from_parts(req.email.as_deref(), req.phone_number.as_deref())
        .ok_or_else(|| ApiError::validation("Email or phone number is required"))?;

    state.otp.verify(to.as_str(), &req.otp)?;
    Ok(Json(MessageResponse::ok("OTP verified")))
}

/// Token plus the caller's role profile, as returned by login and register.
async fn auth_response(state: &AppState, user: UserRow) -> Result<AuthResponse, ApiError> {
    let token = create_token(&state.jwt_secret, user.id, user.role)?;

    let (user_id, role) = (user.id, user.role);
    let profile = run_db(state, move |db| {
        Ok(match role {
            UserRole::Student => db.get_student_by_user(user_id)?.map(Profile::Student),
            UserRole::Company => db.get_company_by_user(user_id)?.map(Profile::Company),
            UserRole::Faculty | UserRole::Admin => None,
        })
    })
    .await?;

    Ok(AuthResponse {
        success: true,
        token,
        role,
        user: user.into(),
        profile,
    })
}

pub fn create_token(secret: &str, user_id: Uuid, role: UserRole) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        role,
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Hash with Argon2id and a random salt.
pub(crate) fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

pub(crate) fn normalize_email(raw: &str) -> Result<String, ApiError> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(ApiError::validation("A valid email is required")),
    }
}

pub(crate) fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < 8 {
        return Err(ApiError::validation("Password must be at least 8 characters"));
    }
    Ok(())
}

pub(crate) fn validate_cgpa(cgpa: f64) -> Result<(), ApiError> {
    if !(0.0..=10.0).contains(&cgpa) {
        return Err(ApiError::validation("CGPA must be between 0 and 10"));
    }
    Ok(())
}

pub(crate) fn duplicate_message(columns: &str) -> String {
    if columns.contains("roll_no") {
        "Roll number is already registered".into()
    } else {
        "User already exists".into()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Roll numbers are unique, so students who register without one get a
/// distinct placeholder.
fn placeholder_roll_no() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("N/A-{}", &id[..8])
}
