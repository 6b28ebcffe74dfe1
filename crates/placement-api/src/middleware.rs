use axum::{
    Extension,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::{debug, warn};
use uuid::Uuid;

use placement_types::api::Claims;
use placement_types::models::UserRole;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::run_db;

/// The authenticated caller, loaded fresh from the users table.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

/// Validate the bearer JWT, load its user and attach an [`AuthUser`].
pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|e| {
        debug!("Missing or malformed Authorization header: {}", e);
        ApiError::Unauthorized("Not authorized, no token".into())
    })?;

    let token_data = decode::<Claims>(
        bearer.token(),
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        debug!("Rejected token: {}", e);
        ApiError::Unauthorized("Not authorized, token failed".into())
    })?;

    let user_id = token_data.claims.sub;
    let user = run_db(&state, move |db| db.get_user_by_id(user_id))
        .await?
        .ok_or_else(|| {
            debug!("Token names unknown user {}", user_id);
            ApiError::Unauthorized("Not authorized, user not found".into())
        })?;

    req.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
    });
    Ok(next.run(req).await)
}

fn ensure_role(user: &AuthUser, allowed: &[UserRole]) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        return Ok(());
    }
    warn!("{} ({}) denied: requires {:?}", user.email, user.role, allowed);
    Err(ApiError::forbidden(format!(
        "User role {} is not authorized to access this route",
        user.role
    )))
}

pub async fn require_student(
    Extension(user): Extension<AuthUser>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    ensure_role(&user, &[UserRole::Student])?;
    Ok(next.run(req).await)
}

pub async fn require_company(
    Extension(user): Extension<AuthUser>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    ensure_role(&user, &[UserRole::Company])?;
    Ok(next.run(req).await)
}

pub async fn require_admin(
    Extension(user): Extension<AuthUser>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    ensure_role(&user, &[UserRole::Admin])?;
    Ok(next.run(req).await)
}

/// Faculty routes are read-only reports; admins see them too.
pub async fn require_faculty(
    Extension(user): Extension<AuthUser>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    ensure_role(&user, &[UserRole::Faculty, UserRole::Admin])?;
    Ok(next.run(req).await)
}
