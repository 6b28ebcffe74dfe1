use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};
use tower_http::services::ServeDir;

use crate::auth::{self, AppState};
use crate::middleware::{
    require_admin, require_auth, require_company, require_faculty, require_student,
};
use crate::uploads::{PUBLIC_PREFIX, UPLOAD_BODY_LIMIT};
use crate::{admin, company, reports, student};

/// The full HTTP surface. CORS and request tracing are layered on by the server.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/ping", get(ping))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/otp/request", post(auth::request_otp))
        .route("/api/auth/otp/verify", post(auth::verify_otp));

    let student = Router::new()
        .route("/profile", get(student::get_profile).put(student::update_profile))
        .route(
            "/resume",
            post(student::upload_resume).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/applications", get(student::list_applications))
        .route(
            "/apply",
            post(student::apply).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/applications/{id}/accept", put(student::accept_offer))
        .route("/applications/{id}/reject", put(student::reject_offer))
        .route("/companies", get(student::list_companies))
        .route("/companies/{id}", get(student::get_company))
        .route("/roles", get(student::list_roles))
        .route_layer(middleware::from_fn(require_student));

    let company = Router::new()
        .route("/profile", get(company::get_profile).put(company::update_profile))
        .route(
            "/logo",
            post(company::upload_logo)
                .delete(company::delete_logo)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/jobs", get(company::list_jobs).post(company::create_job))
        .route("/jobs/{id}", put(company::update_job).delete(company::delete_job))
        .route("/applicants", get(company::list_applicants))
        .route("/applicant/{id}/status", put(company::update_applicant_status))
        .route("/dashboard", get(company::dashboard))
        .route_layer(middleware::from_fn(require_company));

    let admin = Router::new()
        .route("/company", post(admin::add_company))
        .route("/companies", get(reports::list_companies))
        .route("/company/{id}", delete(admin::delete_company))
        .route("/company/{id}/verify", put(admin::verify_company))
        .route("/student/bulk", post(admin::bulk_students))
        .route("/students", get(reports::list_students))
        .route("/applications", get(reports::list_applications))
        .route("/stats", get(reports::stats))
        .route_layer(middleware::from_fn(require_admin));

    let faculty = Router::new()
        .route("/students", get(reports::list_students))
        .route("/companies", get(reports::list_companies))
        .route("/applications", get(reports::list_applications))
        .route("/stats", get(reports::stats))
        .route_layer(middleware::from_fn(require_faculty));

    let protected = Router::new()
        .nest("/api/student", student)
        .nest("/api/company", company)
        .nest("/api/admin", admin)
        .nest("/api/faculty", faculty)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .nest_service(PUBLIC_PREFIX, ServeDir::new(state.uploads.root()))
        .with_state(state)
}

async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}
