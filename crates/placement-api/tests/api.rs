use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use placement_api::admin::ensure_admin;
use placement_api::notifier::{LogNotifier, Notifier, Recipient};
use placement_api::uploads::{MAX_UPLOAD_BYTES, UploadStore};
use placement_api::{AppState, AppStateInner, auth::create_token, router};
use placement_db::Database;
use placement_db::models::{Insert, NewProfile, NewUser};
use placement_types::api::Claims;
use placement_types::models::UserRole;

const SECRET: &str = "integration-test-secret";
const PASSWORD: &str = "password123";
const BOUNDARY: &str = "----placement-test-boundary";

struct TestApp {
    router: Router,
    state: AppState,
    upload_dir: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

fn app_with(notifier: Arc<dyn Notifier>) -> TestApp {
    let upload_dir = std::env::temp_dir().join(format!("placement-api-test-{}", Uuid::new_v4()));
    let db = Database::open_in_memory().unwrap();
    let state = AppStateInner::new(db, SECRET.into(), UploadStore::new(&upload_dir), notifier);
    TestApp {
        router: router(state.clone()),
        state,
        upload_dir,
    }
}

fn app() -> TestApp {
    app_with(Arc::new(LogNotifier))
}

impl TestApp {
    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.send(json_request(method, uri, token, Some(body))).await
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(json_request("GET", uri, Some(token), None)).await
    }

    async fn register(&self, body: Value) -> String {
        let (status, res) = self.json("POST", "/api/auth/register", None, body).await;
        assert_eq!(status, StatusCode::CREATED, "{res}");
        res["token"].as_str().unwrap().to_string()
    }

    async fn student(&self, email: &str, roll_no: &str) -> String {
        self.register(json!({
            "name": "Asha Rao",
            "email": email,
            "password": PASSWORD,
            "role": "student",
            "rollNo": roll_no,
            "branch": "CSE",
            "year": "3",
            "cgpa": 8.4
        }))
        .await
    }

    async fn company(&self, email: &str, name: &str) -> String {
        self.register(json!({
            "name": "Hiring Manager",
            "email": email,
            "password": PASSWORD,
            "role": "company",
            "companyName": name,
            "description": "We build things"
        }))
        .await
    }

    /// Admins cannot self-register; seed one directly and mint its token.
    fn admin(&self) -> String {
        let user = NewUser {
            email: "admin@placement.local".into(),
            password_hash: "unused".into(),
            name: "Admin".into(),
            role: UserRole::Admin,
        };
        let inserted = self.state.db.create_account(&user, &NewProfile::None).unwrap();
        let Insert::Inserted(row) = inserted else {
            panic!("admin already exists");
        };
        create_token(SECRET, row.id, UserRole::Admin).unwrap()
    }

    async fn post_job(&self, token: &str, title: &str) -> String {
        let (status, res) = self
            .json(
                "POST",
                "/api/company/jobs",
                Some(token),
                json!({
                    "title": title,
                    "description": "Work on the placement portal",
                    "stipend": "25000",
                    "eligibility": "CGPA 7+"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{res}");
        res["data"]["id"].as_str().unwrap().to_string()
    }

    async fn upload_resume(&self, token: &str) -> String {
        let (status, res) = self
            .send(multipart_request(
                "/api/student/resume",
                token,
                &[],
                Some(("resume", "cv.pdf", "application/pdf", b"%PDF-1.4 test resume".as_slice())),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "{res}");
        res["filePath"].as_str().unwrap().to_string()
    }
}

fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn multipart_request(
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, filename, mime, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{filename}\"\r\nContent-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn set_status(id: &str, status: &str) -> (String, Value) {
    (format!("/api/company/applicant/{id}/status"), json!({ "status": status }))
}

// -- Auth --

#[tokio::test]
async fn ping_answers_pong() {
    let app = app();
    let (status, body) = app.send(json_request("GET", "/api/ping", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "pong");
}

#[tokio::test]
async fn register_then_login_returns_profile() {
    let app = app();
    app.student("asha@uni.edu", "CS001").await;

    let (status, body) = app
        .json(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "ASHA@uni.edu", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["role"], "student");
    assert_eq!(body["profile"]["rollNo"], "CS001");

    let (status, body) = app
        .json(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "asha@uni.edu", "password": "not-the-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn register_refuses_admin_and_duplicates() {
    let app = app();
    let (status, _) = app
        .json(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "name": "Eve",
                "email": "eve@uni.edu",
                "password": PASSWORD,
                "role": "ADMIN"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.student("asha@uni.edu", "CS001").await;
    let (status, body) = app
        .json(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "name": "Asha",
                "email": "asha@uni.edu",
                "password": PASSWORD,
                "role": "student"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
async fn role_gate_uses_the_stored_role() {
    let app = app();
    let student = app.student("asha@uni.edu", "CS001").await;

    let (status, _) = app.get("/api/admin/stats", &student).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get("/api/company/profile", &student).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get("/api/faculty/students", &student).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(json_request("GET", "/api/student/profile", None, None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app.get("/api/student/profile", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get("/api/student/profile", &student).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "asha@uni.edu");
}

#[tokio::test]
async fn token_for_deleted_user_is_rejected() {
    let app = app();
    let token = create_token(SECRET, Uuid::new_v4(), UserRole::Student).unwrap();
    let (status, _) = app.get("/api/student/profile", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

fn signed_token(secret: &str, user_id: Uuid, exp: usize) -> String {
    let claims = Claims {
        sub: user_id,
        role: UserRole::Student,
        exp,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
}

#[tokio::test]
async fn foreign_and_expired_tokens_are_rejected() {
    let app = app();
    let student = app.student("asha@uni.edu", "CS001").await;
    let (_, body) = app.get("/api/student/profile", &student).await;
    let user_id: Uuid = body["data"]["userId"].as_str().unwrap().parse().unwrap();

    let forged = signed_token("some-other-secret", user_id, 4_000_000_000);
    let (status, body) = app.get("/api/student/profile", &forged).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let expired = signed_token(SECRET, user_id, 1_000_000);
    let (status, _) = app.get("/api/student/profile", &expired).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let fresh = create_token(SECRET, user_id, UserRole::Student).unwrap();
    let (status, _) = app.get("/api/student/profile", &fresh).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bootstrap_admin_reaches_admin_routes() {
    let app = app();
    assert!(ensure_admin(&app.state.db, "Root@Placement.Local", PASSWORD).unwrap());
    assert!(!ensure_admin(&app.state.db, "root@placement.local", PASSWORD).unwrap());

    let (status, body) = app
        .json(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "root@placement.local", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");

    let token = body["token"].as_str().unwrap();
    let (status, _) = app.get("/api/admin/stats", token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bootstrap_admin_refuses_an_existing_non_admin_email() {
    let app = app();
    app.student("asha@uni.edu", "CS001").await;
    assert!(ensure_admin(&app.state.db, "asha@uni.edu", PASSWORD).is_err());
    assert!(ensure_admin(&app.state.db, "root@placement.local", "short").is_err());
}

#[tokio::test]
async fn faculty_and_admin_share_read_only_reports() {
    let app = app();
    let faculty = app
        .register(json!({
            "name": "Dr. Iyer",
            "email": "iyer@uni.edu",
            "password": PASSWORD,
            "role": "faculty"
        }))
        .await;
    let admin = app.admin();

    let (status, _) = app.get("/api/faculty/stats", &faculty).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/api/faculty/stats", &admin).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/api/admin/stats", &faculty).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// -- Applications --

#[tokio::test]
async fn placement_scenario_ends_in_immutable_acceptance() {
    let app = app();
    let company = app.company("hr@acme.io", "Acme").await;
    let role_id = app.post_job(&company, "Backend Intern").await;

    let student = app.student("asha@uni.edu", "CS001").await;
    let resume = app.upload_resume(&student).await;
    assert!(resume.starts_with("/uploads/resumes/resume-"));

    let (status, body) = app
        .json(
            "POST",
            "/api/student/apply",
            Some(&student),
            json!({ "roleId": role_id, "useExistingResume": true }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "PENDING");
    assert_eq!(body["data"]["resumeUrl"], resume.as_str());
    let application_id = body["data"]["id"].as_str().unwrap().to_string();

    let (uri, req) = set_status(&application_id, "shortlisted");
    let (status, body) = app.json("PUT", &uri, Some(&company), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "SHORTLISTED");

    let (uri, req) = set_status(&application_id, "ACCEPTED");
    let (status, body) = app.json("PUT", &uri, Some(&company), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ACCEPTED");

    let (uri, req) = set_status(&application_id, "REJECTED");
    let (status, body) = app.json("PUT", &uri, Some(&company), req).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (uri, req) = set_status(&application_id, "HIRED");
    let (status, _) = app.json("PUT", &uri, Some(&company), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get("/api/student/applications", &student).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["status"], "ACCEPTED");
    assert_eq!(body["data"][0]["companyName"], "Acme");
    assert_eq!(body["data"][0]["roleTitle"], "Backend Intern");

    let (status, body) = app.get("/api/company/dashboard", &company).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalRoles"], 1);
    assert_eq!(body["data"]["applicationsByStatus"]["accepted"], 1);
}

#[tokio::test]
async fn applying_twice_is_a_conflict() {
    let app = app();
    let company = app.company("hr@acme.io", "Acme").await;
    let role_id = app.post_job(&company, "Backend Intern").await;
    let student = app.student("asha@uni.edu", "CS001").await;
    app.upload_resume(&student).await;

    let apply = json!({ "roleId": role_id });
    let (status, _) = app.json("POST", "/api/student/apply", Some(&student), apply.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.json("POST", "/api/student/apply", Some(&student), apply).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "You have already applied for this role");
}

#[tokio::test]
async fn reapplying_without_any_resume_is_still_a_conflict() {
    let app = app();
    let company = app.company("hr@acme.io", "Acme").await;
    let role_id = app.post_job(&company, "Backend Intern").await;
    let student = app.student("asha@uni.edu", "CS001").await;

    let (status, body) = app
        .send(multipart_request(
            "/api/student/apply",
            &student,
            &[("roleId", role_id.as_str())],
            Some(("resume", "fresh.pdf", "application/pdf", b"%PDF-1.4 fresh".as_slice())),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = app
        .json("POST", "/api/student/apply", Some(&student), json!({ "roleId": role_id }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "You have already applied for this role");
}

#[tokio::test]
async fn concurrent_applications_produce_one_row() {
    let app = app();
    let company = app.company("hr@acme.io", "Acme").await;
    let role_id = app.post_job(&company, "Backend Intern").await;
    let student = app.student("asha@uni.edu", "CS001").await;
    app.upload_resume(&student).await;

    let apply = json!({ "roleId": role_id });
    let (a, b) = tokio::join!(
        app.json("POST", "/api/student/apply", Some(&student), apply.clone()),
        app.json("POST", "/api/student/apply", Some(&student), apply.clone()),
    );
    let mut statuses = [a.0, b.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);

    let (_, body) = app.get("/api/company/applicants", &company).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn apply_requires_some_resume() {
    let app = app();
    let company = app.company("hr@acme.io", "Acme").await;
    let role_id = app.post_job(&company, "Backend Intern").await;
    let student = app.student("asha@uni.edu", "CS001").await;

    let (status, body) = app
        .json("POST", "/api/student/apply", Some(&student), json!({ "roleId": role_id }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please upload a resume");

    let (status, _) = app
        .json(
            "POST",
            "/api/student/apply",
            Some(&student),
            json!({ "roleId": Uuid::new_v4() }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn multipart_apply_prefers_the_uploaded_file() {
    let app = app();
    let company = app.company("hr@acme.io", "Acme").await;
    let role_id = app.post_job(&company, "Backend Intern").await;
    let student = app.student("asha@uni.edu", "CS001").await;
    let stored = app.upload_resume(&student).await;

    let (status, body) = app
        .send(multipart_request(
            "/api/student/apply",
            &student,
            &[("roleId", role_id.as_str()), ("useExistingResume", "false")],
            Some(("resume", "fresh.pdf", "application/pdf", b"%PDF-1.4 fresh".as_slice())),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let used = body["data"]["resumeUrl"].as_str().unwrap();
    assert_ne!(used, stored);
    assert!(used.starts_with("/uploads/resumes/"));
}

#[tokio::test]
async fn company_cannot_touch_another_companys_applicants() {
    let app = app();
    let acme = app.company("hr@acme.io", "Acme").await;
    let globex = app.company("hr@globex.io", "Globex").await;
    let role_id = app.post_job(&acme, "Backend Intern").await;
    let student = app.student("asha@uni.edu", "CS001").await;
    app.upload_resume(&student).await;

    let (_, body) = app
        .json("POST", "/api/student/apply", Some(&student), json!({ "roleId": role_id }))
        .await;
    let application_id = body["data"]["id"].as_str().unwrap().to_string();

    let (uri, req) = set_status(&application_id, "SHORTLISTED");
    let (status, _) = app.json("PUT", &uri, Some(&globex), req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .json(
            "PUT",
            &format!("/api/company/jobs/{role_id}"),
            Some(&globex),
            json!({ "title": "Hijacked" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (uri, req) = set_status(&Uuid::new_v4().to_string(), "SHORTLISTED");
    let (status, _) = app.json("PUT", &uri, Some(&acme), req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn student_can_accept_only_their_own_offer() {
    let app = app();
    let company = app.company("hr@acme.io", "Acme").await;
    let role_id = app.post_job(&company, "Backend Intern").await;
    let asha = app.student("asha@uni.edu", "CS001").await;
    let ravi = app.student("ravi@uni.edu", "CS002").await;
    app.upload_resume(&asha).await;

    let (_, body) = app
        .json("POST", "/api/student/apply", Some(&asha), json!({ "roleId": role_id }))
        .await;
    let application_id = body["data"]["id"].as_str().unwrap().to_string();

    let uri = format!("/api/student/applications/{application_id}/accept");
    let (status, _) = app.json("PUT", &uri, Some(&ravi), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.json("PUT", &uri, Some(&asha), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ACCEPTED");

    let uri = format!("/api/student/applications/{application_id}/reject");
    let (status, _) = app.json("PUT", &uri, Some(&asha), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

// -- Profiles --

#[tokio::test]
async fn company_about_round_trip_keeps_other_fields() {
    let app = app();
    let company = app.company("hr@acme.io", "Acme").await;

    let (_, before) = app.get("/api/company/profile", &company).await;

    let (status, _) = app
        .json(
            "PUT",
            "/api/company/profile",
            Some(&company),
            json!({ "about": "Rockets and roadrunners" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, after) = app.get("/api/company/profile", &company).await;
    assert_eq!(after["data"]["about"], "Rockets and roadrunners");
    assert_eq!(after["data"]["description"], "Rockets and roadrunners");
    for field in ["id", "name", "website", "verified", "address", "socialMedia", "createdAt"] {
        assert_eq!(after["data"][field], before["data"][field], "{field} changed");
    }
}

#[tokio::test]
async fn company_profile_accepts_about_and_description_together() {
    let app = app();
    let company = app.company("hr@acme.io", "Acme").await;

    let (status, body) = app
        .json(
            "PUT",
            "/api/company/profile",
            Some(&company),
            json!({ "description": "Old", "about": "New text" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["about"], "New text");
    assert_eq!(body["data"]["description"], "New text");

    // The profile as fetched can be sent straight back.
    let (_, fetched) = app.get("/api/company/profile", &company).await;
    let (status, body) = app
        .json("PUT", "/api/company/profile", Some(&company), fetched["data"].clone())
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["about"], "New text");
}

#[tokio::test]
async fn company_profile_update_is_validated() {
    let app = app();
    let company = app.company("hr@acme.io", "Acme").await;
    let (status, _) = app
        .json("PUT", "/api/company/profile", Some(&company), json!({ "foundedYear": 1700 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logo_upload_checks_type() {
    let app = app();
    let company = app.company("hr@acme.io", "Acme").await;

    let (status, _) = app
        .send(multipart_request(
            "/api/company/logo",
            &company,
            &[],
            Some(("logo", "logo.exe", "application/octet-stream", b"MZ".as_slice())),
        ))
        .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let (status, body) = app
        .send(multipart_request(
            "/api/company/logo",
            &company,
            &[],
            Some(("logo", "logo.png", "image/png", b"\x89PNG fake".as_slice())),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let path = body["filePath"].as_str().unwrap().to_string();
    assert!(path.starts_with("/uploads/logos/logo-"));

    let res = app
        .router
        .clone()
        .oneshot(Request::builder().uri(&path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let (status, _) = app
        .send(json_request("DELETE", "/api/company/logo", Some(&company), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, profile) = app.get("/api/company/profile", &company).await;
    assert!(profile["data"]["logo"].is_null());
}

#[tokio::test]
async fn oversize_resume_is_rejected() {
    let app = app();
    let student = app.student("asha@uni.edu", "CS001").await;
    let big = vec![b'%'; MAX_UPLOAD_BYTES + 1];

    let (status, body) = app
        .send(multipart_request(
            "/api/student/resume",
            &student,
            &[],
            Some(("resume", "big.pdf", "application/pdf", big.as_slice())),
        ))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["message"], "File too large (max 5MB)");

    let (_, profile) = app.get("/api/student/profile", &student).await;
    assert!(profile["data"]["resumeUrl"].is_null());
}

#[tokio::test]
async fn student_profile_update_validates_cgpa() {
    let app = app();
    let student = app.student("asha@uni.edu", "CS001").await;

    let (status, _) = app
        .json("PUT", "/api/student/profile", Some(&student), json!({ "cgpa": 11.0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .json(
            "PUT",
            "/api/student/profile",
            Some(&student),
            json!({ "skills": ["rust", "sql"], "github": "asha-rao" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["skills"], json!(["rust", "sql"]));
    assert_eq!(body["data"]["cgpa"], 8.4);
}

// -- Admin --

#[tokio::test]
async fn admin_manages_companies_and_bulk_students() {
    let app = app();
    let admin = app.admin();

    let (status, body) = app
        .json(
            "POST",
            "/api/admin/company",
            Some(&admin),
            json!({ "name": "Initech", "email": "hr@initech.io", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["verified"], true);
    let company_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .json(
            "PUT",
            &format!("/api/admin/company/{company_id}/verify"),
            Some(&admin),
            json!({ "verified": false }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["verified"], false);

    let (status, body) = app
        .json(
            "POST",
            "/api/admin/student/bulk",
            Some(&admin),
            json!([
                {
                    "name": "A",
                    "email": "a@uni.edu",
                    "password": PASSWORD,
                    "rollNo": "R1",
                    "branch": "CSE",
                    "year": "2",
                    "cgpa": 7.5
                },
                {
                    "name": "B",
                    "email": "b@uni.edu",
                    "password": "short",
                    "rollNo": "R2",
                    "branch": "CSE",
                    "year": "2",
                    "cgpa": 7.5
                },
                {
                    "name": "C",
                    "email": "c@uni.edu",
                    "password": PASSWORD,
                    "rollNo": "R1",
                    "branch": "ECE",
                    "year": "2",
                    "cgpa": 6.0
                }
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["errors"].as_array().unwrap().len(), 2);

    let (_, stats) = app.get("/api/admin/stats", &admin).await;
    assert_eq!(stats["data"]["totalStudents"], 1);
    assert_eq!(stats["data"]["totalCompanies"], 1);

    let (status, _) = app
        .send(json_request(
            "DELETE",
            &format!("/api/admin/company/{company_id}"),
            Some(&admin),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, companies) = app.get("/api/admin/companies", &admin).await;
    assert!(companies["data"].as_array().unwrap().is_empty());

    let (status, _) = app
        .json(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "hr@initech.io", "password": PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// -- OTP --

#[derive(Default)]
struct CapturingNotifier {
    sent: Mutex<Vec<(Recipient, String)>>,
}

#[async_trait]
impl Notifier for CapturingNotifier {
    async fn send_otp(&self, to: &Recipient, code: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push((to.clone(), code.to_string()));
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send_otp(&self, _to: &Recipient, _code: &str) -> anyhow::Result<()> {
        anyhow::bail!("provider unavailable")
    }
}

#[tokio::test]
async fn otp_is_delivered_and_consumed_once() {
    let notifier = Arc::new(CapturingNotifier::default());
    let app = app_with(notifier.clone());

    let (status, _) = app
        .json("POST", "/api/auth/otp/request", None, json!({ "phoneNumber": "9876543210" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (to, code) = notifier.sent.lock().unwrap()[0].clone();
    assert_eq!(to, Recipient::Phone("+919876543210".into()));

    let verify = json!({ "phoneNumber": "9876543210", "otp": code });
    let (status, _) = app.json("POST", "/api/auth/otp/verify", None, verify.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.json("POST", "/api/auth/otp/verify", None, verify).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn otp_delivery_failure_is_reported() {
    let app = app_with(Arc::new(FailingNotifier));
    let (status, body) = app
        .json("POST", "/api/auth/otp/request", None, json!({ "email": "asha@uni.edu" }))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
}
