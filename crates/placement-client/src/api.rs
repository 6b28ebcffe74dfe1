//! Typed client for the portal API.

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use placement_types::api::{
    AddCompanyRequest, ApplyRequest, AuthResponse, BulkStudentEntry, BulkUploadResponse,
    CompanyDashboard, CompanyProfileUpdate, CompanyWithOwner, CompanyWithRoles,
    CreateRoleRequest, DataResponse, LoginRequest, MessageResponse, PlatformStats,
    RegisterRequest, StudentProfileUpdate, StudentWithUser, UpdateRoleRequest,
    UpdateStatusRequest, VerifyCompanyRequest,
};
use placement_types::models::{
    Application, ApplicationDetail, CompanyProfile, RolePosting,
};
use placement_types::status::ApplicationStatus;

use crate::error::ClientError;
use crate::session::{Session, SessionStore};

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(
        &self,
        store: &SessionStore,
        method: Method,
        path: &str,
    ) -> Result<RequestBuilder, ClientError> {
        let token = store.token().ok_or(ClientError::NotLoggedIn)?;
        Ok(self.http.request(method, self.url(path)).bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn data<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp: DataResponse<T> = self.send(req).await?;
        Ok(resp.data)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        store: &SessionStore,
        path: &str,
    ) -> Result<T, ClientError> {
        self.data(self.authed(store, Method::GET, path)?).await
    }

    async fn with_body<B: Serialize, T: DeserializeOwned>(
        &self,
        store: &SessionStore,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.data(self.authed(store, method, path)?.json(body)).await
    }

    async fn message(&self, req: RequestBuilder) -> Result<String, ClientError> {
        let resp: MessageResponse = self.send(req).await?;
        Ok(resp.message)
    }

    // -- Auth --

    pub async fn login<'s>(
        &self,
        store: &'s mut SessionStore,
        email: &str,
        password: &str,
    ) -> Result<&'s Session, ClientError> {
        let req = self.http.post(self.url("/api/auth/login")).json(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        });
        let auth: AuthResponse = self.send(req).await?;
        debug!("Logged in as {} ({})", auth.user.email, auth.role);
        store.set_auth(auth)
    }

    pub async fn register<'s>(
        &self,
        store: &'s mut SessionStore,
        req: &RegisterRequest,
    ) -> Result<&'s Session, ClientError> {
        let req = self.http.post(self.url("/api/auth/register")).json(req);
        let auth: AuthResponse = self.send(req).await?;
        store.set_auth(auth)
    }

    pub async fn request_otp(
        &self,
        email: Option<&str>,
        phone_number: Option<&str>,
    ) -> Result<String, ClientError> {
        let body = json!({ "email": email, "phoneNumber": phone_number });
        self.message(self.http.post(self.url("/api/auth/otp/request")).json(&body)).await
    }

    pub async fn verify_otp(
        &self,
        email: Option<&str>,
        phone_number: Option<&str>,
        otp: &str,
    ) -> Result<String, ClientError> {
        let body = json!({ "email": email, "phoneNumber": phone_number, "otp": otp });
        self.message(self.http.post(self.url("/api/auth/otp/verify")).json(&body)).await
    }

    // -- Student portal --

    pub async fn student_profile(
        &self,
        store: &SessionStore,
    ) -> Result<StudentWithUser, ClientError> {
        self.get(store, "/api/student/profile").await
    }

    pub async fn update_student_profile(
        &self,
        store: &SessionStore,
        update: &StudentProfileUpdate,
    ) -> Result<StudentWithUser, ClientError> {
        self.with_body(store, Method::PUT, "/api/student/profile", update).await
    }

    pub async fn my_applications(
        &self,
        store: &SessionStore,
    ) -> Result<Vec<ApplicationDetail>, ClientError> {
        self.get(store, "/api/student/applications").await
    }

    /// Apply with the resume already on the profile.
    pub async fn apply(
        &self,
        store: &SessionStore,
        role_id: Uuid,
    ) -> Result<Application, ClientError> {
        let body = ApplyRequest {
            role_id,
            use_existing_resume: true,
        };
        self.with_body(store, Method::POST, "/api/student/apply", &body).await
    }

    pub async fn respond_to_offer(
        &self,
        store: &SessionStore,
        application_id: Uuid,
        accept: bool,
    ) -> Result<Application, ClientError> {
        let action = if accept { "accept" } else { "reject" };
        let path = format!("/api/student/applications/{application_id}/{action}");
        self.data(self.authed(store, Method::PUT, &path)?).await
    }

    pub async fn companies(
        &self,
        store: &SessionStore,
    ) -> Result<Vec<CompanyProfile>, ClientError> {
        self.get(store, "/api/student/companies").await
    }

    pub async fn company(
        &self,
        store: &SessionStore,
        company_id: Uuid,
    ) -> Result<CompanyWithRoles, ClientError> {
        self.get(store, &format!("/api/student/companies/{company_id}")).await
    }

    pub async fn roles(
        &self,
        store: &SessionStore,
        company_id: Option<Uuid>,
    ) -> Result<Vec<RolePosting>, ClientError> {
        let path = match company_id {
            Some(id) => format!("/api/student/roles?companyId={id}"),
            None => "/api/student/roles".to_string(),
        };
        self.get(store, &path).await
    }

    // -- Company portal --

    pub async fn company_profile(
        &self,
        store: &SessionStore,
    ) -> Result<CompanyProfile, ClientError> {
        self.get(store, "/api/company/profile").await
    }

    pub async fn update_company_profile(
        &self,
        store: &SessionStore,
        update: &CompanyProfileUpdate,
    ) -> Result<CompanyProfile, ClientError> {
        self.with_body(store, Method::PUT, "/api/company/profile", update).await
    }

    pub async fn jobs(&self, store: &SessionStore) -> Result<Vec<RolePosting>, ClientError> {
        self.get(store, "/api/company/jobs").await
    }

    pub async fn create_job(
        &self,
        store: &SessionStore,
        req: &CreateRoleRequest,
    ) -> Result<RolePosting, ClientError> {
        self.with_body(store, Method::POST, "/api/company/jobs", req).await
    }

    pub async fn update_job(
        &self,
        store: &SessionStore,
        role_id: Uuid,
        req: &UpdateRoleRequest,
    ) -> Result<RolePosting, ClientError> {
        self.with_body(store, Method::PUT, &format!("/api/company/jobs/{role_id}"), req).await
    }

    pub async fn delete_job(
        &self,
        store: &SessionStore,
        role_id: Uuid,
    ) -> Result<String, ClientError> {
        let path = format!("/api/company/jobs/{role_id}");
        self.message(self.authed(store, Method::DELETE, &path)?).await
    }

    pub async fn applicants(
        &self,
        store: &SessionStore,
    ) -> Result<Vec<ApplicationDetail>, ClientError> {
        self.get(store, "/api/company/applicants").await
    }

    pub async fn set_applicant_status(
        &self,
        store: &SessionStore,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application, ClientError> {
        let path = format!("/api/company/applicant/{application_id}/status");
        self.with_body(store, Method::PUT, &path, &UpdateStatusRequest { status }).await
    }

    pub async fn company_dashboard(
        &self,
        store: &SessionStore,
    ) -> Result<CompanyDashboard, ClientError> {
        self.get(store, "/api/company/dashboard").await
    }

    // -- Admin portal --

    pub async fn add_company(
        &self,
        store: &SessionStore,
        req: &AddCompanyRequest,
    ) -> Result<CompanyProfile, ClientError> {
        self.with_body(store, Method::POST, "/api/admin/company", req).await
    }

    pub async fn all_companies(
        &self,
        store: &SessionStore,
    ) -> Result<Vec<CompanyWithOwner>, ClientError> {
        self.get(store, "/api/admin/companies").await
    }

    pub async fn delete_company(
        &self,
        store: &SessionStore,
        company_id: Uuid,
    ) -> Result<String, ClientError> {
        let path = format!("/api/admin/company/{company_id}");
        self.message(self.authed(store, Method::DELETE, &path)?).await
    }

    pub async fn verify_company(
        &self,
        store: &SessionStore,
        company_id: Uuid,
        verified: bool,
    ) -> Result<CompanyProfile, ClientError> {
        let path = format!("/api/admin/company/{company_id}/verify");
        self.with_body(store, Method::PUT, &path, &VerifyCompanyRequest { verified }).await
    }

    pub async fn bulk_students(
        &self,
        store: &SessionStore,
        students: &[BulkStudentEntry],
    ) -> Result<BulkUploadResponse, ClientError> {
        self.with_body(store, Method::POST, "/api/admin/student/bulk", &students).await
    }

    /// Students, companies, applications and stats: `portal` is `admin` or `faculty`.
    pub async fn stats(
        &self,
        store: &SessionStore,
        portal: &str,
    ) -> Result<PlatformStats, ClientError> {
        self.get(store, &format!("/api/{portal}/stats")).await
    }

    pub async fn students(
        &self,
        store: &SessionStore,
        portal: &str,
    ) -> Result<Vec<StudentWithUser>, ClientError> {
        self.get(store, &format!("/api/{portal}/students")).await
    }

    pub async fn applications(
        &self,
        store: &SessionStore,
        portal: &str,
    ) -> Result<Vec<ApplicationDetail>, ClientError> {
        self.get(store, &format!("/api/{portal}/applications")).await
    }
}

/// Turn a non-2xx body into a [`ClientError::Api`], keeping the server's message when present.
fn error_from_body(status: StatusCode, body: &[u8]) -> ClientError {
    let message = serde_json::from_slice::<MessageResponse>(body)
        .map(|m| m.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}
