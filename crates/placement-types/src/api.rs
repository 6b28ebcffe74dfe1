use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    Address, ApplicationDetail, CompanyProfile, CompanySize, Currency, Industry, RolePosting,
    SocialLinks, StudentProfile, User, UserRole,
};
use crate::status::ApplicationStatus;

// -- JWT Claims --

/// JWT claims shared by the API gate and the client. The role is advisory;
/// the gate always re-reads it from the user row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: UserRole,
    pub exp: usize,
}

// -- Envelopes --

/// Success envelope: `{ "success": true, "data": ... }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

/// `{ "success": bool, "message": "..." }`, used for both plain acknowledgements and errors.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

// -- Auth --

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    // Student fields
    pub roll_no: Option<String>,
    pub branch: Option<String>,
    pub year: Option<String>,
    pub cgpa: Option<f64>,
    // Company fields
    pub company_name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub industry: Option<Industry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Profile {
    Student(StudentProfile),
    Company(CompanyProfile),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub role: UserRole,
    pub user: User,
    pub profile: Option<Profile>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequest {
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpVerifyRequest {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub otp: String,
}

// -- Students --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentWithUser {
    #[serde(flatten)]
    pub profile: StudentProfile,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfileUpdate {
    pub name: Option<String>,
    pub branch: Option<String>,
    pub year: Option<String>,
    pub cgpa: Option<f64>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub role_id: Uuid,
    #[serde(default)]
    pub use_existing_resume: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleQuery {
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyWithRoles {
    #[serde(flatten)]
    pub company: CompanyProfile,
    pub roles: Vec<RolePosting>,
}

// -- Companies --

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfileUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Portal-side name for `description`; wins when both are sent.
    pub about: Option<String>,
    pub website: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<Address>,
    pub industry: Option<Industry>,
    pub company_size: Option<CompanySize>,
    pub founded_year: Option<i32>,
    pub social_media: Option<SocialLinks>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    pub title: String,
    pub description: String,
    pub stipend: String,
    pub eligibility: String,
    pub currency: Option<Currency>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub stipend: Option<String>,
    pub eligibility: Option<String>,
    pub currency: Option<Currency>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub file_path: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: u64,
    pub shortlisted: u64,
    pub accepted: u64,
    pub rejected: u64,
}

impl StatusCounts {
    pub fn total(&self) -> u64 {
        self.pending + self.shortlisted + self.accepted + self.rejected
    }

    pub fn add(&mut self, status: ApplicationStatus, n: u64) {
        match status {
            ApplicationStatus::Pending => self.pending += n,
            ApplicationStatus::Shortlisted => self.shortlisted += n,
            ApplicationStatus::Accepted => self.accepted += n,
            ApplicationStatus::Rejected => self.rejected += n,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDashboard {
    pub total_roles: u64,
    pub total_applications: u64,
    pub applications_by_status: StatusCounts,
    pub recent_applications: Vec<ApplicationDetail>,
}

// -- Admin / faculty --

#[derive(Debug, Serialize, Deserialize)]
pub struct AddCompanyRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub description: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyWithOwner {
    #[serde(flatten)]
    pub company: CompanyProfile,
    pub owner_name: String,
    pub owner_email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyCompanyRequest {
    pub verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkStudentEntry {
    pub name: String,
    pub email: String,
    pub password: String,
    pub roll_no: String,
    pub branch: String,
    pub year: String,
    pub cgpa: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkCreated {
    pub email: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkFailure {
    pub email: String,
    pub message: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BulkUploadResponse {
    pub results: Vec<BulkCreated>,
    pub errors: Vec<BulkFailure>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_students: u64,
    pub total_companies: u64,
    pub total_roles: u64,
    pub total_applications: u64,
    pub applications_by_status: StatusCounts,
}
