use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::status::ApplicationStatus;

/// A string that is not one of the spellings of a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

closed_enum! {
    /// Account role. Stored uppercase, sent to clients lowercase, accepted in any case.
    pub enum UserRole as "role" {
        Student => "student",
        Company => "company",
        Faculty => "faculty",
        Admin => "admin",
    }
}

impl UserRole {
    /// Canonical spelling in the `users.role` column.
    pub fn as_db_str(self) -> &'static str {
        match self {
            UserRole::Student => "STUDENT",
            UserRole::Company => "COMPANY",
            UserRole::Faculty => "FACULTY",
            UserRole::Admin => "ADMIN",
        }
    }
}

closed_enum! {
    pub enum Currency as "currency" {
        Inr => "INR",
        Usd => "USD",
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Inr
    }
}

closed_enum! {
    pub enum Industry as "industry" {
        Technology => "Technology",
        Healthcare => "Healthcare",
        Finance => "Finance",
        Education => "Education",
        Manufacturing => "Manufacturing",
        Retail => "Retail",
        Hospitality => "Hospitality",
        Entertainment => "Entertainment",
        Other => "Other",
    }
}

closed_enum! {
    pub enum CompanySize as "company size" {
        Tiny => "1-10",
        Small => "11-50",
        Medium => "51-200",
        Large => "201-500",
        VeryLarge => "501-1000",
        Enterprise => "1000+",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub roll_no: String,
    pub branch: String,
    pub year: String,
    pub cgpa: f64,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub skills: Vec<String>,
    pub resume_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinks {
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Same value as `description`; the company portal edits it under this name.
    pub about: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Address,
    pub industry: Option<Industry>,
    pub company_size: Option<CompanySize>,
    pub founded_year: Option<i32>,
    pub social_media: SocialLinks,
    pub verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A role posting published by a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePosting {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    pub stipend: String,
    pub eligibility: String,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub student_id: Uuid,
    pub role_id: Uuid,
    pub company_id: Uuid,
    pub resume_url: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An application joined with the names the portals display next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetail {
    #[serde(flatten)]
    pub application: Application,
    pub role_title: String,
    pub company_name: String,
    pub student_name: String,
    pub student_email: String,
    pub roll_no: String,
}
