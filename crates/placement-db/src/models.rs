//! Database row and insert types.
//!
//! Rows that the API returns verbatim map straight into `placement-types`
//! models; only the ones carrying storage-only data live here.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use placement_types::models::{Application, Industry, User, UserRole};

pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    /// Argon2 PHC string.
    pub password: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            created_at: row.created_at,
        }
    }
}

pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
}

pub struct NewStudent {
    pub roll_no: String,
    pub branch: String,
    pub year: String,
    pub cgpa: f64,
}

pub struct NewCompany {
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub industry: Option<Industry>,
    pub verified: bool,
}

/// Profile created in the same transaction as its user.
pub enum NewProfile {
    Student(NewStudent),
    Company(NewCompany),
    None,
}

pub struct NewApplication {
    pub student_id: Uuid,
    pub role_id: Uuid,
    pub company_id: Uuid,
    pub resume_url: String,
}

/// An application plus the company that owns its role.
pub struct ApplicationRow {
    pub application: Application,
    pub role_company_id: Uuid,
}

/// Result of an insert guarded by a UNIQUE constraint.
#[derive(Debug)]
pub enum Insert<T> {
    Inserted(T),
    /// The columns of the violated constraint, e.g. `users.email`.
    Duplicate(String),
}

/// Which applications a listing covers.
#[derive(Debug, Clone, Copy)]
pub enum ApplicationScope {
    All,
    Student(Uuid),
    Company(Uuid),
}
