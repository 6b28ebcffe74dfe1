use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use uuid::Uuid;

use placement_types::api::{
    CompanyProfileUpdate, CompanyWithOwner, CreateRoleRequest, PlatformStats, StatusCounts,
    StudentProfileUpdate, StudentWithUser, UpdateRoleRequest,
};
use placement_types::models::{
    Address, Application, ApplicationDetail, CompanyProfile, Currency, RolePosting, SocialLinks,
    StudentProfile,
};
use placement_types::status::ApplicationStatus;

use crate::Database;
use crate::models::{
    ApplicationRow, ApplicationScope, Insert, NewApplication, NewCompany, NewProfile, NewStudent,
    NewUser, UserRow,
};

const USER_COLUMNS: &str = "u.id, u.email, u.password, u.name, u.role, u.created_at";

const STUDENT_COLUMNS: &str = "s.id, s.user_id, s.roll_no, s.branch, s.year, s.cgpa, s.phone, \
     s.bio, s.github, s.linkedin, s.skills, s.resume_url, s.created_at, s.updated_at";

const COMPANY_COLUMNS: &str = "c.id, c.user_id, c.name, c.description, c.website, c.logo, \
     c.contact_email, c.contact_phone, c.street, c.city, c.state, c.postal_code, c.country, \
     c.industry, c.company_size, c.founded_year, c.linkedin, c.twitter, c.facebook, c.instagram, \
     c.verified, c.is_active, c.created_at, c.updated_at";

const ROLE_COLUMNS: &str = "r.id, r.company_id, r.title, r.description, r.stipend, r.eligibility, \
     r.currency, r.created_at, r.updated_at";

const APPLICATION_COLUMNS: &str = "a.id, a.student_id, a.role_id, a.company_id, a.resume_url, \
     a.status, a.applied_at, a.updated_at";

impl Database {
    // -- Users --

    /// Create a user and its role profile atomically.
    pub fn create_account(&self, user: &NewUser, profile: &NewProfile) -> Result<Insert<UserRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.unchecked_transaction()?;
            let now = Utc::now();
            let user_id = Uuid::new_v4();

            let inserted = tx.execute(
                "INSERT INTO users (id, email, password, name, role, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user_id.to_string(),
                    user.email,
                    user.password_hash,
                    user.name,
                    user.role.as_db_str(),
                    now.to_rfc3339(),
                ],
            );
            if let Some(dup) = duplicate_of(inserted)? {
                return Ok(Insert::Duplicate(dup));
            }

            let inserted = match profile {
                NewProfile::Student(student) => insert_student(&tx, user_id, student, now),
                NewProfile::Company(company) => insert_company(&tx, user_id, company, now),
                NewProfile::None => Ok(1),
            };
            if let Some(dup) = duplicate_of(inserted)? {
                return Ok(Insert::Duplicate(dup));
            }

            tx.commit()?;

            Ok(Insert::Inserted(UserRow {
                id: user_id,
                email: user.email.clone(),
                password: user.password_hash.clone(),
                name: user.name.clone(),
                role: user.role,
                created_at: now,
            }))
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.email = ?1");
            Ok(conn.query_row(&sql, [email], user_from_row).optional()?)
        })
    }

    pub fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1");
            Ok(conn.query_row(&sql, [id.to_string()], user_from_row).optional()?)
        })
    }

    // -- Students --

    pub fn get_student_by_user(&self, user_id: Uuid) -> Result<Option<StudentProfile>> {
        self.with_conn(|conn| query_student_by_user(conn, user_id))
    }

    pub fn get_student_with_user(&self, user_id: Uuid) -> Result<Option<StudentWithUser>> {
        self.with_conn(|conn| query_student_with_user(conn, user_id))
    }

    /// Apply a partial profile update. Returns `None` when the user has no student profile.
    pub fn update_student(
        &self,
        user_id: Uuid,
        update: &StudentProfileUpdate,
    ) -> Result<Option<StudentWithUser>> {
        self.with_conn_mut(|conn| {
            let Some(mut current) = query_student_with_user(conn, user_id)? else {
                return Ok(None);
            };

            merge_student(&mut current.profile, update);
            if let Some(name) = &update.name {
                current.name = name.clone();
            }
            let profile = &current.profile;
            let now = Utc::now().to_rfc3339();

            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "UPDATE students SET branch = ?1, year = ?2, cgpa = ?3, phone = ?4, bio = ?5,
                        github = ?6, linkedin = ?7, skills = ?8, updated_at = ?9
                 WHERE id = ?10",
                params![
                    profile.branch,
                    profile.year,
                    profile.cgpa,
                    profile.phone,
                    profile.bio,
                    profile.github,
                    profile.linkedin,
                    serde_json::to_string(&profile.skills)?,
                    now,
                    profile.id.to_string(),
                ],
            )?;
            tx.execute(
                "UPDATE users SET name = ?1 WHERE id = ?2",
                params![current.name, user_id.to_string()],
            )?;
            tx.commit()?;

            query_student_with_user(conn, user_id)
        })
    }

    pub fn set_student_resume(&self, student_id: Uuid, resume_url: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE students SET resume_url = ?1, updated_at = ?2 WHERE id = ?3",
                params![resume_url, Utc::now().to_rfc3339(), student_id.to_string()],
            )?;
            Ok(())
        })
    }

    pub fn list_students(&self) -> Result<Vec<StudentWithUser>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {STUDENT_COLUMNS}, u.name, u.email
                 FROM students s JOIN users u ON u.id = s.user_id
                 ORDER BY s.roll_no"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], student_with_user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Companies --

    pub fn get_company(&self, id: Uuid) -> Result<Option<CompanyProfile>> {
        self.with_conn(|conn| query_company(conn, "c.id", id))
    }

    pub fn get_company_by_user(&self, user_id: Uuid) -> Result<Option<CompanyProfile>> {
        self.with_conn(|conn| query_company(conn, "c.user_id", user_id))
    }

    /// Apply a partial profile update. Absent fields keep their stored value.
    pub fn update_company(
        &self,
        id: Uuid,
        update: &CompanyProfileUpdate,
    ) -> Result<Option<CompanyProfile>> {
        self.with_conn_mut(|conn| {
            let Some(mut company) = query_company(conn, "c.id", id)? else {
                return Ok(None);
            };
            merge_company(&mut company, update);

            conn.execute(
                "UPDATE companies SET name = ?1, description = ?2, website = ?3,
                        contact_email = ?4, contact_phone = ?5, street = ?6, city = ?7,
                        state = ?8, postal_code = ?9, country = ?10, industry = ?11,
                        company_size = ?12, founded_year = ?13, linkedin = ?14, twitter = ?15,
                        facebook = ?16, instagram = ?17, updated_at = ?18
                 WHERE id = ?19",
                params![
                    company.name,
                    company.description,
                    company.website,
                    company.contact_email,
                    company.contact_phone,
                    company.address.street,
                    company.address.city,
                    company.address.state,
                    company.address.postal_code,
                    company.address.country,
                    company.industry.map(|i| i.as_str()),
                    company.company_size.map(|s| s.as_str()),
                    company.founded_year,
                    company.social_media.linkedin,
                    company.social_media.twitter,
                    company.social_media.facebook,
                    company.social_media.instagram,
                    Utc::now().to_rfc3339(),
                    id.to_string(),
                ],
            )?;

            query_company(conn, "c.id", id)
        })
    }

    pub fn set_company_logo(&self, id: Uuid, logo: Option<&str>) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE companies SET logo = ?1, updated_at = ?2 WHERE id = ?3",
                params![logo, Utc::now().to_rfc3339(), id.to_string()],
            )?;
            Ok(())
        })
    }

    pub fn set_company_verified(&self, id: Uuid, verified: bool) -> Result<Option<CompanyProfile>> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE companies SET verified = ?1, updated_at = ?2 WHERE id = ?3",
                params![verified, Utc::now().to_rfc3339(), id.to_string()],
            )?;
            query_company(conn, "c.id", id)
        })
    }

    pub fn list_companies(&self, active_only: bool) -> Result<Vec<CompanyWithOwner>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COMPANY_COLUMNS}, u.name, u.email
                 FROM companies c JOIN users u ON u.id = c.user_id
                 WHERE (?1 = 0 OR c.is_active = 1)
                 ORDER BY c.name"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([active_only], |row| {
                    Ok(CompanyWithOwner {
                        company: company_from_row(row, 0)?,
                        owner_name: row.get(24)?,
                        owner_email: row.get(25)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Delete a company by removing its owning user; roles and applications cascade.
    pub fn delete_company(&self, id: Uuid) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let user_id: Option<String> = conn
                .query_row(
                    "SELECT user_id FROM companies WHERE id = ?1",
                    [id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;

            let Some(user_id) = user_id else {
                return Ok(false);
            };
            conn.execute("DELETE FROM users WHERE id = ?1", [user_id])?;
            Ok(true)
        })
    }

    // -- Roles --

    pub fn create_role(&self, company_id: Uuid, req: &CreateRoleRequest) -> Result<RolePosting> {
        self.with_conn_mut(|conn| {
            let id = Uuid::new_v4();
            let now = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO roles (id, company_id, title, description, stipend, eligibility,
                                    currency, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                params![
                    id.to_string(),
                    company_id.to_string(),
                    req.title.trim(),
                    req.description.trim(),
                    req.stipend.trim(),
                    req.eligibility.trim(),
                    req.currency.unwrap_or_default().as_str(),
                    now,
                ],
            )?;
            query_role(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("Role {} vanished after insert", id))
        })
    }

    pub fn get_role(&self, id: Uuid) -> Result<Option<RolePosting>> {
        self.with_conn(|conn| query_role(conn, id))
    }

    pub fn list_roles(&self, company_id: Option<Uuid>) -> Result<Vec<RolePosting>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {ROLE_COLUMNS} FROM roles r
                 WHERE (?1 IS NULL OR r.company_id = ?1)
                 ORDER BY r.created_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([company_id.map(|id| id.to_string())], |row| role_from_row(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_role(&self, id: Uuid, update: &UpdateRoleRequest) -> Result<Option<RolePosting>> {
        self.with_conn_mut(|conn| {
            let Some(mut role) = query_role(conn, id)? else {
                return Ok(None);
            };
            if let Some(v) = &update.title {
                role.title = v.trim().to_string();
            }
            if let Some(v) = &update.description {
                role.description = v.trim().to_string();
            }
            if let Some(v) = &update.stipend {
                role.stipend = v.trim().to_string();
            }
            if let Some(v) = &update.eligibility {
                role.eligibility = v.trim().to_string();
            }
            if let Some(v) = update.currency {
                role.currency = v;
            }

            conn.execute(
                "UPDATE roles SET title = ?1, description = ?2, stipend = ?3, eligibility = ?4,
                        currency = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![
                    role.title,
                    role.description,
                    role.stipend,
                    role.eligibility,
                    role.currency.as_str(),
                    Utc::now().to_rfc3339(),
                    id.to_string(),
                ],
            )?;
            query_role(conn, id)
        })
    }

    /// Hard delete; the role's applications cascade.
    pub fn delete_role(&self, id: Uuid) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM roles WHERE id = ?1", [id.to_string()])?;
            Ok(n > 0)
        })
    }

    pub fn count_roles(&self, company_id: Option<Uuid>) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM roles WHERE (?1 IS NULL OR company_id = ?1)",
                [company_id.map(|id| id.to_string())],
                |r| r.get(0),
            )?;
            Ok(n as u64)
        })
    }

    // -- Applications --

    /// Insert a PENDING application. A second application for the same
    /// (student, role) pair comes back as `Insert::Duplicate`.
    pub fn create_application(&self, new: &NewApplication) -> Result<Insert<Application>> {
        self.with_conn_mut(|conn| {
            let id = Uuid::new_v4();
            let now = Utc::now();
            let inserted = conn.execute(
                "INSERT INTO applications (id, student_id, role_id, company_id, resume_url,
                                           status, applied_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![
                    id.to_string(),
                    new.student_id.to_string(),
                    new.role_id.to_string(),
                    new.company_id.to_string(),
                    new.resume_url,
                    ApplicationStatus::Pending.as_str(),
                    now.to_rfc3339(),
                ],
            );
            if let Some(dup) = duplicate_of(inserted)? {
                return Ok(Insert::Duplicate(dup));
            }

            Ok(Insert::Inserted(Application {
                id,
                student_id: new.student_id,
                role_id: new.role_id,
                company_id: new.company_id,
                resume_url: new.resume_url.clone(),
                status: ApplicationStatus::Pending,
                applied_at: now,
                updated_at: now,
            }))
        })
    }

    /// Whether `student_id` already has an application for `role_id`.
    pub fn has_applied(&self, student_id: Uuid, role_id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM applications WHERE student_id = ?1 AND role_id = ?2",
                    params![student_id.to_string(), role_id.to_string()],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn get_application(&self, id: Uuid) -> Result<Option<ApplicationRow>> {
        self.with_conn(|conn| query_application(conn, id))
    }

    /// Compare-and-set on status. Returns `None` if the stored status was no longer `from`.
    pub fn update_application_status(
        &self,
        id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Result<Option<ApplicationRow>> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE applications SET status = ?1, updated_at = ?2
                 WHERE id = ?3 AND status = ?4",
                params![to.as_str(), Utc::now().to_rfc3339(), id.to_string(), from.as_str()],
            )?;
            if n == 0 {
                return Ok(None);
            }
            query_application(conn, id)
        })
    }

    pub fn list_application_details(
        &self,
        scope: ApplicationScope,
        limit: Option<u32>,
    ) -> Result<Vec<ApplicationDetail>> {
        let (student, company) = match scope {
            ApplicationScope::All => (None, None),
            ApplicationScope::Student(id) => (Some(id.to_string()), None),
            ApplicationScope::Company(id) => (None, Some(id.to_string())),
        };
        let limit = limit.map(i64::from).unwrap_or(-1);

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {APPLICATION_COLUMNS}, r.title, c.name, u.name, u.email, s.roll_no
                 FROM applications a
                 JOIN roles r ON r.id = a.role_id
                 JOIN companies c ON c.id = a.company_id
                 JOIN students s ON s.id = a.student_id
                 JOIN users u ON u.id = s.user_id
                 WHERE (?1 IS NULL OR a.student_id = ?1)
                   AND (?2 IS NULL OR a.company_id = ?2)
                 ORDER BY a.applied_at DESC
                 LIMIT ?3"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![student, company, limit], |row| {
                    Ok(ApplicationDetail {
                        application: application_from_row(row, 0)?,
                        role_title: row.get(8)?,
                        company_name: row.get(9)?,
                        student_name: row.get(10)?,
                        student_email: row.get(11)?,
                        roll_no: row.get(12)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn status_counts(&self, company_id: Option<Uuid>) -> Result<StatusCounts> {
        self.with_conn(|conn| query_status_counts(conn, company_id))
    }

    pub fn platform_stats(&self) -> Result<PlatformStats> {
        self.with_conn(|conn| {
            let count = |table: &str| -> Result<u64> {
                let n: i64 =
                    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
                Ok(n as u64)
            };
            let applications_by_status = query_status_counts(conn, None)?;

            Ok(PlatformStats {
                total_students: count("students")?,
                total_companies: count("companies")?,
                total_roles: count("roles")?,
                total_applications: applications_by_status.total(),
                applications_by_status,
            })
        })
    }
}

// -- Inserts --

fn insert_student(
    conn: &Connection,
    user_id: Uuid,
    student: &NewStudent,
    now: DateTime<Utc>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO students (id, user_id, roll_no, branch, year, cgpa, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            Uuid::new_v4().to_string(),
            user_id.to_string(),
            student.roll_no,
            student.branch,
            student.year,
            student.cgpa,
            now.to_rfc3339(),
        ],
    )
}

fn insert_company(
    conn: &Connection,
    user_id: Uuid,
    company: &NewCompany,
    now: DateTime<Utc>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO companies (id, user_id, name, description, website, industry, verified,
                                created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            Uuid::new_v4().to_string(),
            user_id.to_string(),
            company.name,
            company.description,
            company.website,
            company.industry.map(|i| i.as_str()),
            company.verified,
            now.to_rfc3339(),
        ],
    )
}

/// Split a UNIQUE violation out of an insert result.
fn duplicate_of(result: rusqlite::Result<usize>) -> Result<Option<String>> {
    match result {
        Ok(_) => Ok(None),
        Err(rusqlite::Error::SqliteFailure(e, Some(msg)))
            if e.code == ErrorCode::ConstraintViolation
                && msg.starts_with("UNIQUE constraint failed: ") =>
        {
            Ok(Some(msg["UNIQUE constraint failed: ".len()..].to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

// -- Single-row queries --

fn query_student_by_user(conn: &Connection, user_id: Uuid) -> Result<Option<StudentProfile>> {
    let sql = format!("SELECT {STUDENT_COLUMNS} FROM students s WHERE s.user_id = ?1");
    Ok(conn
        .query_row(&sql, [user_id.to_string()], |row| student_from_row(row, 0))
        .optional()?)
}

fn query_student_with_user(conn: &Connection, user_id: Uuid) -> Result<Option<StudentWithUser>> {
    let sql = format!(
        "SELECT {STUDENT_COLUMNS}, u.name, u.email
         FROM students s JOIN users u ON u.id = s.user_id
         WHERE s.user_id = ?1"
    );
    Ok(conn
        .query_row(&sql, [user_id.to_string()], student_with_user_from_row)
        .optional()?)
}

fn query_company(conn: &Connection, key: &str, value: Uuid) -> Result<Option<CompanyProfile>> {
    let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies c WHERE {key} = ?1");
    Ok(conn
        .query_row(&sql, [value.to_string()], |row| company_from_row(row, 0))
        .optional()?)
}

fn query_role(conn: &Connection, id: Uuid) -> Result<Option<RolePosting>> {
    let sql = format!("SELECT {ROLE_COLUMNS} FROM roles r WHERE r.id = ?1");
    Ok(conn
        .query_row(&sql, [id.to_string()], |row| role_from_row(row, 0))
        .optional()?)
}

fn query_application(conn: &Connection, id: Uuid) -> Result<Option<ApplicationRow>> {
    let sql = format!(
        "SELECT {APPLICATION_COLUMNS}, r.company_id
         FROM applications a JOIN roles r ON r.id = a.role_id
         WHERE a.id = ?1"
    );
    Ok(conn
        .query_row(&sql, [id.to_string()], |row| {
            Ok(ApplicationRow {
                application: application_from_row(row, 0)?,
                role_company_id: parse_col(row, 8)?,
            })
        })
        .optional()?)
}

fn query_status_counts(conn: &Connection, company_id: Option<Uuid>) -> Result<StatusCounts> {
    let mut stmt = conn.prepare(
        "SELECT status, COUNT(*) FROM applications
         WHERE (?1 IS NULL OR company_id = ?1)
         GROUP BY status",
    )?;
    let rows = stmt
        .query_map([company_id.map(|id| id.to_string())], |row| {
            Ok((parse_col::<ApplicationStatus>(row, 0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut counts = StatusCounts::default();
    for (status, n) in rows {
        counts.add(status, n as u64);
    }
    Ok(counts)
}

// -- Row mapping --

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: parse_col(row, 0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        name: row.get(3)?,
        role: parse_col(row, 4)?,
        created_at: parse_col(row, 5)?,
    })
}

fn student_from_row(row: &Row<'_>, o: usize) -> rusqlite::Result<StudentProfile> {
    let skills: String = row.get(o + 10)?;
    let skills = serde_json::from_str(&skills)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(o + 10, Type::Text, Box::new(e)))?;

    Ok(StudentProfile {
        id: parse_col(row, o)?,
        user_id: parse_col(row, o + 1)?,
        roll_no: row.get(o + 2)?,
        branch: row.get(o + 3)?,
        year: row.get(o + 4)?,
        cgpa: row.get(o + 5)?,
        phone: row.get(o + 6)?,
        bio: row.get(o + 7)?,
        github: row.get(o + 8)?,
        linkedin: row.get(o + 9)?,
        skills,
        resume_url: row.get(o + 11)?,
        created_at: parse_col(row, o + 12)?,
        updated_at: parse_col(row, o + 13)?,
    })
}

fn student_with_user_from_row(row: &Row<'_>) -> rusqlite::Result<StudentWithUser> {
    Ok(StudentWithUser {
        profile: student_from_row(row, 0)?,
        name: row.get(14)?,
        email: row.get(15)?,
    })
}

fn company_from_row(row: &Row<'_>, o: usize) -> rusqlite::Result<CompanyProfile> {
    let description: Option<String> = row.get(o + 3)?;
    Ok(CompanyProfile {
        id: parse_col(row, o)?,
        user_id: parse_col(row, o + 1)?,
        name: row.get(o + 2)?,
        about: description.clone(),
        description,
        website: row.get(o + 4)?,
        logo: row.get(o + 5)?,
        contact_email: row.get(o + 6)?,
        contact_phone: row.get(o + 7)?,
        address: Address {
            street: row.get(o + 8)?,
            city: row.get(o + 9)?,
            state: row.get(o + 10)?,
            postal_code: row.get(o + 11)?,
            country: row.get(o + 12)?,
        },
        industry: parse_opt_col(row, o + 13)?,
        company_size: parse_opt_col(row, o + 14)?,
        founded_year: row.get(o + 15)?,
        social_media: SocialLinks {
            linkedin: row.get(o + 16)?,
            twitter: row.get(o + 17)?,
            facebook: row.get(o + 18)?,
            instagram: row.get(o + 19)?,
        },
        verified: row.get(o + 20)?,
        is_active: row.get(o + 21)?,
        created_at: parse_col(row, o + 22)?,
        updated_at: parse_col(row, o + 23)?,
    })
}

fn role_from_row(row: &Row<'_>, o: usize) -> rusqlite::Result<RolePosting> {
    Ok(RolePosting {
        id: parse_col(row, o)?,
        company_id: parse_col(row, o + 1)?,
        title: row.get(o + 2)?,
        description: row.get(o + 3)?,
        stipend: row.get(o + 4)?,
        eligibility: row.get(o + 5)?,
        currency: parse_col::<Currency>(row, o + 6)?,
        created_at: parse_col(row, o + 7)?,
        updated_at: parse_col(row, o + 8)?,
    })
}

fn application_from_row(row: &Row<'_>, o: usize) -> rusqlite::Result<Application> {
    Ok(Application {
        id: parse_col(row, o)?,
        student_id: parse_col(row, o + 1)?,
        role_id: parse_col(row, o + 2)?,
        company_id: parse_col(row, o + 3)?,
        resume_url: row.get(o + 4)?,
        status: parse_col(row, o + 5)?,
        applied_at: parse_col(row, o + 6)?,
        updated_at: parse_col(row, o + 7)?,
    })
}

/// Read a TEXT column through `FromStr`.
fn parse_col<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_opt_col<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        s.parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

// -- Partial updates --

fn merge_student(profile: &mut StudentProfile, update: &StudentProfileUpdate) {
    if let Some(v) = &update.branch {
        profile.branch = v.clone();
    }
    if let Some(v) = &update.year {
        profile.year = v.clone();
    }
    if let Some(v) = update.cgpa {
        profile.cgpa = v;
    }
    if let Some(v) = &update.phone {
        profile.phone = Some(v.clone());
    }
    if let Some(v) = &update.bio {
        profile.bio = Some(v.clone());
    }
    if let Some(v) = &update.github {
        profile.github = Some(v.clone());
    }
    if let Some(v) = &update.linkedin {
        profile.linkedin = Some(v.clone());
    }
    if let Some(v) = &update.skills {
        profile.skills = v.clone();
    }
}

fn merge_company(company: &mut CompanyProfile, update: &CompanyProfileUpdate) {
    fn set(slot: &mut Option<String>, value: &Option<String>) {
        if let Some(v) = value {
            *slot = Some(v.clone());
        }
    }

    if let Some(v) = &update.name {
        company.name = v.clone();
    }
    if let Some(v) = update.about.as_ref().or(update.description.as_ref()) {
        company.description = Some(v.clone());
    }
    company.about = company.description.clone();
    set(&mut company.website, &update.website);
    set(&mut company.contact_email, &update.contact_email);
    set(&mut company.contact_phone, &update.contact_phone);

    if let Some(address) = &update.address {
        set(&mut company.address.street, &address.street);
        set(&mut company.address.city, &address.city);
        set(&mut company.address.state, &address.state);
        set(&mut company.address.postal_code, &address.postal_code);
        set(&mut company.address.country, &address.country);
    }
    if let Some(social) = &update.social_media {
        set(&mut company.social_media.linkedin, &social.linkedin);
        set(&mut company.social_media.twitter, &social.twitter);
        set(&mut company.social_media.facebook, &social.facebook);
        set(&mut company.social_media.instagram, &social.instagram);
    }

    if update.industry.is_some() {
        company.industry = update.industry;
    }
    if update.company_size.is_some() {
        company.company_size = update.company_size;
    }
    if update.founded_year.is_some() {
        company.founded_year = update.founded_year;
    }
}
