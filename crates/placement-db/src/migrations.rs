use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                email       TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                name        TEXT NOT NULL,
                role        TEXT NOT NULL
                            CHECK (role IN ('STUDENT', 'COMPANY', 'FACULTY', 'ADMIN')),
                created_at  TEXT NOT NULL
            );

            CREATE TABLE students (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
                roll_no     TEXT NOT NULL UNIQUE,
                branch      TEXT NOT NULL,
                year        TEXT NOT NULL,
                cgpa        REAL NOT NULL DEFAULT 0,
                phone       TEXT,
                bio         TEXT,
                github      TEXT,
                linkedin    TEXT,
                skills      TEXT NOT NULL DEFAULT '[]',
                resume_url  TEXT,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE TABLE companies (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
                name            TEXT NOT NULL,
                description     TEXT,
                website         TEXT,
                logo            TEXT,
                contact_email   TEXT,
                contact_phone   TEXT,
                street          TEXT,
                city            TEXT,
                state           TEXT,
                postal_code     TEXT,
                country         TEXT,
                industry        TEXT,
                company_size    TEXT,
                founded_year    INTEGER,
                linkedin        TEXT,
                twitter         TEXT,
                facebook        TEXT,
                instagram       TEXT,
                verified        INTEGER NOT NULL DEFAULT 0,
                is_active       INTEGER NOT NULL DEFAULT 1,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE TABLE roles (
                id          TEXT PRIMARY KEY,
                company_id  TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
                title       TEXT NOT NULL,
                description TEXT NOT NULL,
                stipend     TEXT NOT NULL,
                eligibility TEXT NOT NULL,
                currency    TEXT NOT NULL DEFAULT 'INR' CHECK (currency IN ('INR', 'USD')),
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX idx_roles_company ON roles(company_id);

            -- One application per (student, role): the duplicate guard lives here.
            CREATE TABLE applications (
                id          TEXT PRIMARY KEY,
                student_id  TEXT NOT NULL REFERENCES students(id) ON DELETE CASCADE,
                role_id     TEXT NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
                company_id  TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
                resume_url  TEXT NOT NULL,
                status      TEXT NOT NULL DEFAULT 'PENDING'
                            CHECK (status IN ('PENDING', 'SHORTLISTED', 'ACCEPTED', 'REJECTED')),
                applied_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL,
                UNIQUE (student_id, role_id)
            );

            CREATE INDEX idx_applications_company ON applications(company_id, applied_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }
}
