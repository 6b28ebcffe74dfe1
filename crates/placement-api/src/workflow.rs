//! Status changes on applications.
//!
//! Companies move applications for roles they own; students can only accept
//! or reject their own. The legality of the move itself is decided by
//! [`ApplicationStatus::transition`] and the write is a compare-and-set on
//! the previous status.

use tracing::info;
use uuid::Uuid;

use placement_types::models::Application;
use placement_types::status::{ApplicationStatus, Transition};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::run_db;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// Company profile id.
    Company(Uuid),
    /// Student profile id.
    Student(Uuid),
}

pub async fn transition(
    state: &AppState,
    application_id: Uuid,
    to: ApplicationStatus,
    actor: Actor,
) -> Result<Application, ApiError> {
    let row = run_db(state, move |db| db.get_application(application_id))
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    match actor {
        Actor::Company(company_id) if row.role_company_id != company_id => {
            return Err(ApiError::forbidden("Not authorized to update this application"));
        }
        Actor::Student(student_id) if row.application.student_id != student_id => {
            return Err(ApiError::forbidden("Not authorized to update this application"));
        }
        Actor::Student(_) if !to.is_terminal() => {
            return Err(ApiError::forbidden("Students can only accept or reject an offer"));
        }
        _ => {}
    }

    match row.application.status.transition(to)? {
        Transition::Unchanged => Ok(row.application),
        Transition::Changed { from, to } => {
            let updated = run_db(state, move |db| {
                db.update_application_status(application_id, from, to)
            })
            .await?
            .ok_or_else(|| {
                ApiError::Conflict("Application status changed concurrently, please retry".into())
            })?;

            info!("Application {} moved {} -> {} by {:?}", application_id, from, to, actor);
            Ok(updated.application)
        }
    }
}
