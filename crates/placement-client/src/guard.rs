use placement_types::models::UserRole;

use crate::session::Session;

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    RedirectToLogin,
}

/// Decide whether a portal page may render. An empty `allowed` list means any
/// logged-in user.
pub fn guard(session: Option<&Session>, allowed: &[UserRole]) -> Access {
    match session {
        None => Access::RedirectToLogin,
        Some(_) if allowed.is_empty() => Access::Allowed,
        Some(s) if allowed.contains(&s.role) => Access::Allowed,
        Some(_) => Access::RedirectToLogin,
    }
}

/// Roles that may open a portal's pages. Faculty pages are read-only
/// reports that admins can see too.
pub fn portal_roles(portal: UserRole) -> &'static [UserRole] {
    match portal {
        UserRole::Student => &[UserRole::Student],
        UserRole::Company => &[UserRole::Company],
        UserRole::Faculty => &[UserRole::Faculty, UserRole::Admin],
        UserRole::Admin => &[UserRole::Admin],
    }
}

/// Landing page of each portal after login.
pub fn home_path(role: UserRole) -> &'static str {
    match role {
        UserRole::Student => "/student/dashboard",
        UserRole::Company => "/company/dashboard",
        UserRole::Faculty => "/faculty/dashboard",
        UserRole::Admin => "/admin/dashboard",
    }
}
