//! Client side of the placement portal: a signed on-disk session, the
//! route guard the portals use, and a typed HTTP client for the API.

pub mod api;
pub mod error;
pub mod guard;
pub mod session;

pub use api::ApiClient;
pub use error::ClientError;
pub use guard::{Access, guard, portal_roles};
pub use session::{Session, SessionStore};
