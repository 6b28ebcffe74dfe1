pub mod admin;
pub mod auth;
pub mod company;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod notifier;
pub mod otp;
pub mod reports;
pub mod routes;
pub mod student;
pub mod uploads;
pub mod workflow;

pub use auth::{AppState, AppStateInner};
pub use routes::router;

use placement_db::Database;

use crate::error::ApiError;

/// Run a blocking database call off the async runtime.
pub(crate) async fn run_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))?
        .map_err(ApiError::from)
}
