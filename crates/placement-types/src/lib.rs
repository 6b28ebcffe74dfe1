//! Shared types for the placement portal: wire payloads, closed enums and
//! the application status workflow.

#[macro_use]
mod macros;

pub mod api;
pub mod models;
pub mod status;
