//! Module for the patient management API.
//!
//! Listing, lookup, admin-side creation and updates, the registration
//! decision endpoints (approve/deny), and deletion.

pub mod handlers;
pub mod models;
pub mod routes;
