//! Module for the procedure catalog API.

pub mod handlers;
pub mod models;
pub mod routes;
