//! Module for the notification history API.
//!
//! Rows are written by the notification service; this surface is read-only.

pub mod handlers;
pub mod routes;
