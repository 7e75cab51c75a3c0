//! Module for QR self-registration.
//!
//! Admins issue registration tokens whose join URL is rendered as a QR code
//! by the frontend; patients hitting the public endpoints validate the token
//! and submit their details, landing in the review queue as `pending`.

pub mod handlers;
pub mod models;
pub mod routes;
