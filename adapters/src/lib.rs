//! Core `adapters` crate for abstracting external hosted services.
//!
//! This crate wraps the two services the backend depends on: the hosted
//! relational data/auth platform (Supabase, spoken to over its PostgREST and
//! GoTrue REST interfaces) and the transactional email provider. It exposes
//! a `Mailer` trait so the backend can swap the real provider for an
//! in-memory transport in tests and local development.

pub mod email;
pub mod errors;
pub mod models;
pub mod supabase;

pub use email::{Mailer, MemoryMailer, ResendMailer};
pub use errors::AdapterError;
pub use models::{AuthSession, AuthUser, EmailMessage};
pub use supabase::SupabaseClient;
