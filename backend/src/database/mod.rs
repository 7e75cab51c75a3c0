//! Module for database access through the hosted data platform.
//!
//! `Db` wraps the Supabase adapter and is the only thing the query layer
//! needs. There is no connection pool to manage; the adapter's HTTP client
//! is already shared and cheap to clone.

pub mod models;
pub mod queries;

use adapters::SupabaseClient;

#[derive(Debug, Clone)]
pub struct Db {
    pub(crate) supabase: SupabaseClient,
}

impl Db {
    pub fn new(supabase: SupabaseClient) -> Self {
        Self { supabase }
    }
}
