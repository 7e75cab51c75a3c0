//! Shared application state handed to every handler.
//!
//! Everything in here is immutable after startup and cheap to clone.

use std::sync::Arc;

use adapters::Mailer;

use crate::auth::AuthService;
use crate::config::Config;
use crate::database::Db;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Db,
    pub auth: AuthService,
    pub mailer: Arc<dyn Mailer>,
}
