//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data`, so they depend only on
//! domain ports and services and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{Diagnostics, GameRepository};
use crate::domain::{AuthService, ResultsService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub games: Arc<dyn GameRepository>,
    pub results: ResultsService,
    pub auth: AuthService,
    pub diagnostics: Arc<dyn Diagnostics>,
}

impl HttpState {
    pub fn new(
        games: Arc<dyn GameRepository>,
        results: ResultsService,
        auth: AuthService,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            games,
            results,
            auth,
            diagnostics,
        }
    }
}
