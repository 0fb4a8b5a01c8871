// src/api/state.rs

use std::sync::Arc;

use crate::auth::SessionProvider;
use crate::services::{ImportService, LibraryService};

/// Shared state handed to every handler.
/// All fields are Arc-wrapped for cheap cloning across requests.
#[derive(Clone)]
pub struct AppState {
    pub library: Arc<LibraryService>,
    pub import: Arc<ImportService>,
    pub sessions: Arc<dyn SessionProvider>,
}
