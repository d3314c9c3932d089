//! Application state for the API server

use crate::{Config, Converter};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// The converter running jobs
    pub converter: Arc<Converter>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(converter: Arc<Converter>, config: Arc<Config>) -> Self {
        Self { converter, config }
    }
}
