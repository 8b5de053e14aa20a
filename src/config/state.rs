// Application state module
// Shared by every connection task for the lifetime of the process

use tokio::sync::watch;

use super::types::Settings;
use crate::routing::Router;

/// Application state
pub struct AppState {
    pub settings: Settings,
    /// Router with its collaborator clients, built once at startup
    pub router: Router,
    /// Flips to `true` once when the process should stop accepting connections
    pub shutdown: watch::Sender<bool>,
}

impl AppState {
    pub fn new(settings: Settings, router: Router) -> Self {
        Self {
            settings,
            router,
            shutdown: watch::Sender::new(false),
        }
    }

    /// Ask the accept loop and every open connection to wind down
    pub fn begin_shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}
