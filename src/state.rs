use std::sync::Arc;

use crate::auth::IdentityVerifier;
use crate::relay::Relay;
use crate::store::ChatStore;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
    pub store: Arc<dyn ChatStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    pub fn new(relay: Relay, store: Arc<dyn ChatStore>, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self {
            relay,
            store,
            verifier,
        }
    }
}
