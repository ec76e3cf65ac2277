use std::sync::Arc;

use crate::{
    handlers::register::RegistrationRules,
    models::Dataset,
    session_state::SessionState,
    store::TabularStore,
};

/// Shared by every request. `dataset` is loaded once at startup and never reloaded.
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: Arc<TabularStore>,
    pub dataset: Arc<Dataset>,
    pub rules: RegistrationRules,
}

impl AppState {
    pub fn load(store: TabularStore, rules: RegistrationRules) -> Result<AppState, crate::error::PortalError> {
        let dataset = store.load()?;
        Ok(AppState {
            store: Arc::new(store),
            dataset: Arc::new(dataset),
            rules,
        })
    }

    pub fn new_session(&self) -> SessionState {
        SessionState::new(&self.dataset)
    }
}
