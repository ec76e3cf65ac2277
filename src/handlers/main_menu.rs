use axum::extract::State;

use crate::{
    app_state::AppState,
    controller::Action,
    error::PortalError,
    session_state::{Page, SessionState},
    views::MainMenuView,
};

use super::{perform, PageResult, PortalSession};

pub fn main_menu_view(state: &SessionState) -> Result<MainMenuView, PortalError> {
    let user = state.current_user().ok_or_else(|| {
        PortalError::MissingProfile(state.user_id().unwrap_or_default().to_string())
    })?;

    Ok(MainMenuView {
        greeting: format!("Welcome, {}!", user.user_name),
    })
}

pub fn logout(state: &mut SessionState) {
    if let Some(user_id) = state.user_id() {
        tracing::debug!("user {} logged out", user_id);
    }
    state.sign_out();
    state.go_to(Page::Login);
}

pub async fn open_corridor(State(app): State<AppState>, session: PortalSession) -> PageResult {
    perform(&app, &session, Action::OpenCorridor)
}

pub async fn open_history(State(app): State<AppState>, session: PortalSession) -> PageResult {
    perform(&app, &session, Action::OpenHistory)
}

pub async fn sign_out(State(app): State<AppState>, session: PortalSession) -> PageResult {
    perform(&app, &session, Action::Logout)
}
