pub mod corridor;
pub mod history;
pub mod identity;
pub mod login;
pub mod main_menu;
pub mod register;

use axum::{extract::State, http::StatusCode, Json};
use axum_session_middleware::AxumSession;

use crate::{
    app_state::AppState,
    controller::{self, Action},
    session_state::SessionState,
    views::PageResponse,
};

pub type PortalSession = AxumSession<SessionState>;

pub type PageResult = Result<Json<PageResponse>, (StatusCode, String)>;

/// Runs one page action against the caller's session.
pub(crate) fn perform(app: &AppState, session: &PortalSession, action: Action) -> PageResult {
    session
        .update(|state| controller::act(app, state, action))
        .map(Json)
        .map_err(Into::into)
}

pub async fn get_page(session: PortalSession) -> Json<PageResponse> {
    Json(session.update(|state| controller::respond(state, None)))
}

/// Back button of the corridor and history pages.
pub async fn back_to_menu(State(app): State<AppState>, session: PortalSession) -> PageResult {
    perform(&app, &session, Action::BackToMenu)
}
