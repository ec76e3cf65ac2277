//! Ridership portal: log in by pay-user id, look up a corridor by route name,
//! and browse your own trips, over a TransJakarta ridership workbook.
//!
//! Every page is served as JSON (see [`views::PageView`]); each button of the
//! front-end posts to one route of [`app`]. Page state lives in a cookie keyed
//! session held by `axum_session_middleware`.

pub mod app_state;
pub mod config;
pub mod controller;
pub mod error;
pub mod handlers;
pub mod models;
pub mod session_state;
pub mod store;
pub mod views;

use axum::{
    routing::{get, post},
    Router,
};
use axum_session_middleware::{AxumSessionConfig, AxumSessionLayer, AxumSessionStore};

use app_state::AppState;
use handlers::*;
use session_state::SessionState;

/// Session store whose new sessions start on the Login page with a copy of the dataset's users.
pub fn session_store(state: &AppState, config: AxumSessionConfig) -> AxumSessionStore<SessionState> {
    let state = state.clone();
    AxumSessionStore::new(config, move || state.new_session())
}

pub fn app(state: AppState, session_store: AxumSessionStore<SessionState>) -> Router {
    Router::new()
        .route("/page", get(get_page))
        .route("/identity/current", get(identity::get_current_identity))

        .route("/login", post(login::login))
        .route("/login/register", post(login::open_register))

        .route("/register", post(register::register))
        .route("/register/back", post(register::back_to_login))

        .route("/menu/corridor", post(main_menu::open_corridor))
        .route("/menu/history", post(main_menu::open_history))
        .route("/menu/logout", post(main_menu::sign_out))

        .route("/corridor/search", post(corridor::search))
        .route("/corridor/back", post(back_to_menu))
        .route("/history/back", post(back_to_menu))

        .layer(AxumSessionLayer::new(session_store))
        .with_state(state)
}
