//! The page state machine: which actions each page offers, and what each page shows.

use crate::{
    app_state::AppState,
    error::PortalError,
    handlers::{corridor, history, login, main_menu, register},
    session_state::{Page, SessionState},
    store::RegistryVariant,
    views::{Flash, PageResponse, PageView, RegisterView, TripHistory},
};

/// A button press or form submit.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    SubmitLogin { pay_user_id: String },
    OpenRegister,
    SubmitRegistration(register::RegistrationForm),
    BackToLogin,
    OpenCorridor,
    OpenHistory,
    Logout,
    SearchCorridor { route_name: String },
    BackToMenu,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SubmitLogin { .. } => "login",
            Action::OpenRegister => "open register",
            Action::SubmitRegistration(_) => "register",
            Action::BackToLogin => "back to login",
            Action::OpenCorridor => "open corridor",
            Action::OpenHistory => "open history",
            Action::Logout => "logout",
            Action::SearchCorridor { .. } => "search corridor",
            Action::BackToMenu => "back to menu",
        }
    }
}

/// Applies `action` to the session and renders the page it leads to.
///
/// Validation and lookup failures come back as an error flash on the page;
/// only an action the current page does not offer is an `Err`.
pub fn act(app: &AppState, state: &mut SessionState, action: Action) -> Result<PageResponse, PortalError> {
    let flash = match dispatch(app, state, action) {
        Ok(flash) => flash,
        Err(e) if e.is_inline() => {
            tracing::debug!("{} page: {}", state.page(), e);
            Some(Flash::error(e.to_string()))
        }
        Err(e) => {
            tracing::warn!("{}", e);
            return Err(e);
        }
    };

    Ok(respond(state, flash))
}

fn dispatch(app: &AppState, state: &mut SessionState, action: Action) -> Result<Option<Flash>, PortalError> {
    match (state.page(), action) {
        (Page::Login, Action::SubmitLogin { pay_user_id }) => {
            login::submit_login(state, &pay_user_id)?;
            Ok(None)
        }
        (Page::Login, Action::OpenRegister) => {
            state.go_to(Page::Register);
            Ok(None)
        }

        (Page::Register, Action::SubmitRegistration(form)) => {
            let registry = match app.store.variant() {
                RegistryVariant::Persisted => Some(app.store.as_ref()),
                RegistryVariant::Derived => None,
            };
            register::submit_registration(state, form, &app.rules, registry)?;
            Ok(Some(Flash::success("Registration successful!")))
        }
        (Page::Register, Action::BackToLogin) => {
            state.go_to(Page::Login);
            Ok(None)
        }

        (Page::MainMenu, Action::OpenCorridor) => {
            state.go_to(Page::Corridor);
            Ok(None)
        }
        (Page::MainMenu, Action::OpenHistory) => {
            state.go_to(Page::History);
            Ok(None)
        }
        (Page::MainMenu, Action::Logout) => {
            main_menu::logout(state);
            Ok(None)
        }

        (Page::Corridor, Action::SearchCorridor { route_name }) => {
            let corridor_name = corridor::find_corridor(&state.trips, &route_name)?;
            Ok(Some(Flash::success(format!("Corridor Name: {}", corridor_name))))
        }
        (Page::Corridor, Action::BackToMenu) | (Page::History, Action::BackToMenu) => {
            state.go_to(Page::MainMenu);
            Ok(None)
        }

        (page, action) => Err(PortalError::UnexpectedAction {
            page,
            action: action.name(),
        }),
    }
}

/// What the current page shows. Depends only on the session.
pub fn render(state: &SessionState) -> Result<PageView, PortalError> {
    let view = match state.page() {
        Page::Login => PageView::Login,
        Page::Register => PageView::Register(RegisterView::default()),
        Page::MainMenu => PageView::MainMenu(main_menu::main_menu_view(state)?),
        Page::Corridor => PageView::Corridor(corridor::corridor_view(&state.trips)),
        Page::History => PageView::History(history::history_view(state)?),
    };
    Ok(view)
}

/// Renders the current page. A logged-in id without a profile cannot come out
/// of normal navigation; such a session is signed out and sent to Login.
pub fn respond(state: &mut SessionState, flash: Option<Flash>) -> PageResponse {
    match render(state) {
        Ok(view) => {
            let flash = flash.or_else(|| match &view {
                PageView::History(h) if h.history == TripHistory::NoHistory => {
                    Some(Flash::warning("No trip history."))
                }
                _ => None,
            });
            PageResponse { view, flash }
        }
        Err(e) => {
            tracing::error!("{}, resetting session", e);
            state.sign_out();
            state.go_to(Page::Login);
            PageResponse {
                view: PageView::Login,
                flash: Some(Flash::error("Your session was reset. Please log in again.")),
            }
        }
    }
}
