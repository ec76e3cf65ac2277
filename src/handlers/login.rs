use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{
    app_state::AppState,
    controller::Action,
    error::PortalError,
    session_state::{Page, SessionState},
};

use super::{perform, PageResult, PortalSession};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub pay_user_id: String,
}

/// Exact match against the session's profiles; no trimming, no case folding.
pub fn submit_login(state: &mut SessionState, pay_user_id: &str) -> Result<(), PortalError> {
    if state.find_user(pay_user_id).is_none() {
        return Err(PortalError::NotFound(
            "PayUserID not found. Please register.".to_string(),
        ));
    }

    state.sign_in(pay_user_id.to_string());
    state.go_to(Page::MainMenu);
    tracing::debug!("user {} logged in", pay_user_id);
    Ok(())
}

pub async fn login(
    State(app): State<AppState>,
    session: PortalSession,
    Json(req): Json<LoginRequest>,
) -> PageResult {
    perform(
        &app,
        &session,
        Action::SubmitLogin {
            pay_user_id: req.pay_user_id,
        },
    )
}

pub async fn open_register(State(app): State<AppState>, session: PortalSession) -> PageResult {
    perform(&app, &session, Action::OpenRegister)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::models::{Dataset, Sex, UserProfile};

    fn state() -> SessionState {
        SessionState::new(&Dataset {
            trips: Vec::new().into(),
            users: vec![UserProfile {
                pay_user_id: "123456789012".into(),
                type_card: "dki".into(),
                user_name: "Ani".into(),
                user_sex: Sex::Female,
                user_birth_year: 1990,
            }],
        })
    }

    #[test]
    fn known_id_moves_to_main_menu() {
        let mut state = state();

        submit_login(&mut state, "123456789012").unwrap();

        assert_eq!(state.page(), Page::MainMenu);
        assert_eq!(state.user_id(), Some("123456789012"));
    }

    #[test]
    fn unknown_or_padded_id_is_not_found() {
        let mut state = state();

        for id in ["999999999999", " 123456789012", ""] {
            let err = submit_login(&mut state, id).unwrap_err();
            assert!(matches!(err, PortalError::NotFound(_)));
        }
        assert_eq!(state.page(), Page::Login);
        assert_eq!(state.user_id(), None);
    }
}
