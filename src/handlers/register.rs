use std::sync::OnceLock;

use axum::{extract::State, Json};
use regex::Regex;
use serde::Deserialize;

use crate::{
    app_state::AppState,
    controller::Action,
    error::PortalError,
    models::{Sex, UserProfile, BIRTH_YEAR_DEFAULT, BIRTH_YEAR_MAX, BIRTH_YEAR_MIN},
    session_state::{Page, SessionState},
    store::TabularStore,
};

use super::{perform, PageResult, PortalSession};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistrationRules {
    /// Require pay-user ids of exactly 12 ASCII digits.
    pub strict_id_format: bool,
}

impl Default for RegistrationRules {
    fn default() -> Self {
        RegistrationRules {
            strict_id_format: true,
        }
    }
}

fn default_birth_year() -> i32 {
    BIRTH_YEAR_DEFAULT
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub pay_user_id: String,
    #[serde(default)]
    pub type_card: String,
    #[serde(default)]
    pub user_name: String,
    pub user_sex: Sex,
    #[serde(default = "default_birth_year")]
    pub user_birth_year: i32,
}

fn pay_user_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{12}$").expect("pay-user id pattern"))
}

pub fn is_valid_pay_user_id(pay_user_id: &str) -> bool {
    pay_user_id_pattern().is_match(pay_user_id)
}

/// Validates `form` and adds the profile to the session's users.
///
/// With a `registry` the whole user list is written to the workbook first;
/// when that write fails nothing is added and the page does not change.
pub fn submit_registration(
    state: &mut SessionState,
    form: RegistrationForm,
    rules: &RegistrationRules,
    registry: Option<&TabularStore>,
) -> Result<UserProfile, PortalError> {
    if rules.strict_id_format && !is_valid_pay_user_id(&form.pay_user_id) {
        return Err(PortalError::Validation(
            "PayUserID must be exactly 12 digits.".to_string(),
        ));
    }
    if form.pay_user_id.trim().is_empty() {
        return Err(PortalError::Validation("PayUserID is required.".to_string()));
    }
    if state.find_user(&form.pay_user_id).is_some() {
        return Err(PortalError::Validation(
            "PayUserID is already registered.".to_string(),
        ));
    }

    let profile = UserProfile {
        pay_user_id: form.pay_user_id,
        type_card: form.type_card,
        user_name: form.user_name,
        user_sex: form.user_sex,
        user_birth_year: form.user_birth_year.clamp(BIRTH_YEAR_MIN, BIRTH_YEAR_MAX),
    };

    match registry {
        Some(store) => {
            let mut users = state.users.clone();
            users.push(profile.clone());
            store.persist_users(&users).map_err(|e| {
                tracing::error!("registering {} failed: {}", profile.pay_user_id, e);
                e
            })?;
            state.users = users;
        }
        None => state.users.push(profile.clone()),
    }

    tracing::debug!("registered user {}", profile.pay_user_id);
    state.go_to(Page::Login);
    Ok(profile)
}

pub async fn register(
    State(app): State<AppState>,
    session: PortalSession,
    Json(form): Json<RegistrationForm>,
) -> PageResult {
    perform(&app, &session, Action::SubmitRegistration(form))
}

pub async fn back_to_login(State(app): State<AppState>, session: PortalSession) -> PageResult {
    perform(&app, &session, Action::BackToLogin)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        models::Dataset,
        store::{
            test::{store_config, write_fixture},
            RegistryVariant,
        },
    };

    fn state() -> SessionState {
        let mut state = SessionState::new(&Dataset {
            trips: Vec::new().into(),
            users: vec![UserProfile {
                pay_user_id: "123456789012".into(),
                type_card: "dki".into(),
                user_name: "Ani".into(),
                user_sex: Sex::Female,
                user_birth_year: 1990,
            }],
        });
        state.go_to(Page::Register);
        state
    }

    fn form(id: &str, birth_year: i32) -> RegistrationForm {
        RegistrationForm {
            pay_user_id: id.into(),
            type_card: "flazz".into(),
            user_name: "Budi".into(),
            user_sex: Sex::Male,
            user_birth_year: birth_year,
        }
    }

    const STRICT: RegistrationRules = RegistrationRules {
        strict_id_format: true,
    };
    const LAX: RegistrationRules = RegistrationRules {
        strict_id_format: false,
    };

    #[test]
    fn pay_user_id_format() {
        assert!(is_valid_pay_user_id("000011112222"));
        assert!(!is_valid_pay_user_id("12345"));
        assert!(!is_valid_pay_user_id("1234567890123"));
        assert!(!is_valid_pay_user_id("12345678901a"));
        assert!(!is_valid_pay_user_id("１２３４５６７８９０１２"));
    }

    #[test]
    fn short_id_is_rejected_under_strict_rules() {
        let mut state = state();

        let err = submit_registration(&mut state, form("12345", 2000), &STRICT, None).unwrap_err();

        assert!(matches!(err, PortalError::Validation(_)));
        assert_eq!(state.users.len(), 1);
        assert_eq!(state.page(), Page::Register);
    }

    #[test]
    fn short_id_is_accepted_under_lax_rules() {
        let mut state = state();

        submit_registration(&mut state, form("12345", 2000), &LAX, None).unwrap();

        assert_eq!(state.users.len(), 2);
        assert_eq!(state.page(), Page::Login);
    }

    #[test]
    fn duplicate_id_never_grows_the_user_set() {
        let mut state = state();

        for rules in [STRICT, LAX] {
            let err = submit_registration(&mut state, form("123456789012", 2000), &rules, None)
                .unwrap_err();
            assert_eq!(err.to_string(), "PayUserID is already registered.");
        }
        assert_eq!(state.users.len(), 1);
    }

    #[test]
    fn birth_year_is_clamped() {
        let mut state = state();

        let old = submit_registration(&mut state, form("111111111111", 1066), &STRICT, None).unwrap();
        state.go_to(Page::Register);
        let young = submit_registration(&mut state, form("222222222222", 2100), &STRICT, None).unwrap();

        assert_eq!(old.user_birth_year, 1900);
        assert_eq!(young.user_birth_year, 2025);
    }

    #[test]
    fn registry_receives_the_full_user_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tj.xlsx");
        write_fixture(&path, None);
        let store = TabularStore::new(store_config(&path, RegistryVariant::Persisted));
        let mut state = SessionState::new(&store.load().unwrap());
        state.go_to(Page::Register);

        submit_registration(&mut state, form("111122223333", 1999), &STRICT, Some(&store)).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.users, state.users);
        assert_eq!(reloaded.users.len(), 4);
    }

    #[test]
    fn failed_persist_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = TabularStore::new(store_config(
            &dir.path().join("missing.xlsx"),
            RegistryVariant::Persisted,
        ));
        let mut state = state();

        let err = submit_registration(&mut state, form("111122223333", 1999), &STRICT, Some(&store))
            .unwrap_err();

        assert!(matches!(err, PortalError::Persist(_)));
        assert_eq!(state.users.len(), 1);
        assert_eq!(state.page(), Page::Register);
    }

    #[test]
    fn form_accepts_sex_labels_and_defaults_birth_year() {
        let form: RegistrationForm = serde_json::from_str(
            r#"{"payUserId":"111122223333","typeCard":"dki","userName":"Citra","userSex":"Perempuan"}"#,
        )
        .unwrap();

        assert_eq!(form.user_sex, Sex::Female);
        assert_eq!(form.user_birth_year, 2000);
    }
}
