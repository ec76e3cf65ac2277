//! JSON shapes of the rendered pages. The front-end draws widgets from these.

use serde::Serialize;

use crate::models::{Sex, UserProfile, BIRTH_YEAR_DEFAULT, BIRTH_YEAR_MAX, BIRTH_YEAR_MIN};

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum PageView {
    Login,
    Register(RegisterView),
    MainMenu(MainMenuView),
    Corridor(CorridorView),
    History(HistoryView),
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterView {
    pub sex_choices: Vec<Choice>,
    pub birth_year_min: i32,
    pub birth_year_max: i32,
    pub birth_year_default: i32,
}

impl Default for RegisterView {
    fn default() -> Self {
        RegisterView {
            sex_choices: Sex::ALL
                .iter()
                .map(|s| Choice {
                    value: s.code(),
                    label: s.label(),
                })
                .collect(),
            birth_year_min: BIRTH_YEAR_MIN,
            birth_year_max: BIRTH_YEAR_MAX,
            birth_year_default: BIRTH_YEAR_DEFAULT,
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MainMenuView {
    pub greeting: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CorridorView {
    pub route_names: Vec<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct HistoryRow {
    #[serde(rename = "transID")]
    pub trans_id: String,
    #[serde(rename = "routeID")]
    pub route_id: String,
    #[serde(rename = "transDate")]
    pub trans_date: String,
    pub duration: String,
    pub direction: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "status", content = "rows", rename_all = "snake_case")]
pub enum TripHistory {
    NoHistory,
    Trips(Vec<HistoryRow>),
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryView {
    pub profile: UserProfile,
    pub history: TripHistory,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Error,
    Warning,
}

/// One-off message shown above the page, like a validation error.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Flash {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Flash {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Flash {
            level: FlashLevel::Warning,
            message: message.into(),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PageResponse {
    pub view: PageView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<Flash>,
}
