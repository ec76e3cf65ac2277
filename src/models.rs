use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};

pub const BIRTH_YEAR_MIN: i32 = 1900;
pub const BIRTH_YEAR_MAX: i32 = 2025;
pub const BIRTH_YEAR_DEFAULT: i32 = 2000;

/// One ride of the ridership dataset.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    #[serde(rename = "transID")]
    pub trans_id: String,
    #[serde(rename = "payUserID")]
    pub pay_user_id: String,
    #[serde(rename = "routeID")]
    pub route_id: String,
    pub route_name: Option<String>,
    pub corridor_name: Option<String>,
    pub trans_date: String,
    pub duration: String,
    pub direction: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sex {
    #[serde(rename = "M", alias = "Laki-laki")]
    Male,
    #[serde(rename = "F", alias = "Perempuan")]
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    /// Code stored in the workbook.
    pub fn code(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "Laki-laki",
            Sex::Female => "Perempuan",
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "M" | "m" | "Laki-laki" | "Male" => Ok(Sex::Male),
            "F" | "f" | "Perempuan" | "Female" => Ok(Sex::Female),
            other => Err(format!("unknown sex `{}`", other)),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UserProfile {
    #[serde(rename = "payUserID")]
    pub pay_user_id: String,
    #[serde(rename = "typeCard")]
    pub type_card: String,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "userSex")]
    pub user_sex: Sex,
    #[serde(rename = "userBirthYear")]
    pub user_birth_year: i32,
}

/// The process-wide snapshot read from the workbook at startup.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub trips: Arc<[TripRecord]>,
    pub users: Vec<UserProfile>,
}

/// Keeps the first profile seen for every pay-user id, in trip order.
pub fn distinct_profiles<I>(profiles: I) -> Vec<UserProfile>
where
    I: IntoIterator<Item = UserProfile>,
{
    let mut seen = std::collections::HashSet::new();
    profiles
        .into_iter()
        .filter(|p| seen.insert(p.pay_user_id.clone()))
        .collect()
}
